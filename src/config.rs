//! Engine tunables.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Settings that shape a simulation run.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Script commands one object may run per invocation.
    pub instruction_budget: u16,
    /// Game speed setting; one tick lasts `tick_speed * 2` hundredths.
    pub tick_speed: u8,
    /// Ticks a one-line status message stays visible.
    pub message_duration: i16,
    /// Seed for the random source; `None` derives one from the clock.
    pub seed: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            instruction_budget: 32,
            tick_speed: 4,
            message_duration: 200,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Read a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Length of one tick in hundredths of a second.
    #[must_use]
    pub const fn tick_duration(&self) -> i16 {
        self.tick_speed as i16 * 2
    }
}

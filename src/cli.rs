//! CLI command implementations for Zoo.

pub(crate) mod inspect;
pub(crate) mod new;
pub(crate) mod run;
pub(crate) mod soak;
pub(crate) mod watch;

mod output;

use clap::ValueEnum;
use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use zoo::config::EngineConfig;
use zoo::error::{ConfigError, FormatError};
use zoo::world::{LoadMode, World};

/// Output format for reporting commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<FormatError> for CliError {
    fn from(e: FormatError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(e.to_string())
    }
}

/// Read a world file.
pub(crate) fn read_world(path: &Path, mode: LoadMode) -> Result<World, CliError> {
    let file = File::open(path)
        .map_err(|e| CliError::new(format!("Failed to read {}: {e}", path.display())))?;
    World::read_from(&mut BufReader::new(file), mode)
        .map_err(|e| CliError::new(format!("Failed to load {}: {e}", path.display())))
}

/// Load the config file if given, then let an explicit seed win.
pub(crate) fn load_config(path: Option<&Path>, seed: Option<u32>) -> Result<EngineConfig, CliError> {
    let mut config = match path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if seed.is_some() {
        config.seed = seed;
    }
    Ok(config)
}

/// The configured seed, or one from the clock.
pub(crate) fn resolve_seed(config: &EngineConfig) -> u32 {
    config.seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
            .unwrap_or(42)
    })
}

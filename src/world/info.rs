//! World-wide counters, keys and flags.

use serde::Serialize;

/// Number of named flags a world can hold.
pub const MAX_FLAG: usize = 10;
/// Stored size of the world name and each flag.
pub const WORLD_STRING_LENGTH: usize = 20;

/// Global state shared by every board of a world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorldInfo {
    /// Player ammunition.
    pub ammo: i16,
    /// Gems collected.
    pub gems: i16,
    /// Keys held, indexed by colour 1..=7 minus one.
    pub keys: [bool; 7],
    /// Player health.
    pub health: i16,
    /// Index of the live board.
    pub current_board: i16,
    /// Unlit torches.
    pub torches: i16,
    /// Ticks left on the lit torch.
    pub torch_ticks: i16,
    /// Ticks left on the energizer.
    pub energizer_ticks: i16,
    /// Score.
    pub score: i16,
    /// World name.
    pub name: String,
    /// Named flags; empty strings are free slots.
    pub flags: [String; MAX_FLAG],
    /// Seconds spent on the current board.
    pub board_time_sec: i16,
    /// Hundredths accumulated toward the next board second.
    pub board_time_hsec: i16,
    /// The world is a saved game rather than a fresh world file.
    pub is_save: bool,
}

impl Default for WorldInfo {
    fn default() -> Self {
        Self {
            ammo: 0,
            gems: 0,
            keys: [false; 7],
            health: 100,
            current_board: 0,
            torches: 0,
            torch_ticks: 0,
            energizer_ticks: 0,
            score: 0,
            name: String::new(),
            flags: Default::default(),
            board_time_sec: 0,
            board_time_hsec: 0,
            is_save: false,
        }
    }
}

/// A counter that `#GIVE` and `#TAKE` can adjust.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    /// Player health.
    Health,
    /// Ammunition.
    Ammo,
    /// Gems.
    Gems,
    /// Torches.
    Torches,
    /// Score.
    Score,
    /// Board time in seconds.
    Time,
}

impl Counter {
    /// Parse an upper-case counter word.
    #[must_use]
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "HEALTH" => Some(Self::Health),
            "AMMO" => Some(Self::Ammo),
            "GEMS" => Some(Self::Gems),
            "TORCHES" => Some(Self::Torches),
            "SCORE" => Some(Self::Score),
            "TIME" => Some(Self::Time),
            _ => None,
        }
    }
}

impl WorldInfo {
    /// Slot holding `name`. An empty name finds the first free slot.
    #[must_use]
    pub fn flag_position(&self, name: &str) -> Option<usize> {
        self.flags.iter().position(|f| f == name)
    }

    /// Whether `name` is set.
    #[must_use]
    pub fn has_flag(&self, name: &str) -> bool {
        self.flag_position(name).is_some()
    }

    /// Set `name` in the first free slot. With no free slot the last slot is
    /// overwritten.
    pub fn set_flag(&mut self, name: &str) {
        if self.has_flag(name) {
            return;
        }
        let slot = self
            .flags
            .iter()
            .take(MAX_FLAG - 1)
            .position(String::is_empty)
            .unwrap_or(MAX_FLAG - 1);
        self.flags[slot] = name.to_string();
    }

    /// Clear `name` if set.
    pub fn clear_flag(&mut self, name: &str) {
        if let Some(slot) = self.flag_position(name) {
            self.flags[slot].clear();
        }
    }

    /// Current value of `counter`.
    #[must_use]
    pub const fn counter(&self, counter: Counter) -> i16 {
        match counter {
            Counter::Health => self.health,
            Counter::Ammo => self.ammo,
            Counter::Gems => self.gems,
            Counter::Torches => self.torches,
            Counter::Score => self.score,
            Counter::Time => self.board_time_sec,
        }
    }

    /// Mutable access to `counter`.
    pub const fn counter_mut(&mut self, counter: Counter) -> &mut i16 {
        match counter {
            Counter::Health => &mut self.health,
            Counter::Ammo => &mut self.ammo,
            Counter::Gems => &mut self.gems,
            Counter::Torches => &mut self.torches,
            Counter::Score => &mut self.score,
            Counter::Time => &mut self.board_time_sec,
        }
    }

    /// Add `delta` unless the result would be negative. Returns whether the
    /// counter changed. Positive overflow saturates.
    pub fn adjust(&mut self, counter: Counter, delta: i16) -> bool {
        let slot = self.counter_mut(counter);
        let next = i32::from(*slot) + i32::from(delta);
        if next < 0 {
            return false;
        }
        *slot = i16::try_from(next).unwrap_or(i16::MAX);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_fill_free_slots() {
        let mut info = WorldInfo::default();
        info.set_flag("DOOR");
        info.set_flag("KEY");
        info.set_flag("DOOR");
        assert_eq!(info.flags[0], "DOOR");
        assert_eq!(info.flags[1], "KEY");
        info.clear_flag("DOOR");
        assert!(!info.has_flag("DOOR"));
        info.set_flag("GATE");
        assert_eq!(info.flags[0], "GATE");
    }

    #[test]
    fn test_full_flags_overwrite_last_slot() {
        let mut info = WorldInfo::default();
        for i in 0..MAX_FLAG {
            info.set_flag(&format!("F{i}"));
        }
        info.set_flag("EXTRA");
        assert_eq!(info.flags[MAX_FLAG - 1], "EXTRA");
        assert!(!info.has_flag("F9"));
    }

    #[test]
    fn test_adjust_rejects_negative() {
        let mut info = WorldInfo::default();
        assert!(info.adjust(Counter::Ammo, 5));
        assert!(!info.adjust(Counter::Ammo, -10));
        assert_eq!(info.ammo, 5);
        assert!(info.adjust(Counter::Ammo, -5));
        assert_eq!(info.ammo, 0);
    }

    #[test]
    fn test_adjust_saturates() {
        let mut info = WorldInfo {
            score: i16::MAX - 1,
            ..WorldInfo::default()
        };
        assert!(info.adjust(Counter::Score, 10));
        assert_eq!(info.score, i16::MAX);
    }
}

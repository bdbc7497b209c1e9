// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Zoo: a deterministic tile and actor engine with an object scripting
//! language.
//!
//! A world is a set of 60×25 boards. Each board holds a tile grid and a
//! table of stats (scripted or element-driven actors). One board is live at
//! a time; the rest are kept as encoded blobs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │     Simulation (tick loop, rules)   │
//! ├──────────────────┬──────────────────┤
//! │  OOP interpreter │  Label router    │
//! ├──────────────────┴──────────────────┤
//! │   World / Board / Stats / Codec     │
//! ├─────────────────────────────────────┤
//! │   Host (screen, sound, input, rng)  │
//! └─────────────────────────────────────┘
//! ```
//!
//! The engine never touches a terminal or clock: every side effect goes
//! through a [`Host`], and [`HeadlessHost`] makes runs fully reproducible.

pub mod board;
pub mod config;
pub mod elements;
pub mod engine;
pub mod error;
pub mod host;
pub mod oop;
pub mod sound;
pub mod world;

mod wire;

pub use board::{BOARD_HEIGHT, BOARD_WIDTH, Board, Script, Stat, Tile};
pub use config::EngineConfig;
pub use engine::{Mode, Simulation};
pub use error::{FormatError, ScriptError};
pub use host::{HeadlessHost, Host, PlayerInput};
pub use world::{LoadMode, World};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_world_plays_headless() {
        let mut sim = Simulation::new(World::new(), EngineConfig::default(), HeadlessHost::new(3));
        sim.enter_play();
        sim.resume();
        assert_eq!(sim.run(50), 50);
        assert!(!sim.is_game_over());
        assert_eq!(sim.world.board.stats.count(), 0);
    }
}

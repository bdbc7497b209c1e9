//! Simulation layer.
//!
//! Runs the rules on top of a [`World`](crate::world::World):
//! - Tick scheduling of stats and the status-message timer
//! - Physics helpers (move, push, shoot, attack, damage, placement)
//! - Per-element tick and touch behaviour
//! - Tile glyphs with darkness and torch light
//! - Board transitions and world load/save
//! - The debug command prompt

mod behavior;
mod debug;
mod glyph;
mod physics;
mod simulation;

pub use simulation::{Mode, Simulation};

/// Ticks a lit torch lasts.
pub const TORCH_DURATION: i16 = 200;
/// Horizontal reach of the torch light.
pub const TORCH_DX: i16 = 8;
/// Vertical reach of the torch light.
pub const TORCH_DY: i16 = 5;
/// Cells with `dx² + 2·dy²` below this are lit.
pub const TORCH_DIST_SQR: i16 = 50;
/// Ticks an energizer lasts.
pub const ENERGIZER_DURATION: i16 = 75;
/// Projectile source: the player.
pub const SHOT_SOURCE_PLAYER: u8 = 0;
/// Projectile source: anything else.
pub const SHOT_SOURCE_ENEMY: u8 = 1;
/// The tick counter wraps back to 1 after this value.
pub const TICK_WRAP: i16 = 420;

/// Unit steps toward the four neighbours: north, south, west, east.
pub const NEIGHBOR_DELTAS: [(i16, i16); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

#[inline]
pub(crate) const fn sqr(v: i16) -> i16 {
    v.saturating_mul(v)
}

//! Direction, condition and tile words.

use super::interp::Invocation;
use crate::board::Tile;
use crate::elements;
use crate::engine::sqr;
use crate::error::ScriptError;
use crate::host::Host;

/// A direction modifier waiting for the word it turns.
enum Turn {
    Clockwise,
    Counter,
    Perpendicular,
    Opposite,
}

impl<H: Host> Invocation<'_, H> {
    /// Read a direction, including the `CW`/`CCW`/`OPP`/`RNDP` modifiers.
    pub(super) fn read_direction(&mut self) -> Result<(i16, i16), ScriptError> {
        self.next_direction().ok_or(ScriptError::BadDirection)
    }

    fn next_direction(&mut self) -> Option<(i16, i16)> {
        let mut modifiers = Vec::new();
        let (mut dx, mut dy) = loop {
            let word = self.read_word();
            let (x, y) = self.pos();
            match word.as_str() {
                "N" | "NORTH" => break (0, -1),
                "S" | "SOUTH" => break (0, 1),
                "E" | "EAST" => break (1, 0),
                "W" | "WEST" => break (-1, 0),
                "I" | "IDLE" => break (0, 0),
                "SEEK" => break self.sim.seek_direction(x, y),
                "FLOW" => {
                    let stat = self.sim.world.board.stats.get(self.id());
                    break (stat.step_x, stat.step_y);
                }
                "RND" => break self.sim.random_direction(),
                "RNDNS" => break (0, self.sim.host.random(2) * 2 - 1),
                "RNDNE" => {
                    let dx = self.sim.host.random(2);
                    break (dx, if dx == 0 { -1 } else { 0 });
                }
                "CW" => modifiers.push(Turn::Clockwise),
                "CCW" => modifiers.push(Turn::Counter),
                "RNDP" => modifiers.push(Turn::Perpendicular),
                "OPP" => modifiers.push(Turn::Opposite),
                _ => return None,
            }
        };
        // The word nearest the base direction applies first.
        for turn in modifiers.into_iter().rev() {
            let clockwise = (dy.saturating_neg(), dx);
            let counter = (dy, dx.saturating_neg());
            (dx, dy) = match turn {
                Turn::Clockwise => clockwise,
                Turn::Counter => counter,
                Turn::Perpendicular if self.sim.host.random(2) == 0 => clockwise,
                Turn::Perpendicular => counter,
                Turn::Opposite => (dx.saturating_neg(), dy.saturating_neg()),
            };
        }
        Some((dx, dy))
    }

    /// Read and evaluate a condition; unknown words are flag names.
    pub(super) fn read_condition(&mut self) -> Result<bool, ScriptError> {
        let mut negate = false;
        let mut word = self.read_word();
        while word == "NOT" {
            negate = !negate;
            word = self.read_word();
        }
        let (x, y) = self.pos();
        let (px, py) = self.sim.world.board.player_pos();
        let holds = match word.as_str() {
            "ALLIGNED" => x == px || y == py,
            "CONTACT" => sqr(x - px).saturating_add(sqr(y - py)) == 1,
            "BLOCKED" => {
                let (dx, dy) = self.read_direction()?;
                !self.walkable(x.saturating_add(dx), y.saturating_add(dy))
            }
            "ENERGIZED" => self.sim.world.info.energizer_ticks > 0,
            "ANY" => {
                let tile = self.read_tile().ok_or(ScriptError::BadObjectKind)?;
                self.sim.world.board.find_tile((0, 1), tile).is_some()
            }
            flag => self.sim.world.info.has_flag(flag),
        };
        Ok(holds != negate)
    }

    /// Read `[colour] element`. A colour of 0 means "any" or "keep".
    pub(super) fn read_tile(&mut self) -> Option<Tile> {
        let mut word = self.read_word();
        let mut color = 0;
        if let Some(named) = elements::find_color_by_word(&word) {
            color = named;
            word = self.read_word();
        }
        elements::find_by_word(&word).map(|element| Tile::new(element, color))
    }

    pub(super) fn walkable(&self, x: i16, y: i16) -> bool {
        elements::def(self.sim.world.board.tiles.get(x, y).element).walkable
    }
}

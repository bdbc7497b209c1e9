//! Tile glyphs: darkness, torch light and per-element draw rules.

use super::simulation::Simulation;
use super::{NEIGHBOR_DELTAS, TORCH_DIST_SQR, sqr};
use crate::board::{BOARD_HEIGHT, BOARD_WIDTH, Board};
use crate::elements::{self, id};
use crate::host::{Glyph, Host};

const STAR_FRAMES: &[u8; 4] = b"\xB3/\xC4\\";
const CONVEYOR_CCW_FRAMES: &[u8; 4] = b"\\\xC4/\xB3";
const LINE_GLYPHS: &[u8; 16] = b"\xF9\xD0\xD2\xBA\xB5\xBC\xBB\xB9\xC6\xC8\xC9\xCC\xCD\xCA\xCB\xCE";
const DARK: Glyph = Glyph::new(0xB0, 0x07);

impl<H: Host> Simulation<H> {
    /// What `(x, y)` looks like right now.
    #[must_use]
    pub fn glyph_at(&self, x: i16, y: i16) -> Glyph {
        let board = &self.world.board;
        let tile = board.tiles.get(x, y);
        let def = elements::def(tile.element);

        let lit = !board.info.is_dark
            || def.visible_in_dark
            || (self.world.info.torch_ticks > 0 && {
                let (px, py) = board.player_pos();
                sqr(px - x) + sqr(py - y) * 2 < TORCH_DIST_SQR
            });
        if !lit {
            return DARK;
        }

        if tile.element == id::EMPTY {
            Glyph::new(b' ', 0x0F)
        } else if def.has_draw_proc {
            Glyph::new(draw_proc(board, self.current_tick, x, y, tile.element), tile.color)
        } else if tile.element < id::TEXT_MIN {
            Glyph::new(def.character, tile.color)
        } else if tile.element == id::TEXT_WHITE {
            Glyph::new(tile.color, 0x0F)
        } else if tile.element <= id::MAX {
            Glyph::new(tile.color, ((tile.element - id::TEXT_MIN) + 1) * 16 + 0x0F)
        } else {
            Glyph::new(b'?', 0x70)
        }
    }

    /// Send the glyph at `(x, y)` to the host.
    pub fn draw_tile(&mut self, x: i16, y: i16) {
        let glyph = self.glyph_at(x, y);
        self.host.draw_tile(x, y, glyph);
    }

    /// Redraw every playable cell.
    pub fn redraw(&mut self) {
        for y in 1..=BOARD_HEIGHT {
            for x in 1..=BOARD_WIDTH {
                self.draw_tile(x, y);
            }
        }
    }
}

fn draw_proc(board: &Board, tick: i16, x: i16, y: i16, element: u8) -> u8 {
    let stat = || board.stats.index_at(x, y).map(|i| board.stats.get(i));
    let frame = |n: i16| usize::try_from(n.rem_euclid(4)).unwrap_or(0);
    match element {
        id::OBJECT => stat().map_or(b'?', |s| s.p1),
        id::BOMB => match stat().map_or(0, |s| s.p1) {
            0 | 1 => 0x0B,
            n => b'0'.wrapping_add(n),
        },
        id::STAR => STAR_FRAMES[frame(tick)],
        id::CONVEYOR_CW => STAR_FRAMES[frame(tick / 3)],
        id::CONVEYOR_CCW => CONVEYOR_CCW_FRAMES[frame(tick / 2)],
        id::DUPLICATOR => match stat().map_or(1, |s| s.p1) {
            2 => 0xF9,
            3 => 0xF8,
            4 => b'o',
            5 => b'O',
            _ => 0xFA,
        },
        id::SPINNING_GUN => match tick.rem_euclid(8) {
            0 | 1 => 0x18,
            2 | 3 => 0x1A,
            4 | 5 => 0x19,
            _ => 0x1B,
        },
        id::PUSHER | id::TRANSPORTER => {
            let (dx, dy) = stat().map_or((0, 0), |s| (s.step_x, s.step_y));
            let arrows: &[u8; 4] = if element == id::PUSHER {
                b"\x10\x11\x1E\x1F"
            } else {
                b"><^v"
            };
            match (dx, dy) {
                (1, 0) => arrows[0],
                (-1, 0) => arrows[1],
                (0, -1) => arrows[2],
                _ => arrows[3],
            }
        }
        id::LINE => {
            let mask = NEIGHBOR_DELTAS
                .iter()
                .enumerate()
                .filter(|&(_, &(dx, dy))| {
                    matches!(board.tiles.get(x + dx, y + dy).element, id::LINE | id::BOARD_EDGE)
                })
                .fold(0usize, |m, (bit, _)| m | (1 << bit));
            LINE_GLYPHS[mask]
        }
        other => elements::def(other).character,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Stat, Tile};
    use crate::config::EngineConfig;
    use crate::host::HeadlessHost;
    use crate::world::World;

    fn sim() -> Simulation<HeadlessHost> {
        Simulation::new(World::new(), EngineConfig::default(), HeadlessHost::new(1))
    }

    #[test]
    fn test_object_glyph_comes_from_p1() {
        let mut sim = sim();
        let template = Stat {
            p1: b'A',
            ..Stat::default()
        };
        sim.add_stat(10, 10, id::OBJECT, 0x0E, 3, &template);
        assert_eq!(sim.glyph_at(10, 10), Glyph::new(b'A', 0x0E));
        assert_eq!(sim.host.glyph(10, 10), Some(Glyph::new(b'A', 0x0E)));
    }

    #[test]
    fn test_text_elements_use_color_as_character() {
        let mut sim = sim();
        sim.world.board.tiles.set(3, 3, Tile::new(id::TEXT_RED, b'H'));
        sim.world.board.tiles.set(4, 3, Tile::new(id::TEXT_WHITE, b'i'));
        assert_eq!(sim.glyph_at(3, 3), Glyph::new(b'H', 0x4F));
        assert_eq!(sim.glyph_at(4, 3), Glyph::new(b'i', 0x0F));
    }

    #[test]
    fn test_dark_board_hides_unlit_tiles() {
        let mut sim = sim();
        sim.world.board.info.is_dark = true;
        sim.world.board.tiles.set(3, 3, Tile::new(id::GEM, 0x0B));
        sim.world.board.tiles.set(4, 3, Tile::new(id::TORCH, 0x06));
        assert_eq!(sim.glyph_at(3, 3), DARK);
        assert_eq!(sim.glyph_at(4, 3).character, 0x9D);

        let (px, py) = sim.world.board.player_pos();
        sim.world.board.tiles.set(px + 2, py, Tile::new(id::GEM, 0x0B));
        assert_eq!(sim.glyph_at(px + 2, py), DARK);
        sim.world.info.torch_ticks = 10;
        assert_eq!(sim.glyph_at(px + 2, py), Glyph::new(0x04, 0x0B));
    }

    #[test]
    fn test_line_joins_neighbours() {
        let mut sim = sim();
        let line = Tile::new(id::LINE, 0x0F);
        sim.world.board.tiles.set(10, 10, line);
        sim.world.board.tiles.set(11, 10, line);
        sim.world.board.tiles.set(9, 10, line);
        assert_eq!(sim.glyph_at(10, 10).character, 0xCD);
        sim.world.board.tiles.set(10, 9, line);
        assert_eq!(sim.glyph_at(10, 10).character, 0xCA);
    }

    #[test]
    fn test_star_animates_with_tick() {
        let mut sim = sim();
        sim.world.board.tiles.set(10, 10, Tile::new(id::STAR, 0x0F));
        sim.current_tick = 1;
        assert_eq!(sim.glyph_at(10, 10).character, b'/');
        sim.current_tick = 3;
        assert_eq!(sim.glyph_at(10, 10).character, b'\\');
    }
}

//! The live board: tile grid, stat table and board info.

mod codec;
mod stats;
mod tiles;

pub use codec::{RleRun, rle_runs};
pub use stats::{Script, Stat, StatTable};
pub use tiles::{Tile, TileGrid};

use crate::elements::{self, id};

/// Playable width of a board.
pub const BOARD_WIDTH: i16 = 60;
/// Playable height of a board.
pub const BOARD_HEIGHT: i16 = 25;
/// Non-player stats a board can hold.
pub const MAX_STAT: usize = 150;
/// Stored size of the board name field.
pub const BOARD_NAME_LENGTH: usize = 50;
/// Stored size of the board message field.
pub const BOARD_MESSAGE_LENGTH: usize = 58;

/// Neighbour slots, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighbor {
    /// Board above.
    North = 0,
    /// Board below.
    South = 1,
    /// Board to the left.
    West = 2,
    /// Board to the right.
    East = 3,
}

impl Neighbor {
    /// The neighbour reached by stepping off the board by `(dx, dy)`.
    #[must_use]
    pub const fn from_delta(dx: i16, dy: i16) -> Option<Self> {
        match (dx, dy) {
            (0, -1) => Some(Self::North),
            (0, 1) => Some(Self::South),
            (-1, 0) => Some(Self::West),
            (1, 0) => Some(Self::East),
            _ => None,
        }
    }
}

/// Per-board settings stored after the tile stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardInfo {
    /// Player bullets allowed on screen at once.
    pub max_shots: u8,
    /// Only torch-lit and glowing tiles are drawn.
    pub is_dark: bool,
    /// Board ids reached through the edges, indexed by [`Neighbor`]; 0 is none.
    pub neighbors: [u8; 4],
    /// A damaged player is sent back to the entry point.
    pub reenter_when_zapped: bool,
    /// Status message currently shown.
    pub message: String,
    /// Player column on board entry.
    pub start_x: u8,
    /// Player row on board entry.
    pub start_y: u8,
    /// Seconds allowed on the board, 0 for unlimited.
    pub time_limit: i16,
}

impl Default for BoardInfo {
    fn default() -> Self {
        Self {
            max_shots: 255,
            is_dark: false,
            neighbors: [0; 4],
            reenter_when_zapped: false,
            message: String::new(),
            start_x: 0,
            start_y: 0,
            time_limit: 0,
        }
    }
}

impl BoardInfo {
    /// Neighbouring board id in direction `side`, if any.
    #[must_use]
    pub const fn neighbor(&self, side: Neighbor) -> u8 {
        self.neighbors[side as usize]
    }
}

/// A fully decoded board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Display name.
    pub name: String,
    /// Tile grid.
    pub tiles: TileGrid,
    /// Stat table; index 0 is the player.
    pub stats: StatTable,
    /// Board settings.
    pub info: BoardInfo,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// A walled, empty board with the player in the middle.
    #[must_use]
    pub fn new() -> Self {
        let mut tiles = TileGrid::new(BOARD_WIDTH, BOARD_HEIGHT);
        let wall = Tile::new(id::NORMAL, 0x0E);
        for x in 1..=BOARD_WIDTH {
            tiles.set(x, 1, wall);
            tiles.set(x, BOARD_HEIGHT, wall);
        }
        for y in 1..=BOARD_HEIGHT {
            tiles.set(1, y, wall);
            tiles.set(BOARD_WIDTH, y, wall);
        }
        let (px, py) = (BOARD_WIDTH / 2, BOARD_HEIGHT / 2);
        tiles.set(px, py, Tile::new(id::PLAYER, elements::def(id::PLAYER).color));

        let mut stats = StatTable::new(MAX_STAT);
        let player = stats.player_mut();
        player.x = px as u8;
        player.y = py as u8;
        player.cycle = 1;

        Self {
            name: String::new(),
            tiles,
            stats,
            info: BoardInfo::default(),
        }
    }

    /// Tile under the player's position.
    #[must_use]
    pub fn player_pos(&self) -> (i16, i16) {
        self.stats.player().pos()
    }

    /// Spawn a stat on `(x, y)`, recording the covered tile as its `under`.
    ///
    /// The template is copied with its own script buffer. Placing onto an
    /// element that is placeable-on-top keeps that tile's background. A full
    /// table makes this a no-op.
    pub fn add_stat(
        &mut self,
        x: i16,
        y: i16,
        element: u8,
        color: u8,
        cycle: i16,
        template: &Stat,
    ) -> Option<i16> {
        if self.stats.is_full() {
            return None;
        }
        let covered = self.tiles.get(x, y);
        let stat = Stat {
            x: x as u8,
            y: y as u8,
            cycle,
            under: covered,
            cursor: 0,
            ..template.deep_clone()
        };
        let index = self.stats.push(stat)?;
        let color = if elements::def(covered.element).placeable_on_top {
            (color & 0x0F) | (covered.color & 0x70)
        } else {
            color
        };
        self.tiles.set(x, y, Tile::new(element, color));
        Some(index)
    }

    /// Remove a stat and restore the tile it covered. Returns the removed stat.
    pub fn remove_stat(&mut self, index: i16) -> Option<Stat> {
        let stat = self.stats.remove(index)?;
        let (x, y) = stat.pos();
        self.tiles.set(x, y, stat.under);
        Some(stat)
    }

    /// Next tile after `from` (row-major) matching `pattern`.
    ///
    /// A pattern colour of 0 matches any colour; otherwise it is compared
    /// with the tile's effective foreground.
    #[must_use]
    pub fn find_tile(&self, from: (i16, i16), pattern: Tile) -> Option<(i16, i16)> {
        let (mut x, mut y) = from;
        loop {
            x += 1;
            if x > self.tiles.width() {
                x = 1;
                y += 1;
                if y > self.tiles.height() {
                    return None;
                }
            }
            let tile = self.tiles.get(x, y);
            if tile.element == pattern.element
                && (pattern.color == 0 || match_color(tile) == pattern.color)
            {
                return Some((x, y));
            }
        }
    }
}

fn match_color(tile: Tile) -> u8 {
    let default = elements::def(tile.element).color;
    if default < elements::COLOR_SPECIAL_MIN {
        default & 0x07
    } else if default == elements::COLOR_WHITE_ON_CHOICE {
        ((tile.color >> 4) & 0x0F) + 8
    } else {
        tile.color & 0x0F
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_layout() {
        let board = Board::new();
        assert_eq!(board.tiles.get(1, 1).element, id::NORMAL);
        assert_eq!(board.tiles.get(BOARD_WIDTH, 10).element, id::NORMAL);
        assert_eq!(board.tiles.get(30, 12).element, id::PLAYER);
        assert_eq!(board.player_pos(), (30, 12));
        assert_eq!(board.stats.count(), 0);
    }

    #[test]
    fn test_add_then_remove_restores_tile() {
        let mut board = Board::new();
        let floor = Tile::new(id::FAKE, 0x1E);
        board.tiles.set(10, 10, floor);

        let index = board
            .add_stat(10, 10, id::OBJECT, 0x0C, 5, &Stat::default())
            .unwrap();
        assert_eq!(board.stats.get(index).under, floor);
        assert_eq!(board.stats.get(index).cycle, 5);
        // Fake is placeable-on-top: background nibble is kept.
        assert_eq!(board.tiles.get(10, 10), Tile::new(id::OBJECT, 0x1C));

        board.remove_stat(index);
        assert_eq!(board.tiles.get(10, 10), floor);
        assert_eq!(board.stats.count(), 0);
    }

    #[test]
    fn test_add_copies_template_script() {
        let mut board = Board::new();
        let template = Stat {
            script: Some(Script::from_text("hi\n")),
            ..Stat::default()
        };
        let index = board
            .add_stat(5, 5, id::OBJECT, 0x0F, 3, &template)
            .unwrap();
        let copy = board.stats.get(index).script.as_ref().unwrap();
        assert!(!copy.same_buffer(template.script.as_ref().unwrap()));
        assert_eq!(copy.to_vec(), b"hi\r".to_vec());
    }

    #[test]
    fn test_find_tile_matches_color() {
        let mut board = Board::new();
        board.tiles.set(3, 3, Tile::new(id::KEY, 0x0C));
        board.tiles.set(8, 3, Tile::new(id::KEY, 0x09));
        let red = Tile::new(id::KEY, 0x0C);
        assert_eq!(board.find_tile((0, 1), red), Some((3, 3)));
        assert_eq!(board.find_tile((3, 3), red), None);
        assert_eq!(board.find_tile((3, 3), Tile::new(id::KEY, 0)), Some((8, 3)));
    }
}

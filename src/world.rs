//! The world container: board blobs plus global state.
//!
//! Only the current board is decoded. Every other board lives in
//! [`World::boards`] as the byte blob produced by [`Board::encode`].

mod codec;
mod info;

pub use codec::{LoadMode, WORLD_HEADER_SIZE, WORLD_INFO_SIZE};
pub use info::{Counter, MAX_FLAG, WORLD_STRING_LENGTH, WorldInfo};

use tracing::debug;

use crate::board::{Board, Tile};
use crate::elements::{self, id};
use crate::error::{FormatError, FormatResult};

/// Boards a world can hold, the title board included.
pub const MAX_BOARD: usize = 101;

/// A loaded world.
#[derive(Debug, Clone)]
pub struct World {
    /// Global counters, keys and flags.
    pub info: WorldInfo,
    /// One encoded blob per board; the current slot is stale while its board
    /// is open.
    boards: Vec<Vec<u8>>,
    /// The live board.
    pub board: Board,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// A fresh world holding a single empty title board.
    #[must_use]
    pub fn new() -> Self {
        let mut board = Board::new();
        board.name = "Title screen".to_string();
        let blob = board.encode().unwrap_or_default();
        Self {
            info: WorldInfo::default(),
            boards: vec![blob],
            board,
        }
    }

    /// Number of boards.
    #[must_use]
    pub fn board_count(&self) -> usize {
        self.boards.len()
    }

    /// Stored blob of board `id`. The current board's blob is only fresh
    /// after [`World::store`] or [`World::close`].
    #[must_use]
    pub fn board_blob(&self, id: i16) -> Option<&[u8]> {
        let index = usize::try_from(id).ok()?;
        self.boards.get(index).map(Vec::as_slice)
    }

    /// Append `board` as a new slot and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::TooManyBoards`] once the world is full.
    pub fn push_board(&mut self, board: &Board) -> FormatResult<i16> {
        if self.boards.len() >= MAX_BOARD {
            return Err(FormatError::TooManyBoards);
        }
        self.boards.push(board.encode()?);
        Ok(self.boards.len() as i16 - 1)
    }

    /// Decode board `id` into the live board.
    ///
    /// An id past the last board falls back to the current board. On a
    /// decode error the previous live board stays in place.
    ///
    /// # Errors
    ///
    /// Returns the decode error of the stored blob.
    pub fn open(&mut self, id: i16) -> FormatResult<()> {
        let id = if id < 0 || id as usize >= self.boards.len() {
            self.info.current_board
        } else {
            id
        };
        let blob = self.board_blob(id).ok_or(FormatError::NoSuchBoard(id))?;
        self.board = Board::decode(blob)?;
        self.info.current_board = id;
        debug!(board = id, name = %self.board.name, "opened board");
        Ok(())
    }

    /// Encode the live board into its slot without changing the grid.
    ///
    /// # Errors
    ///
    /// Returns an error if the board cannot be encoded.
    pub fn store(&mut self) -> FormatResult<()> {
        let blob = self.board.encode()?;
        let id = self.info.current_board;
        let slot = usize::try_from(id)
            .ok()
            .and_then(|i| self.boards.get_mut(i))
            .ok_or(FormatError::NoSuchBoard(id))?;
        *slot = blob;
        Ok(())
    }

    /// Stamp the player tile at the player's position, then store the board.
    ///
    /// # Errors
    ///
    /// Returns an error if the board cannot be encoded.
    pub fn close(&mut self) -> FormatResult<()> {
        let (x, y) = self.board.player_pos();
        self.board
            .tiles
            .set(x, y, Tile::new(id::PLAYER, elements::def(id::PLAYER).color));
        self.store()
    }

    /// Close the live board and open `id`.
    ///
    /// # Errors
    ///
    /// Returns an encode or decode error.
    pub fn change_board(&mut self, id: i16) -> FormatResult<()> {
        self.close()?;
        self.open(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_world() {
        let world = World::new();
        assert_eq!(world.board_count(), 1);
        assert_eq!(world.info.health, 100);
        assert_eq!(world.board.name, "Title screen");
    }

    #[test]
    fn test_change_board_keeps_edits() {
        let mut world = World::new();
        let id = world.push_board(&Board::new()).unwrap();
        world.board.tiles.set(4, 4, Tile::new(id::GEM, 0x0A));
        world.change_board(id).unwrap();
        assert_eq!(world.info.current_board, 1);
        assert_eq!(world.board.tiles.get(4, 4), Tile::EMPTY);
        world.change_board(0).unwrap();
        assert_eq!(world.board.tiles.get(4, 4), Tile::new(id::GEM, 0x0A));
    }

    #[test]
    fn test_open_out_of_range_uses_current() {
        let mut world = World::new();
        world.push_board(&Board::new()).unwrap();
        world.open(50).unwrap();
        assert_eq!(world.info.current_board, 0);
    }

    #[test]
    fn test_failed_open_keeps_board() {
        let mut world = World::new();
        world.boards.push(vec![1, 2, 3]);
        world.board.name = "Kept".to_string();
        assert!(world.open(1).is_err());
        assert_eq!(world.board.name, "Kept");
        assert_eq!(world.info.current_board, 0);
    }

    #[test]
    fn test_close_stamps_player() {
        let mut world = World::new();
        let (x, y) = world.board.player_pos();
        world.board.tiles.set(x, y, Tile::EMPTY);
        world.close().unwrap();
        let stored = Board::decode(world.board_blob(0).unwrap()).unwrap();
        assert_eq!(stored.tiles.get(x, y).element, id::PLAYER);
    }
}

//! World file layout.
//!
//! A 512-byte header holds the board count (or the `-1` marker followed by
//! the count) and the world info block, zero-padded. Each board follows as a
//! `u16` length and its blob.

use std::io::{Cursor, Read, Write};

use tracing::info;

use super::info::{MAX_FLAG, WORLD_STRING_LENGTH, WorldInfo};
use super::{MAX_BOARD, World};
use crate::error::{FormatError, FormatResult};
use crate::wire;

/// Size of the world header, including the info block and padding.
pub const WORLD_HEADER_SIZE: usize = 512;
/// Size of the serialized [`WorldInfo`].
pub const WORLD_INFO_SIZE: usize = 275;

/// How much of a world file to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Every board.
    #[default]
    Full,
    /// Only the title board; the world is marked as a save so that it can
    /// never be written back over the full file.
    TitleOnly,
}

impl World {
    /// Read a whole world from `r` and open its current board.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::IncompatibleVersion`] for an unknown board
    /// count marker, or an I/O or board decode error.
    pub fn read_from<R: Read>(r: &mut R, mode: LoadMode) -> FormatResult<World> {
        let header = wire::read_bytes(r, WORLD_HEADER_SIZE)?;
        let mut h = Cursor::new(header);

        let mut board_count = wire::read_i16(&mut h)?;
        if board_count < 0 {
            if board_count != -1 {
                return Err(FormatError::IncompatibleVersion(board_count));
            }
            board_count = wire::read_i16(&mut h)?;
        }
        if board_count < 0 || board_count as usize >= MAX_BOARD {
            return Err(FormatError::IncompatibleVersion(board_count));
        }
        let mut info = read_info(&mut h)?;
        if mode == LoadMode::TitleOnly {
            board_count = 0;
            info.current_board = 0;
            info.is_save = true;
        }

        let mut boards = Vec::with_capacity(board_count as usize + 1);
        for _ in 0..=board_count {
            let len = wire::read_u16(r)?;
            boards.push(wire::read_bytes(r, usize::from(len))?);
        }

        let mut world = World {
            info,
            boards,
            board: crate::board::Board::new(),
        };
        let current = world.info.current_board;
        world.open(current)?;
        info!(
            name = %world.info.name,
            boards = world.boards.len(),
            current,
            "loaded world"
        );
        Ok(world)
    }

    /// Decode a world held in memory.
    ///
    /// # Errors
    ///
    /// See [`World::read_from`].
    pub fn decode(bytes: &[u8], mode: LoadMode) -> FormatResult<World> {
        Self::read_from(&mut Cursor::new(bytes), mode)
    }

    /// Write the world to `w`.
    ///
    /// The live board is stored into its slot first without touching the
    /// player tile.
    ///
    /// # Errors
    ///
    /// Returns an error if the board cannot be encoded, a blob exceeds
    /// 65535 bytes, or writing fails.
    pub fn write_to<W: Write>(&mut self, w: &mut W) -> FormatResult<()> {
        self.store()?;
        let last = i16::try_from(self.boards.len().saturating_sub(1))
            .map_err(|_| FormatError::TooManyBoards)?;

        let mut header = Vec::with_capacity(WORLD_HEADER_SIZE);
        wire::write_i16(&mut header, -1)?;
        wire::write_i16(&mut header, last)?;
        write_info(&mut header, &self.info)?;
        header.resize(WORLD_HEADER_SIZE, 0);
        w.write_all(&header)?;

        for blob in &self.boards {
            let len = u16::try_from(blob.len()).map_err(|_| FormatError::TooLong(blob.len()))?;
            wire::write_u16(w, len)?;
            w.write_all(blob)?;
        }
        info!(name = %self.info.name, boards = self.boards.len(), "saved world");
        Ok(())
    }

    /// Serialize into a fresh byte vector.
    ///
    /// # Errors
    ///
    /// See [`World::write_to`].
    pub fn encode(&mut self) -> FormatResult<Vec<u8>> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }
}

fn read_info<R: Read>(r: &mut R) -> FormatResult<WorldInfo> {
    let ammo = wire::read_i16(r)?;
    let gems = wire::read_i16(r)?;
    let mut keys = [false; 7];
    for k in &mut keys {
        *k = wire::read_bool(r)?;
    }
    let health = wire::read_i16(r)?;
    let current_board = wire::read_i16(r)?;
    let torches = wire::read_i16(r)?;
    let torch_ticks = wire::read_i16(r)?;
    let energizer_ticks = wire::read_i16(r)?;
    wire::skip(r, 2)?;
    let score = wire::read_i16(r)?;
    let name = wire::read_pstring(r, WORLD_STRING_LENGTH)?;
    let mut flags: [String; MAX_FLAG] = Default::default();
    for flag in &mut flags {
        *flag = wire::read_pstring(r, WORLD_STRING_LENGTH)?;
    }
    let board_time_sec = wire::read_i16(r)?;
    let board_time_hsec = wire::read_i16(r)?;
    let is_save = wire::read_bool(r)?;
    wire::skip(r, 14)?;
    Ok(WorldInfo {
        ammo,
        gems,
        keys,
        health,
        current_board,
        torches,
        torch_ticks,
        energizer_ticks,
        score,
        name,
        flags,
        board_time_sec,
        board_time_hsec,
        is_save,
    })
}

fn write_info<W: Write>(w: &mut W, info: &WorldInfo) -> FormatResult<()> {
    wire::write_i16(w, info.ammo)?;
    wire::write_i16(w, info.gems)?;
    for &k in &info.keys {
        wire::write_bool(w, k)?;
    }
    wire::write_i16(w, info.health)?;
    wire::write_i16(w, info.current_board)?;
    wire::write_i16(w, info.torches)?;
    wire::write_i16(w, info.torch_ticks)?;
    wire::write_i16(w, info.energizer_ticks)?;
    wire::write_zeros(w, 2)?;
    wire::write_i16(w, info.score)?;
    wire::write_pstring(w, &info.name, WORLD_STRING_LENGTH)?;
    for flag in &info.flags {
        wire::write_pstring(w, flag, WORLD_STRING_LENGTH)?;
    }
    wire::write_i16(w, info.board_time_sec)?;
    wire::write_i16(w, info.board_time_hsec)?;
    wire::write_bool(w, info.is_save)?;
    wire::write_zeros(w, 14)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn test_info_block_size() {
        let mut out = Vec::new();
        write_info(&mut out, &WorldInfo::default()).unwrap();
        assert_eq!(out.len(), WORLD_INFO_SIZE);
    }

    #[test]
    fn test_header_is_padded() {
        let mut world = World::new();
        let bytes = world.encode().unwrap();
        assert_eq!(&bytes[..4], &[0xFF, 0xFF, 0, 0]);
        let blob_len = u16::from_le_bytes([bytes[WORLD_HEADER_SIZE], bytes[WORLD_HEADER_SIZE + 1]]);
        assert_eq!(bytes.len(), WORLD_HEADER_SIZE + 2 + usize::from(blob_len));
    }

    #[test]
    fn test_roundtrip_keeps_boards_and_info() {
        let mut world = World::new();
        world.info.name = "CAVES".to_string();
        world.info.set_flag("LIT");
        world.info.keys[2] = true;
        let mut second = Board::new();
        second.name = "Tunnel".to_string();
        world.push_board(&second).unwrap();

        let bytes = world.encode().unwrap();
        let loaded = World::decode(&bytes, LoadMode::Full).unwrap();
        assert_eq!(loaded.info, world.info);
        assert_eq!(loaded.board_count(), 2);
        assert_eq!(loaded.board.name, "Title screen");
    }

    #[test]
    fn test_legacy_count_without_marker() {
        let mut world = World::new();
        let mut bytes = world.encode().unwrap();
        // Rewrite as a plain count: shift the info block left by two bytes.
        let mut legacy = vec![0u8, 0];
        legacy.extend_from_slice(&bytes[4..WORLD_HEADER_SIZE]);
        legacy.resize(WORLD_HEADER_SIZE, 0);
        legacy.extend_from_slice(&bytes.split_off(WORLD_HEADER_SIZE));
        let loaded = World::decode(&legacy, LoadMode::Full).unwrap();
        assert_eq!(loaded.info.health, 100);
    }

    #[test]
    fn test_unknown_marker_is_incompatible() {
        let mut world = World::new();
        let mut bytes = world.encode().unwrap();
        bytes[..2].copy_from_slice(&(-2i16).to_le_bytes());
        let err = World::decode(&bytes, LoadMode::Full).unwrap_err();
        assert!(matches!(err, FormatError::IncompatibleVersion(-2)));
    }

    #[test]
    fn test_title_only_marks_save() {
        let mut world = World::new();
        world.push_board(&Board::new()).unwrap();
        world.change_board(1).unwrap();
        let bytes = world.encode().unwrap();

        let title = World::decode(&bytes, LoadMode::TitleOnly).unwrap();
        assert_eq!(title.board_count(), 1);
        assert_eq!(title.info.current_board, 0);
        assert!(title.info.is_save);
    }
}

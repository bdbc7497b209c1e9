//! Binary board format.
//!
//! Layout: name (Pascal string, 50-byte field), RLE tile runs covering the
//! playable area row by row, an 86-byte info block, the last stat index
//! (`i16`), then one 33-byte record per stat. A record is followed by its
//! script bytes only when its length field is positive; a negative length
//! `-n` means "share the script of stat `n`".

use std::io::{Cursor, ErrorKind, Read, Write};

use tracing::debug;

use super::{
    BOARD_HEIGHT, BOARD_MESSAGE_LENGTH, BOARD_NAME_LENGTH, BOARD_WIDTH, Board, BoardInfo, MAX_STAT,
    Script, Stat, StatTable, Tile, TileGrid,
};
use crate::error::{FormatError, FormatResult};
use crate::wire;

/// One run of identical tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RleRun {
    /// Cells covered, 1..=255.
    pub count: u8,
    /// The repeated tile.
    pub tile: Tile,
}

/// Run-length encode the playable cells of `grid` in row-major order.
#[must_use]
pub fn rle_runs(grid: &TileGrid) -> Vec<RleRun> {
    let mut runs: Vec<RleRun> = Vec::new();
    for (_, _, tile) in grid.cells() {
        match runs.last_mut() {
            Some(run) if run.tile == tile && run.count < u8::MAX => run.count += 1,
            _ => runs.push(RleRun { count: 1, tile }),
        }
    }
    runs
}

impl Board {
    /// Serialize into a fresh byte vector.
    ///
    /// # Errors
    ///
    /// Returns an error if a script is too long for its length field.
    pub fn encode(&self) -> FormatResult<Vec<u8>> {
        let mut out = Vec::with_capacity(4096);
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Serialize to `w`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or a script is too long.
    pub fn write_to<W: Write>(&self, w: &mut W) -> FormatResult<()> {
        wire::write_pstring(w, &self.name, BOARD_NAME_LENGTH)?;
        for run in rle_runs(&self.tiles) {
            wire::write_u8(w, run.count)?;
            wire::write_u8(w, run.tile.element)?;
            wire::write_u8(w, run.tile.color)?;
        }
        write_info(w, &self.info)?;
        wire::write_i16(w, self.stats.count())?;
        for (index, stat) in self.stats.iter().enumerate() {
            write_stat(w, stat, self.script_owner(index))?;
        }
        Ok(())
    }

    /// Decode a standard-size board.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is truncated or malformed.
    pub fn decode(bytes: &[u8]) -> FormatResult<Board> {
        Self::read_from(&mut Cursor::new(bytes))
    }

    /// Decode a standard-size board from `r`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is truncated or malformed.
    pub fn read_from<R: Read>(r: &mut R) -> FormatResult<Board> {
        let name = wire::read_pstring(r, BOARD_NAME_LENGTH)?;
        let tiles = read_tiles(r, BOARD_WIDTH, BOARD_HEIGHT)?;
        let info = read_info(r)?;

        let count = wire::read_i16(r)?;
        if count < 0 || count as usize > MAX_STAT {
            return Err(FormatError::StatCount(count));
        }
        let mut stats: Vec<Stat> = Vec::with_capacity(count as usize + 1);
        for index in 0..=count as usize {
            let (mut stat, data_len) = read_stat(r)?;
            if data_len > 0 {
                stat.script = Some(Script::new(wire::read_bytes(r, data_len as usize)?));
            } else if data_len < 0 {
                let target = data_len.unsigned_abs() as usize;
                let owner = stats
                    .get(target)
                    .filter(|_| target < index)
                    .ok_or(FormatError::BadScriptAlias {
                        index,
                        target: data_len.saturating_neg(),
                    })?;
                stat.script.clone_from(&owner.script);
            }
            stats.push(stat);
        }
        debug!(name = %name, stats = count, "decoded board");

        Ok(Board {
            name,
            tiles,
            stats: StatTable::from_vec(stats, MAX_STAT),
            info,
        })
    }

    /// Lowest earlier non-player stat sharing the script of `index`.
    fn script_owner(&self, index: usize) -> Option<i16> {
        let script = self.stats.get(index as i16).script.as_ref()?;
        (1..index as i16).find(|&i| {
            self.stats
                .get(i)
                .script
                .as_ref()
                .is_some_and(|other| other.same_buffer(script))
        })
    }
}

fn read_tiles<R: Read>(r: &mut R, width: i16, height: i16) -> FormatResult<TileGrid> {
    let mut grid = TileGrid::new(width, height);
    let expected = grid.cell_count();
    let mut filled = 0usize;
    let truncated = |e: FormatError, filled: usize| match e {
        FormatError::Io(io) if io.kind() == ErrorKind::UnexpectedEof => {
            FormatError::TruncatedTiles { filled, expected }
        }
        other => other,
    };
    while filled < expected {
        let mut run = [0u8; 3];
        for b in &mut run {
            *b = wire::read_u8(r).map_err(|e| truncated(e, filled))?;
        }
        let [count, element, color] = run;
        if count == 0 {
            return Err(FormatError::ZeroLengthRun(filled));
        }
        // A run may overshoot the last cell; the excess is dropped.
        let take = usize::from(count).min(expected - filled);
        for cell in filled..filled + take {
            let x = (cell % width as usize) as i16 + 1;
            let y = (cell / width as usize) as i16 + 1;
            grid.set(x, y, Tile::new(element, color));
        }
        filled += take;
    }
    Ok(grid)
}

fn write_info<W: Write>(w: &mut W, info: &BoardInfo) -> FormatResult<()> {
    wire::write_u8(w, info.max_shots)?;
    wire::write_bool(w, info.is_dark)?;
    for &n in &info.neighbors {
        wire::write_u8(w, n)?;
    }
    wire::write_bool(w, info.reenter_when_zapped)?;
    wire::write_pstring(w, &info.message, BOARD_MESSAGE_LENGTH)?;
    wire::write_u8(w, info.start_x)?;
    wire::write_u8(w, info.start_y)?;
    wire::write_i16(w, info.time_limit)?;
    wire::write_zeros(w, 16)
}

fn read_info<R: Read>(r: &mut R) -> FormatResult<BoardInfo> {
    let max_shots = wire::read_u8(r)?;
    let is_dark = wire::read_bool(r)?;
    let mut neighbors = [0u8; 4];
    for n in &mut neighbors {
        *n = wire::read_u8(r)?;
    }
    let reenter_when_zapped = wire::read_bool(r)?;
    let message = wire::read_pstring(r, BOARD_MESSAGE_LENGTH)?;
    let start_x = wire::read_u8(r)?;
    let start_y = wire::read_u8(r)?;
    let time_limit = wire::read_i16(r)?;
    wire::skip(r, 16)?;
    Ok(BoardInfo {
        max_shots,
        is_dark,
        neighbors,
        reenter_when_zapped,
        message,
        start_x,
        start_y,
        time_limit,
    })
}

fn write_stat<W: Write>(w: &mut W, stat: &Stat, owner: Option<i16>) -> FormatResult<()> {
    let len = stat.script_len();
    let data_len = match owner {
        Some(owner) => -owner,
        None => i16::try_from(len).map_err(|_| FormatError::TooLong(len))?,
    };
    wire::write_u8(w, stat.x)?;
    wire::write_u8(w, stat.y)?;
    wire::write_i16(w, stat.step_x)?;
    wire::write_i16(w, stat.step_y)?;
    wire::write_i16(w, stat.cycle)?;
    wire::write_u8(w, stat.p1)?;
    wire::write_u8(w, stat.p2)?;
    wire::write_u8(w, stat.p3)?;
    wire::write_i16(w, stat.follower)?;
    wire::write_i16(w, stat.leader)?;
    wire::write_u8(w, stat.under.element)?;
    wire::write_u8(w, stat.under.color)?;
    wire::write_zeros(w, 4)?;
    wire::write_i16(w, stat.cursor)?;
    wire::write_i16(w, data_len)?;
    wire::write_zeros(w, 8)?;
    if data_len > 0
        && let Some(script) = &stat.script
    {
        script.with_bytes(|bytes| w.write_all(bytes))?;
    }
    Ok(())
}

fn read_stat<R: Read>(r: &mut R) -> FormatResult<(Stat, i16)> {
    let x = wire::read_u8(r)?;
    let y = wire::read_u8(r)?;
    let step_x = wire::read_i16(r)?;
    let step_y = wire::read_i16(r)?;
    let cycle = wire::read_i16(r)?;
    let p1 = wire::read_u8(r)?;
    let p2 = wire::read_u8(r)?;
    let p3 = wire::read_u8(r)?;
    let follower = wire::read_i16(r)?;
    let leader = wire::read_i16(r)?;
    let under = Tile::new(wire::read_u8(r)?, wire::read_u8(r)?);
    wire::skip(r, 4)?;
    let cursor = wire::read_i16(r)?;
    let data_len = wire::read_i16(r)?;
    wire::skip(r, 8)?;
    let stat = Stat {
        x,
        y,
        step_x,
        step_y,
        cycle,
        p1,
        p2,
        p3,
        follower,
        leader,
        under,
        script: None,
        cursor,
    };
    Ok((stat, data_len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::id;

    fn sample_board() -> Board {
        let mut board = Board::new();
        board.name = "Armory".to_string();
        board.info.is_dark = true;
        board.info.neighbors = [2, 0, 5, 0];
        board.info.message = "Welcome".to_string();
        board.info.time_limit = 90;
        board.tiles.set(5, 5, Tile::new(id::GEM, 0x0B));
        let template = Stat {
            p1: 2,
            script: Some(Script::from_text("@guard\n#walk n\n:touch\nHalt!\n")),
            ..Stat::default()
        };
        board.add_stat(10, 10, id::OBJECT, 0x0F, 3, &template);
        board
    }

    #[test]
    fn test_roundtrip() {
        let board = sample_board();
        let bytes = board.encode().unwrap();
        assert_eq!(Board::decode(&bytes).unwrap(), board);
    }

    #[test]
    fn test_stat_record_size() {
        let mut board = Board::new();
        let base = board.encode().unwrap().len();
        board.add_stat(3, 3, id::LION, 0x0C, 2, &Stat::default());
        assert_eq!(board.encode().unwrap().len(), base + 33);
    }

    #[test]
    fn test_shared_script_is_encoded_once() {
        let mut board = Board::new();
        let script = Script::from_text("@twin\n:a\n");
        for x in [10, 12] {
            let i = board
                .add_stat(x, 5, id::OBJECT, 0x0F, 3, &Stat::default())
                .unwrap();
            board.stats.get_mut(i).unwrap().script = Some(script.clone());
        }
        let bytes = board.encode().unwrap();
        let decoded = Board::decode(&bytes).unwrap();
        let a = decoded.stats.get(1).script.as_ref().unwrap();
        let b = decoded.stats.get(2).script.as_ref().unwrap();
        assert!(a.same_buffer(b));

        let single = {
            let mut solo = board.clone();
            solo.stats.get_mut(2).unwrap().script = None;
            solo.encode().unwrap().len()
        };
        assert_eq!(bytes.len(), single);
    }

    #[test]
    fn test_empty_script_roundtrips_as_none() {
        let mut board = Board::new();
        let template = Stat {
            script: Some(Script::new(Vec::new())),
            ..Stat::default()
        };
        board.add_stat(10, 5, id::OBJECT, 0x0F, 3, &template).unwrap();
        let decoded = Board::decode(&board.encode().unwrap()).unwrap();
        assert!(decoded.stats.get(1).script.is_none());
        assert_eq!(decoded, board);
    }

    #[test]
    fn test_runs_respect_limits() {
        let board = Board::new();
        let runs = rle_runs(&board.tiles);
        assert!(runs.iter().all(|r| r.count >= 1));
        let total: usize = runs.iter().map(|r| usize::from(r.count)).sum();
        assert_eq!(total, board.tiles.cell_count());
    }

    #[test]
    fn test_truncated_tiles() {
        let bytes = Board::new().encode().unwrap();
        let err = Board::decode(&bytes[..60]).unwrap_err();
        assert!(matches!(err, FormatError::TruncatedTiles { .. }));
    }

    #[test]
    fn test_zero_length_run_rejected() {
        let mut bytes = vec![0u8; 51];
        bytes.extend_from_slice(&[0, id::EMPTY, 0]);
        let err = Board::decode(&bytes).unwrap_err();
        assert!(matches!(err, FormatError::ZeroLengthRun(0)));
    }

    #[test]
    fn test_forward_alias_rejected() {
        let board = sample_board();
        let mut bytes = board.encode().unwrap();
        // Point stat 1's length field at itself.
        let stats_start = bytes.len() - 33 * 2 - board.stats.get(1).script_len();
        let len_offset = stats_start + 33 + 23;
        bytes[len_offset..len_offset + 2].copy_from_slice(&(-1i16).to_le_bytes());
        let err = Board::decode(&bytes).unwrap_err();
        assert!(matches!(err, FormatError::BadScriptAlias { index: 1, target: 1 }));
    }
}

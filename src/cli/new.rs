//! New command implementation.

use super::CliError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use zoo::board::Board;
use zoo::world::World;

/// Execute the new command: a title board plus `boards` empty boards, the
/// first of which the world starts on.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub(crate) fn execute(output: &Path, name: &str, boards: u8) -> Result<(), CliError> {
    let mut world = World::new();
    world.info.name = name.to_string();
    for i in 1..=boards {
        let mut board = Board::new();
        board.name = format!("Board {i}");
        world.push_board(&board)?;
    }
    if boards > 0 {
        world.open(1)?;
    }

    let file = File::create(output)
        .map_err(|e| CliError::new(format!("Failed to create {}: {e}", output.display())))?;
    let mut out = BufWriter::new(file);
    world.write_to(&mut out)?;
    out.flush()?;
    println!("Wrote {} ({} boards)", output.display(), world.board_count());
    Ok(())
}

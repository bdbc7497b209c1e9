//! Inspect command implementation.

use super::output::{WorldSummary, format_world_text};
use super::{CliError, OutputFormat, read_world};
use std::path::Path;
use zoo::world::LoadMode;

/// Execute the inspect command.
///
/// # Errors
///
/// Returns an error if the world cannot be loaded.
pub(crate) fn execute(world_path: &Path, title_only: bool, format: OutputFormat) -> Result<(), CliError> {
    let mode = if title_only { LoadMode::TitleOnly } else { LoadMode::Full };
    let world = read_world(world_path, mode)?;
    let summary = WorldSummary::from_world(&world);

    match format {
        OutputFormat::Text => print!("{}", format_world_text(&summary)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }
    Ok(())
}

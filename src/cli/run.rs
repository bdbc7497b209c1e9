//! Run command implementation.

use super::output::{RunReport, format_run_text};
use super::{CliError, OutputFormat, load_config, read_world, resolve_seed};
use std::path::Path;
use tracing::info;
use zoo::engine::Simulation;
use zoo::host::HeadlessHost;
use zoo::world::LoadMode;

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the world or config cannot be loaded, or the world
/// cannot be saved.
pub(crate) fn execute(
    world_path: &Path,
    ticks: u32,
    seed: Option<u32>,
    config_path: Option<&Path>,
    format: OutputFormat,
    save: Option<&Path>,
) -> Result<(), CliError> {
    let world = read_world(world_path, LoadMode::Full)?;
    let config = load_config(config_path, seed)?;
    let seed = resolve_seed(&config);

    let mut sim = Simulation::new(world, config, HeadlessHost::new(seed));
    sim.enter_play();
    sim.resume();
    let ticks_run = sim.run(ticks);
    info!(seed, ticks_run, "run finished");

    if let Some(save_path) = save
        && !sim.save_world(save_path)
    {
        return Err(CliError::new(format!("Failed to save {}", save_path.display())));
    }

    let report = RunReport::from_simulation(&sim, seed, ticks, ticks_run);
    match format {
        OutputFormat::Text => print!("{}", format_run_text(&report)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }
    Ok(())
}

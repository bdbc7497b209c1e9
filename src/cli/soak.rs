//! Soak command implementation.

use super::output::{SoakStats, format_soak_text};
use super::{CliError, OutputFormat, load_config, read_world, resolve_seed};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Instant;
use zoo::config::EngineConfig;
use zoo::engine::Simulation;
use zoo::host::{HeadlessHost, Lcg, PlayerInput};
use zoo::world::{LoadMode, World};

/// Options for the soak command.
#[derive(Debug)]
pub(crate) struct SoakOptions {
    pub(crate) world: PathBuf,
    pub(crate) runs: u32,
    pub(crate) ticks: u32,
    pub(crate) seed: Option<u32>,
    pub(crate) threads: Option<usize>,
    pub(crate) config: Option<PathBuf>,
    pub(crate) format: OutputFormat,
    pub(crate) progress: bool,
}

/// Random input: mostly moves, sometimes a shot or a torch.
fn random_input(rng: &mut Lcg) -> PlayerInput {
    let (dx, dy) = match rng.next(5) {
        0 => (0, -1),
        1 => (0, 1),
        2 => (-1, 0),
        3 => (1, 0),
        _ => (0, 0),
    };
    let mut input = PlayerInput::step(dx, dy);
    input.shoot = rng.next(8) == 0;
    input.torch = rng.next(64) == 0;
    input
}

/// Play one seed of the world. Each run decodes its own copy, so nothing is
/// shared between workers but the encoded bytes.
fn soak_one(bytes: &[u8], config: EngineConfig, seed: u32, ticks: u32, stats: &mut SoakStats) {
    let Ok(world) = World::decode(bytes, LoadMode::Full) else {
        stats.load_failures += 1;
        return;
    };
    let start_board = world.info.current_board;
    let config = EngineConfig {
        seed: Some(seed),
        ..config
    };
    let mut sim = Simulation::new(world, config, HeadlessHost::new(seed).without_event_log());
    sim.enter_play();
    sim.resume();

    let mut rng = Lcg::new(seed ^ 0x5EED);
    let mut done = 0;
    while done < ticks && !sim.is_game_over() && !sim.exit_requested() {
        sim.host.push_input(random_input(&mut rng));
        sim.tick();
        done += 1;
    }
    stats.add_run(&sim, start_board, done);
}

/// Execute the soak command.
///
/// # Errors
///
/// Returns an error if the world or config cannot be loaded.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn execute(options: &SoakOptions) -> Result<(), CliError> {
    let mut world = read_world(&options.world, LoadMode::Full)?;
    let bytes = world.encode()?;
    let config = load_config(options.config.as_deref(), options.seed)?;
    let base_seed = resolve_seed(&config);

    if let Some(num_threads) = options.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let pb = if options.progress {
        let pb = ProgressBar::new(u64::from(options.runs));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} runs ({per_sec})")
            .map_err(|e| CliError::new(e.to_string()))?
            .progress_chars("=>-");
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let ticks = options.ticks;
    let stats = (0..options.runs)
        .into_par_iter()
        .fold(SoakStats::default, |mut local, i| {
            soak_one(&bytes, config, base_seed.wrapping_add(i), ticks, &mut local);
            if let Some(pb) = &pb {
                pb.inc(1);
            }
            local
        })
        .reduce(SoakStats::default, |mut a, b| {
            a.merge(&b);
            a
        });

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }
    let duration = start.elapsed();

    match options.format {
        OutputFormat::Text => {
            print!("{}", format_soak_text(&stats));
            let ticks_per_sec = if duration.as_secs_f64() > 0.0 {
                stats.ticks as f64 / duration.as_secs_f64()
            } else {
                0.0
            };
            println!(
                "Duration: {:.2}s ({ticks_per_sec:.0} ticks/sec)",
                duration.as_secs_f64()
            );
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&stats)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }
    Ok(())
}

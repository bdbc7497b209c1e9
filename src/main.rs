//! Zoo CLI - run, inspect and watch tile worlds from the command line.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};

/// Zoo - a tile and actor engine with object scripts
#[derive(Parser, Debug)]
#[command(name = "zoo")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a world headlessly for a number of ticks
    Run {
        /// World file
        #[arg(required = true)]
        world: PathBuf,

        /// Ticks to run (default: 1000)
        #[arg(short, long, default_value = "1000")]
        ticks: u32,

        /// Random seed (default: from config, else random)
        #[arg(short, long)]
        seed: Option<u32>,

        /// Engine config file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Write the world here after the run
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Summarize a world file and its boards
    Inspect {
        /// World file
        #[arg(required = true)]
        world: PathBuf,

        /// Load only the title board
        #[arg(long)]
        title_only: bool,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Play a world in the terminal
    Watch {
        /// World file
        #[arg(required = true)]
        world: PathBuf,

        /// Random seed
        #[arg(short, long)]
        seed: Option<u32>,

        /// Engine config file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Tick delay in milliseconds (default: from the config's tick speed)
        #[arg(long)]
        speed: Option<u64>,
    },

    /// Run many seeds of a world in parallel with random input
    Soak {
        /// World file
        #[arg(required = true)]
        world: PathBuf,

        /// Number of runs (default: 100)
        #[arg(short, long, default_value = "100")]
        runs: u32,

        /// Ticks per run (default: 2000)
        #[arg(short, long, default_value = "2000")]
        ticks: u32,

        /// Starting seed (increments for each run)
        #[arg(short, long)]
        seed: Option<u32>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Engine config file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Write a fresh world file
    New {
        /// Output file
        #[arg(required = true)]
        output: PathBuf,

        /// World name
        #[arg(short, long, default_value = "UNTITLED")]
        name: String,

        /// Playable boards after the title board (default: 1)
        #[arg(short, long, default_value = "1")]
        boards: u8,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let result = match args.command {
        Commands::Run {
            world,
            ticks,
            seed,
            config,
            format,
            save,
        } => cli::run::execute(&world, ticks, seed, config.as_deref(), format, save.as_deref()),

        Commands::Inspect {
            world,
            title_only,
            format,
        } => cli::inspect::execute(&world, title_only, format),

        Commands::Watch {
            world,
            seed,
            config,
            speed,
        } => cli::watch::execute(&world, seed, config.as_deref(), speed),

        Commands::Soak {
            world,
            runs,
            ticks,
            seed,
            threads,
            config,
            format,
            progress,
        } => cli::soak::execute(&cli::soak::SoakOptions {
            world,
            runs,
            ticks,
            seed,
            threads,
            config,
            format,
            progress,
        }),

        Commands::New { output, name, boards } => cli::new::execute(&output, &name, boards),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

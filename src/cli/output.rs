//! Output formatting utilities for CLI.

use serde::Serialize;
use std::fmt::Write as _;
use zoo::board::Board;
use zoo::elements::{self, id};
use zoo::engine::Simulation;
use zoo::host::HeadlessHost;
use zoo::world::{World, WorldInfo};

/// JSON-serializable result of a headless run.
#[derive(Debug, Serialize)]
pub(super) struct RunReport {
    /// Random seed used.
    pub(super) seed: u32,
    /// Ticks requested.
    pub(super) ticks_requested: u32,
    /// Ticks actually run.
    pub(super) ticks_run: u32,
    /// Board the run ended on.
    pub(super) board: i16,
    /// Its name.
    pub(super) board_name: String,
    /// Stats on that board, the player included.
    pub(super) stats: usize,
    /// Status messages shown.
    pub(super) messages: usize,
    /// Text windows shown.
    pub(super) windows: usize,
    /// Script errors raised.
    pub(super) script_errors: usize,
    /// Whether the player died.
    pub(super) game_over: bool,
    /// Final world counters and flags.
    pub(super) info: WorldInfo,
}

impl RunReport {
    /// Collect the report from a finished simulation.
    pub(super) fn from_simulation(
        sim: &Simulation<HeadlessHost>,
        seed: u32,
        ticks_requested: u32,
        ticks_run: u32,
    ) -> Self {
        Self {
            seed,
            ticks_requested,
            ticks_run,
            board: sim.world.info.current_board,
            board_name: sim.world.board.name.clone(),
            stats: sim.world.board.stats.len(),
            messages: sim.host.messages().count(),
            windows: sim.host.windows().count(),
            script_errors: sim.host.script_errors(),
            game_over: sim.is_game_over(),
            info: sim.world.info.clone(),
        }
    }
}

/// Format a run report as human-readable text.
pub(super) fn format_run_text(report: &RunReport) -> String {
    let info = &report.info;
    let mut output = String::new();
    let _ = writeln!(output, "Run Result (seed: {})", report.seed);
    let _ = writeln!(output, "  Ticks: {}/{}", report.ticks_run, report.ticks_requested);
    let _ = writeln!(output, "  Board: {} ({})", report.board, report.board_name);
    let _ = writeln!(output, "  Stats: {}", report.stats);
    let _ = writeln!(
        output,
        "  Health: {}  Ammo: {}  Gems: {}  Torches: {}  Score: {}",
        info.health, info.ammo, info.gems, info.torches, info.score
    );
    let keys: String = info
        .keys
        .iter()
        .enumerate()
        .filter(|&(_, &held)| held)
        .map(|(i, _)| char::from(b'1' + i as u8))
        .collect();
    if !keys.is_empty() {
        let _ = writeln!(output, "  Keys: {keys}");
    }
    let flags: Vec<&str> = info.flags.iter().filter(|f| !f.is_empty()).map(String::as_str).collect();
    if !flags.is_empty() {
        let _ = writeln!(output, "  Flags: {}", flags.join(", "));
    }
    let _ = writeln!(
        output,
        "  Messages: {}  Windows: {}  Script errors: {}",
        report.messages, report.windows, report.script_errors
    );
    if report.game_over {
        output.push_str("  GAME OVER\n");
    }
    output
}

/// JSON-serializable world summary.
#[derive(Debug, Serialize)]
pub(super) struct WorldSummary {
    /// World name.
    pub(super) name: String,
    /// Board count, title included.
    pub(super) board_count: usize,
    /// Board the world opens on.
    pub(super) current_board: i16,
    /// Whether the file is a saved game.
    pub(super) is_save: bool,
    /// World counters and flags.
    pub(super) info: WorldInfo,
    /// Per-board summaries.
    pub(super) boards: Vec<BoardSummary>,
}

/// JSON-serializable board summary.
#[derive(Debug, Serialize)]
pub(super) struct BoardSummary {
    /// Board id.
    pub(super) id: i16,
    /// Stored blob size in bytes.
    pub(super) bytes: usize,
    /// Board name, empty when the blob failed to decode.
    pub(super) name: String,
    /// Stats, the player included.
    pub(super) stats: usize,
    /// `@name` of every object that has one.
    pub(super) objects: Vec<String>,
    /// Total script bytes, shared buffers counted once per owner.
    pub(super) script_bytes: usize,
    /// Whether the board is dark.
    pub(super) dark: bool,
    /// Shot limit.
    pub(super) max_shots: u8,
    /// Exits: north, south, west, east.
    pub(super) neighbors: [u8; 4],
    /// Time limit in seconds, 0 for none.
    pub(super) time_limit: i16,
    /// Number of non-empty tiles.
    pub(super) tiles_used: usize,
    /// Decode error, when there is one.
    pub(super) error: Option<String>,
}

impl BoardSummary {
    /// Summarize the blob of board `id`.
    pub(super) fn from_blob(id: i16, blob: &[u8]) -> Self {
        match Board::decode(blob) {
            Ok(board) => Self::from_board(id, blob.len(), &board),
            Err(e) => Self {
                id,
                bytes: blob.len(),
                name: String::new(),
                stats: 0,
                objects: Vec::new(),
                script_bytes: 0,
                dark: false,
                max_shots: 0,
                neighbors: [0; 4],
                time_limit: 0,
                tiles_used: 0,
                error: Some(e.to_string()),
            },
        }
    }

    fn from_board(id: i16, bytes: usize, board: &Board) -> Self {
        let objects = (1..=board.stats.count())
            .filter(|&i| {
                let (x, y) = board.stats.get(i).pos();
                board.tiles.get(x, y).element == id::OBJECT
            })
            .filter_map(|i| board.object_name(i))
            .collect();
        Self {
            id,
            bytes,
            name: board.name.clone(),
            stats: board.stats.len(),
            objects,
            script_bytes: board.stats.iter().map(zoo::board::Stat::script_len).sum(),
            dark: board.info.is_dark,
            max_shots: board.info.max_shots,
            neighbors: board.info.neighbors,
            time_limit: board.info.time_limit,
            tiles_used: board.tiles.cells().filter(|&(_, _, t)| t.element != id::EMPTY).count(),
            error: None,
        }
    }
}

impl WorldSummary {
    /// Summarize every stored board of `world`.
    pub(super) fn from_world(world: &World) -> Self {
        let boards = (0..world.board_count())
            .filter_map(|i| {
                let id = i16::try_from(i).ok()?;
                world.board_blob(id).map(|blob| BoardSummary::from_blob(id, blob))
            })
            .collect();
        Self {
            name: world.info.name.clone(),
            board_count: world.board_count(),
            current_board: world.info.current_board,
            is_save: world.info.is_save,
            info: world.info.clone(),
            boards,
        }
    }
}

/// Format a world summary as human-readable text.
pub(super) fn format_world_text(summary: &WorldSummary) -> String {
    let mut output = String::new();
    let name = if summary.name.is_empty() { "(unnamed)" } else { &summary.name };
    let _ = writeln!(output, "World: {name}");
    let _ = writeln!(
        output,
        "  Boards: {}  Current: {}  Saved game: {}",
        summary.board_count,
        summary.current_board,
        if summary.is_save { "yes" } else { "no" }
    );
    output.push('\n');
    for board in &summary.boards {
        if let Some(error) = &board.error {
            let _ = writeln!(output, "  [{:>3}] <{error}> ({} bytes)", board.id, board.bytes);
            continue;
        }
        let _ = write!(
            output,
            "  [{:>3}] {:<50} {:>3} stats {:>5} bytes",
            board.id, board.name, board.stats, board.bytes
        );
        if board.dark {
            output.push_str(" dark");
        }
        let exits: Vec<String> = ["N", "S", "W", "E"]
            .iter()
            .zip(board.neighbors)
            .filter(|&(_, to)| to != 0)
            .map(|(side, to)| format!("{side}>{to}"))
            .collect();
        if !exits.is_empty() {
            let _ = write!(output, " exits {}", exits.join(" "));
        }
        output.push('\n');
        if !board.objects.is_empty() {
            let _ = writeln!(output, "        objects: {}", board.objects.join(", "));
        }
    }
    output
}

/// Totals over many soak runs.
#[derive(Debug, Clone, Default, Serialize)]
pub(super) struct SoakStats {
    /// Runs completed.
    pub(super) runs: u64,
    /// Ticks run in total.
    pub(super) ticks: u64,
    /// Runs that ended with the player dead.
    pub(super) deaths: u64,
    /// Runs that left the starting board.
    pub(super) left_start: u64,
    /// Script errors across all runs.
    pub(super) script_errors: u64,
    /// Sum of final scores.
    pub(super) total_score: i64,
    /// Best final score.
    pub(super) best_score: i16,
    /// Runs whose world failed to load.
    pub(super) load_failures: u64,
}

impl SoakStats {
    /// Add one finished run.
    pub(super) fn add_run(&mut self, sim: &Simulation<HeadlessHost>, start_board: i16, ticks: u32) {
        self.runs += 1;
        self.ticks += u64::from(ticks);
        self.deaths += u64::from(sim.is_game_over());
        self.left_start += u64::from(sim.world.info.current_board != start_board);
        self.script_errors += sim.host.script_errors() as u64;
        self.total_score += i64::from(sim.world.info.score);
        self.best_score = self.best_score.max(sim.world.info.score);
    }

    /// Merge another accumulator.
    pub(super) fn merge(&mut self, other: &Self) {
        self.runs += other.runs;
        self.ticks += other.ticks;
        self.deaths += other.deaths;
        self.left_start += other.left_start;
        self.script_errors += other.script_errors;
        self.total_score += other.total_score;
        self.best_score = self.best_score.max(other.best_score);
        self.load_failures += other.load_failures;
    }
}

/// Format soak totals as human-readable text.
#[allow(clippy::cast_precision_loss)]
pub(super) fn format_soak_text(stats: &SoakStats) -> String {
    let mut output = String::new();
    let runs = stats.runs.max(1) as f64;
    let _ = writeln!(output, "Soak Result ({} runs, {} ticks)", stats.runs, stats.ticks);
    let _ = writeln!(
        output,
        "  Deaths: {} ({:.1}%)",
        stats.deaths,
        stats.deaths as f64 * 100.0 / runs
    );
    let _ = writeln!(output, "  Left starting board: {}", stats.left_start);
    let _ = writeln!(output, "  Script errors: {}", stats.script_errors);
    let _ = writeln!(
        output,
        "  Score: {:.1} average, {} best",
        stats.total_score as f64 / runs,
        stats.best_score
    );
    if stats.load_failures > 0 {
        let _ = writeln!(output, "  Load failures: {}", stats.load_failures);
    }
    output
}

/// Name of the element at a glyph position, for status lines.
pub(super) fn element_name(element: u8) -> &'static str {
    match elements::def(element).name {
        "" => "?",
        name => name,
    }
}

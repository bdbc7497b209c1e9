//! Simulation state and the tick loop.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use super::TICK_WRAP;
use crate::board::Tile;
use crate::config::EngineConfig;
use crate::elements::{self, id};
use crate::error::{FormatError, FormatResult};
use crate::host::{Host, PlayerInput, TextWindow};
use crate::world::{LoadMode, World};

/// What the player slot is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Attract mode: the player slot is a monitor and ignores input.
    Title,
    /// Normal play.
    Play,
}

/// One-shot hints; `true` means not shown yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct Hints {
    pub(crate) ammo: bool,
    pub(crate) out_of_ammo: bool,
    pub(crate) no_shooting: bool,
    pub(crate) torch: bool,
    pub(crate) out_of_torches: bool,
    pub(crate) room_not_dark: bool,
    pub(crate) room_dark: bool,
    pub(crate) gem: bool,
    pub(crate) energizer: bool,
    pub(crate) forest: bool,
    pub(crate) fake: bool,
}

impl Default for Hints {
    fn default() -> Self {
        Self {
            ammo: true,
            out_of_ammo: true,
            no_shooting: true,
            torch: true,
            out_of_torches: true,
            room_not_dark: true,
            room_dark: true,
            gem: true,
            energizer: true,
            forest: true,
            fake: true,
        }
    }
}

/// Returns `true` the first time it is called on a flag.
pub(crate) fn first_time(flag: &mut bool) -> bool {
    std::mem::replace(flag, false)
}

/// A running world plus everything needed to advance it.
///
/// There is no global state: two simulations never interact, so many can
/// run side by side on different threads.
#[derive(Debug)]
pub struct Simulation<H: Host> {
    /// The world being played.
    pub world: World,
    /// Engine tunables.
    pub config: EngineConfig,
    /// Presentation, input, sound and randomness.
    pub host: H,
    pub(crate) mode: Mode,
    pub(crate) current_tick: i16,
    pub(crate) current_stat: i16,
    pub(crate) executing: Option<i16>,
    pub(crate) message_ticks: i16,
    pub(crate) paused: bool,
    pub(crate) hints: Hints,
    pub(crate) input: PlayerInput,
    pub(crate) return_board: i16,
    pub(crate) exit_requested: bool,
}

impl<H: Host> Simulation<H> {
    /// Play the world's current board right away.
    pub fn new(world: World, config: EngineConfig, host: H) -> Self {
        let return_board = world.info.current_board;
        Self {
            world,
            config,
            host,
            mode: Mode::Play,
            current_tick: 0,
            current_stat: 0,
            executing: None,
            message_ticks: 0,
            paused: false,
            hints: Hints::default(),
            input: PlayerInput::default(),
            return_board,
            exit_requested: false,
        }
    }

    /// Show the title board in attract mode. [`Simulation::enter_play`]
    /// later returns to the board the world was saved on.
    pub fn title(world: World, config: EngineConfig, host: H) -> Self {
        let mut sim = Self::new(world, config, host);
        sim.mode = Mode::Title;
        sim.board_change(0);
        sim.stamp_player_slot();
        sim.current_tick = sim.host.random(100);
        sim.redraw();
        sim
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Tick counter, 1..=420.
    #[must_use]
    pub const fn current_tick(&self) -> i16 {
        self.current_tick
    }

    /// Whether the game waits for the player to move.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Ticks left on the status message.
    #[must_use]
    pub const fn message_ticks(&self) -> i16 {
        self.message_ticks
    }

    /// Whether the player asked to stop and confirmed.
    #[must_use]
    pub const fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Whether the player has run out of health.
    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        matches!(self.mode, Mode::Play) && self.world.info.health <= 0
    }

    /// Leave the title screen and start playing. The game starts paused
    /// until the player moves.
    pub fn enter_play(&mut self) {
        if self.mode == Mode::Title {
            self.board_change(self.return_board);
        }
        self.mode = Mode::Play;
        self.stamp_player_slot();
        self.board_enter();
        self.paused = true;
        self.redraw();
        debug!(board = self.world.info.current_board, "entered play");
    }

    /// Drop the pause without a player move.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Ask to end the game. A dead player leaves without a question.
    pub fn request_end_play(&mut self) {
        self.exit_requested = self.world.info.health <= 0 || self.host.prompt_yes_no("End this game? ");
    }

    /// Advance one tick: every scheduled stat acts once, in table order.
    ///
    /// While paused, the tick only waits for a player move instead.
    pub fn tick(&mut self) {
        if self.exit_requested {
            return;
        }
        if self.paused {
            self.paused_step();
            return;
        }

        self.current_tick += 1;
        if self.current_tick > TICK_WRAP {
            self.current_tick = 1;
        }
        self.input = self.host.poll_input();

        self.current_stat = 0;
        while self.current_stat <= self.world.board.stats.count() && !self.exit_requested {
            let index = self.current_stat;
            let cycle = self.world.board.stats.get(index).cycle;
            if cycle != 0 && self.current_tick % cycle == index % cycle {
                self.tick_stat(index);
            }
            self.current_stat += 1;
        }
        self.update_message_timer();
    }

    /// Run `ticks` ticks, stopping early on exit or game over.
    /// Returns the number of ticks run.
    pub fn run(&mut self, ticks: u32) -> u32 {
        for done in 0..ticks {
            if self.exit_requested || self.is_game_over() {
                return done;
            }
            self.tick();
        }
        ticks
    }

    fn paused_step(&mut self) {
        let mut input = self.host.poll_input();
        if input.quit {
            self.request_end_play();
        }
        if !input.has_direction() {
            return;
        }
        let (px, py) = self.world.board.player_pos();
        self.touch(px + input.dx, py + input.dy, 0, &mut input.dx, &mut input.dy);

        let (px, py) = self.world.board.player_pos();
        let (tx, ty) = (px + input.dx, py + input.dy);
        if input.has_direction() && elements::def(self.world.board.tiles.get(tx, ty).element).walkable {
            if self.world.board.tiles.get(px, py).element == id::PLAYER {
                self.move_stat(0, tx, ty);
            } else {
                // The player stat sits on a passage after a teleport.
                self.draw_tile(px, py);
                let player = self.world.board.stats.player_mut();
                player.x = tx as u8;
                player.y = ty as u8;
                self.world
                    .board
                    .tiles
                    .set(tx, ty, Tile::new(id::PLAYER, elements::def(id::PLAYER).color));
                self.draw_tile(tx, ty);
                self.draw_player_surroundings(tx, ty);
                self.draw_player_surroundings(px, py);
            }
            self.paused = false;
            self.current_tick = self.host.random(100);
            self.world.info.is_save = true;
        }
    }

    fn update_message_timer(&mut self) {
        if self.message_ticks > 0 {
            self.message_ticks -= 1;
            if self.message_ticks == 0 {
                self.world.board.info.message.clear();
                self.host.display_message(0, "");
            }
        }
    }

    /// Show a status message. `ticks` is in hundredths of a second and is
    /// converted to game ticks at the configured speed.
    pub fn display_message(&mut self, ticks: i16, text: &str) {
        self.world.board.info.message = text.to_string();
        self.message_ticks = if text.is_empty() {
            0
        } else {
            (ticks / (self.config.tick_duration() + 1)).max(1)
        };
        self.host.display_message(ticks, text);
    }

    pub(crate) fn stamp_player_slot(&mut self) {
        let element = match self.mode {
            Mode::Title => id::MONITOR,
            Mode::Play => id::PLAYER,
        };
        let (x, y) = self.world.board.player_pos();
        self.world
            .board
            .tiles
            .set(x, y, Tile::new(element, elements::def(element).color));
    }

    /// Store the live board and open board `id`. A board that fails to
    /// decode is reported and the previous board stays live.
    pub fn board_change(&mut self, id: i16) {
        if let Err(err) = self.world.change_board(id) {
            self.report_io_error(&err);
        }
        self.redraw();
    }

    /// Record the entry point and reset the board clock.
    pub fn board_enter(&mut self) {
        let (x, y) = self.world.board.player_pos();
        self.world.board.info.start_x = x as u8;
        self.world.board.info.start_y = y as u8;
        if self.world.board.info.is_dark && first_time(&mut self.hints.room_dark) {
            self.display_message(self.config.message_duration, "Room is dark - you need to light a torch!");
        }
        self.world.info.board_time_sec = 0;
    }

    /// Replace the world with the one stored at `path`.
    ///
    /// Failures are reported through the host and leave the current world
    /// untouched. Returns whether the load succeeded.
    pub fn load_world(&mut self, path: &Path, mode: LoadMode) -> bool {
        let loaded = File::open(path)
            .map_err(FormatError::from)
            .and_then(|f| World::read_from(&mut BufReader::new(f), mode));
        match loaded {
            Ok(world) => {
                info!(path = %path.display(), "world loaded");
                self.world = world;
                self.return_board = self.world.info.current_board;
                self.hints = Hints::default();
                if self.mode == Mode::Title {
                    self.board_change(0);
                    self.stamp_player_slot();
                }
                self.redraw();
                true
            }
            Err(err) => {
                self.report_io_error(&err);
                false
            }
        }
    }

    /// Write the world to `path`. Failures are reported through the host.
    pub fn save_world(&mut self, path: &Path) -> bool {
        match self.write_world(path) {
            Ok(()) => {
                info!(path = %path.display(), "world saved");
                true
            }
            Err(err) => {
                self.report_io_error(&err);
                false
            }
        }
    }

    fn write_world(&mut self, path: &Path) -> FormatResult<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.world.write_to(&mut out)?;
        out.flush()?;
        Ok(())
    }

    /// Show a file or format error as a popup.
    pub fn report_io_error(&mut self, err: &FormatError) {
        warn!(error = %err, "world I/O failed");
        let lines = match err {
            FormatError::IncompatibleVersion(_) => vec![
                "This world was made by a newer".to_string(),
                "version and cannot be loaded.".to_string(),
            ],
            _ => vec![
                "This may be caused by a missing".to_string(),
                "or damaged world file. If you".to_string(),
                "are saving, the disk may be full.".to_string(),
            ],
        };
        let window = TextWindow {
            title: err.to_string(),
            lines,
        };
        self.host.display_lines(&window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Stat};
    use crate::host::HeadlessHost;

    fn sim() -> Simulation<HeadlessHost> {
        Simulation::new(World::new(), EngineConfig::default(), HeadlessHost::new(7))
    }

    #[test]
    fn test_tick_counter_wraps() {
        let mut sim = sim();
        sim.current_tick = TICK_WRAP;
        sim.tick();
        assert_eq!(sim.current_tick(), 1);
    }

    #[test]
    fn test_stat_scheduling_by_cycle() {
        let mut sim = sim();
        sim.world.board.add_stat(10, 10, id::OBJECT, 0x0F, 3, &Stat::default());
        // A scriptless object with no step does nothing, so count calls via
        // the cursor halting: cursor 0 on an empty script halts at -1.
        sim.current_tick = 1;
        sim.tick(); // tick 2: 2 % 3 == 1 % 3 is false
        assert_eq!(sim.world.board.stats.get(1).cursor, 0);
        sim.tick(); // tick 3: 3 % 3 == 0 != 1
        sim.tick(); // tick 4: 4 % 3 == 1 == 1 % 3
        assert_eq!(sim.world.board.stats.get(1).cursor, -1);
    }

    #[test]
    fn test_message_timer_clears_board_message() {
        let mut sim = sim();
        sim.display_message(18, "Hi");
        assert_eq!(sim.message_ticks(), 2);
        sim.tick();
        assert_eq!(sim.world.board.info.message, "Hi");
        sim.tick();
        assert!(sim.world.board.info.message.is_empty());
    }

    #[test]
    fn test_end_play_asks_host() {
        let mut sim = sim();
        sim.host.push_answer(true);
        sim.request_end_play();
        assert!(sim.exit_requested());
    }

    #[test]
    fn test_title_then_play_returns_to_saved_board() {
        let mut world = World::new();
        let id = world.push_board(&Board::new()).unwrap();
        world.change_board(id).unwrap();
        let mut sim = Simulation::title(world, EngineConfig::default(), HeadlessHost::new(1));
        assert_eq!(sim.world.info.current_board, 0);
        let (x, y) = sim.world.board.player_pos();
        assert_eq!(sim.world.board.tiles.get(x, y).element, id::MONITOR);

        sim.enter_play();
        assert_eq!(sim.world.info.current_board, id);
        assert!(sim.is_paused());
        let (x, y) = sim.world.board.player_pos();
        assert_eq!(sim.world.board.tiles.get(x, y).element, id::PLAYER);
    }

    #[test]
    fn test_paused_game_resumes_on_move() {
        let mut sim = sim();
        sim.enter_play();
        let (x, y) = sim.world.board.player_pos();
        sim.host.push_input(PlayerInput::step(1, 0));
        sim.tick();
        assert!(!sim.is_paused());
        assert_eq!(sim.world.board.player_pos(), (x + 1, y));
    }

    #[test]
    fn test_failed_load_keeps_world() {
        let mut sim = sim();
        sim.world.info.name = "KEEP".to_string();
        assert!(!sim.load_world(Path::new("/nonexistent/world.zzt"), LoadMode::Full));
        assert_eq!(sim.world.info.name, "KEEP");
        assert_eq!(sim.host.windows().count(), 1);
    }
}

//! The script interpreter.
//!
//! One invocation runs a stat's script from its cursor until the object
//! moves, idles, ends, becomes something else, or runs out of its
//! instruction budget. Text lines collected on the way are shown once the
//! invocation stops.

use tracing::{debug, trace};

use super::cursor::Cursor;
use crate::board::{BOARD_HEIGHT, BOARD_WIDTH, Stat, Tile};
use crate::elements::{self, COLOR_SPECIAL_MIN, id};
use crate::engine::{SHOT_SOURCE_ENEMY, Simulation};
use crate::error::ScriptError;
use crate::host::{Host, TextWindow};
use crate::sound;
use crate::world::Counter;

const SOUND_ENEMY_SHOT: &[u8] = b"0\x01&\x01";
const SOUND_SCRIPT_ERROR: &[u8] = b"P\n";
const ERROR_MESSAGE_TICKS: i16 = 200;
const DEFAULT_TITLE: &str = "Interaction";

/// How parsing continues after an instruction.
enum Step {
    /// Check the stop conditions, then read the next instruction.
    Done,
    /// Read the next instruction without checking.
    Again,
}

/// What follows a command on its line.
enum Flow {
    /// Skip the rest of the line unless the command kept it.
    Next,
    /// Run the rest of the line as another command.
    ReadCommand,
}

/// State of one script invocation. The running stat is always
/// `sim.executing`, which follows the stat when the table shifts.
pub(super) struct Invocation<'s, H: Host> {
    pub(super) sim: &'s mut Simulation<H>,
    ch: u8,
    stop: bool,
    repeat: bool,
    replace: Option<Tile>,
    end: bool,
    line_finished: bool,
    instructions: u16,
    last_position: i16,
    text: Vec<String>,
}

impl<H: Host> Simulation<H> {
    /// Run stat `id`'s script for one tick.
    ///
    /// `default_name` titles a multi-line text window when the script has no
    /// `@name` line. Returns the stat's index afterwards, or `None` when the
    /// stat no longer exists.
    pub fn execute_script(&mut self, id: i16, default_name: &str) -> Option<i16> {
        let outer = self.executing.replace(id);
        Invocation::new(self).run(default_name);
        std::mem::replace(&mut self.executing, outer)
    }

    /// Run stat `id`'s script once, outside the tick schedule.
    pub fn execute_one(&mut self, id: i16) -> Option<i16> {
        self.execute_script(id, DEFAULT_TITLE)
    }
}

impl<'s, H: Host> Invocation<'s, H> {
    fn new(sim: &'s mut Simulation<H>) -> Self {
        Self {
            sim,
            ch: 0,
            stop: false,
            repeat: false,
            replace: None,
            end: false,
            line_finished: true,
            instructions: 0,
            last_position: 0,
            text: Vec::new(),
        }
    }

    pub(super) fn id(&self) -> i16 {
        self.sim.executing.unwrap_or(-1)
    }

    pub(super) fn pos(&self) -> (i16, i16) {
        self.sim.world.board.stats.get(self.id()).pos()
    }

    fn own_mut(&mut self) -> Option<&mut Stat> {
        let id = self.id();
        self.sim.world.board.stats.get_mut(id)
    }

    fn cursor(&self) -> i16 {
        self.sim.world.board.stats.get(self.id()).cursor
    }

    fn set_cursor(&mut self, pos: i16) {
        if let Some(stat) = self.own_mut() {
            stat.cursor = pos;
        }
    }

    /// Run `read` on a cursor over the running stat's script.
    fn with_cursor<T>(&mut self, read: impl FnOnce(&mut Cursor<'_>) -> T) -> T {
        let id = self.id();
        let mut detached = -1;
        let mut cursor = match self.sim.world.board.stats.get_mut(id) {
            Some(stat) => Cursor::new(stat.script.as_ref(), &mut stat.cursor),
            None => Cursor::new(None, &mut detached),
        };
        let value = read(&mut cursor);
        self.ch = cursor.ch;
        value
    }

    fn read_char(&mut self) -> u8 {
        self.with_cursor(|c| c.read_char())
    }

    pub(super) fn read_word(&mut self) -> String {
        self.with_cursor(|c| c.read_word())
    }

    fn read_value(&mut self) -> i16 {
        self.with_cursor(|c| c.read_value())
    }

    fn skip_line(&mut self) {
        self.with_cursor(|c| c.skip_line());
    }

    fn read_line_to_end(&mut self) -> String {
        self.with_cursor(|c| c.read_line_to_end())
    }

    fn finished(&self) -> bool {
        self.end
            || self.stop
            || self.repeat
            || self.replace.is_some()
            || self.instructions >= self.sim.config.instruction_budget
            || self.sim.executing.is_none()
    }

    fn run(mut self, default_name: &str) {
        loop {
            self.stop = false;
            self.repeat = false;
            self.replace = None;
            self.end = false;
            self.instructions = 0;
            self.text.clear();

            loop {
                match self.instruction() {
                    Ok(Step::Again) => continue,
                    Ok(Step::Done) => {}
                    Err(err) => {
                        self.fail(&err);
                        break;
                    }
                }
                if self.finished() {
                    break;
                }
            }

            if self.repeat {
                self.set_cursor(self.last_position);
            }
            if self.ch == 0 {
                self.set_cursor(-1);
            }

            match self.text.len() {
                0 => {}
                1 => {
                    let line = self.text.remove(0);
                    let duration = self.sim.config.message_duration;
                    self.sim.display_message(duration, &line);
                }
                _ => {
                    if self.show_window(default_name) {
                        continue;
                    }
                }
            }
            break;
        }

        if let (Some(tile), Some(id)) = (self.replace, self.sim.executing) {
            let (x, y) = self.pos();
            self.sim.damage_stat(id);
            self.sim.place_tile(x, y, tile);
        }
    }

    /// Show the collected lines as a window. Returns whether a chosen
    /// hyperlink sent this stat to a label.
    fn show_window(&mut self, default_name: &str) -> bool {
        let script = self.sim.world.board.stats.get(self.id()).script.clone();
        let mut name_pos = 0;
        let mut name = Cursor::new(script.as_ref(), &mut name_pos);
        let mut title = if name.read_char() == b'@' {
            name.read_line_to_end()
        } else {
            default_name.to_string()
        };
        if title.is_empty() {
            title = DEFAULT_TITLE.to_string();
        }

        let window = TextWindow {
            title,
            lines: std::mem::take(&mut self.text),
        };
        let Some(label) = self.sim.host.display_lines(&window) else {
            return false;
        };
        let id = self.id();
        self.sim
            .world
            .board
            .send(id, &label.to_ascii_uppercase(), false, false)
    }

    fn fail(&mut self, err: &ScriptError) {
        debug!(stat = self.id(), error = %err, "script error");
        self.sim
            .display_message(ERROR_MESSAGE_TICKS, &format!("ERR: {err}"));
        self.sim.host.queue_sound(5, SOUND_SCRIPT_ERROR);
        self.set_cursor(-1);
        self.ch = 0;
        self.repeat = false;
    }

    fn instruction(&mut self) -> Result<Step, ScriptError> {
        self.line_finished = true;
        self.last_position = self.cursor();
        self.read_char();
        while self.ch == b':' {
            self.skip_line();
            self.read_char();
        }

        match self.ch {
            b'\'' | b'@' => self.skip_line(),
            b'/' | b'?' => self.shorthand_move()?,
            b'#' => return self.command(),
            b'\r' => {
                if !self.text.is_empty() {
                    self.text.push(String::new());
                }
            }
            0 => self.end = true,
            first => {
                let rest = self.read_line_to_end();
                self.text.push(format!("{}{rest}", char::from(first)));
            }
        }
        Ok(Step::Done)
    }

    /// `/dir` moves and retries until it succeeds; `?dir` tries once.
    fn shorthand_move(&mut self) -> Result<(), ScriptError> {
        if self.ch == b'/' {
            self.repeat = true;
        }
        let (dx, dy) = self.read_direction()?;
        if dx == 0 && dy == 0 {
            self.repeat = false;
        } else {
            let (x, y) = self.pos();
            let (tx, ty) = (x + dx, y + dy);
            if !self.walkable(tx, ty) {
                self.sim.push(tx, ty, dx, dy);
            }
            if self.walkable(tx, ty) {
                let id = self.id();
                self.sim.move_stat(id, tx, ty);
                self.repeat = false;
            }
        }
        if !matches!(self.read_char(), b'\r' | 0) {
            self.set_cursor(self.cursor() - 1);
        }
        self.stop = true;
        Ok(())
    }

    fn command(&mut self) -> Result<Step, ScriptError> {
        loop {
            let mut word = self.read_word();
            if word == "THEN" {
                word = self.read_word();
            }
            if word.is_empty() {
                return Ok(Step::Again);
            }
            self.instructions = self.instructions.saturating_add(1);
            trace!(stat = self.id(), command = %word, "script command");
            match self.run_command(&word)? {
                Flow::ReadCommand => {}
                Flow::Next => break,
            }
        }
        if self.line_finished {
            self.skip_line();
        }
        Ok(Step::Done)
    }

    #[allow(clippy::too_many_lines)]
    fn run_command(&mut self, word: &str) -> Result<Flow, ScriptError> {
        let id = self.id();
        match word {
            "GO" => {
                let (dx, dy) = self.read_direction()?;
                let (x, y) = self.pos();
                let (tx, ty) = (x + dx, y + dy);
                if !self.walkable(tx, ty) {
                    self.sim.push(tx, ty, dx, dy);
                }
                if self.walkable(tx, ty) {
                    self.sim.move_stat(id, tx, ty);
                } else {
                    self.repeat = true;
                }
                self.stop = true;
            }
            "TRY" => {
                let (dx, dy) = self.read_direction()?;
                let (x, y) = self.pos();
                let (tx, ty) = (x + dx, y + dy);
                if !self.walkable(tx, ty) {
                    self.sim.push(tx, ty, dx, dy);
                }
                if !self.walkable(tx, ty) {
                    return Ok(Flow::ReadCommand);
                }
                self.sim.move_stat(id, tx, ty);
                self.stop = true;
            }
            "WALK" => {
                let (dx, dy) = self.read_direction()?;
                if let Some(stat) = self.own_mut() {
                    stat.step_x = dx;
                    stat.step_y = dy;
                }
            }
            "SET" => {
                let flag = self.read_word();
                self.sim.world.info.set_flag(&flag);
            }
            "CLEAR" => {
                let flag = self.read_word();
                self.sim.world.info.clear_flag(&flag);
            }
            "IF" => {
                if self.read_condition()? {
                    return Ok(Flow::ReadCommand);
                }
            }
            "SHOOT" | "THROWSTAR" => {
                let (dx, dy) = self.read_direction()?;
                let (x, y) = self.pos();
                let element = if word == "SHOOT" { id::BULLET } else { id::STAR };
                if self.sim.shoot(element, x, y, dx, dy, SHOT_SOURCE_ENEMY) && element == id::BULLET {
                    self.sim.host.queue_sound(2, SOUND_ENEMY_SHOT);
                }
                self.stop = true;
            }
            "GIVE" | "TAKE" => {
                let name = self.read_word();
                if let Some(counter) = Counter::from_word(&name) {
                    let value = self.read_value();
                    if value > 0 {
                        let delta = if word == "GIVE" { value } else { -value };
                        if !self.sim.world.info.adjust(counter, delta) {
                            return Ok(Flow::ReadCommand);
                        }
                    }
                }
            }
            "END" => {
                self.set_cursor(-1);
                self.ch = 0;
            }
            "ENDGAME" => self.sim.world.info.health = 0,
            "IDLE" => self.stop = true,
            "RESTART" => {
                self.set_cursor(0);
                self.line_finished = false;
            }
            "ZAP" => {
                let label = self.read_word();
                self.sim.world.board.zap(id, &label);
            }
            "RESTORE" => {
                let label = self.read_word();
                self.sim.world.board.restore(id, &label);
            }
            "LOCK" | "UNLOCK" => {
                let locked = u8::from(word == "LOCK");
                if let Some(stat) = self.own_mut() {
                    stat.p2 = locked;
                }
            }
            "SEND" => {
                let label = self.read_word();
                if self.sim.world.board.send(id, &label, false, false) {
                    self.line_finished = false;
                }
            }
            "BECOME" => {
                self.replace = Some(self.read_tile().ok_or(ScriptError::BadBecome)?);
            }
            "PUT" => {
                let (dx, dy) = self.read_direction()?;
                if dx == 0 && dy == 0 {
                    return Err(ScriptError::BadPut);
                }
                let tile = self.read_tile().ok_or(ScriptError::BadPut)?;
                let (x, y) = self.pos();
                let (tx, ty) = (x + dx, y + dy);
                if (1..=BOARD_WIDTH).contains(&tx) && ty > 0 && ty < BOARD_HEIGHT {
                    if !self.walkable(tx, ty) {
                        self.sim.push(tx, ty, dx, dy);
                    }
                    self.sim.place_tile(tx, ty, tile);
                }
            }
            "CHANGE" => {
                let from = self.read_tile().ok_or(ScriptError::BadChange)?;
                let mut to = self.read_tile().ok_or(ScriptError::BadChange)?;
                let fixed = elements::def(to.element).color;
                if to.color == 0 && fixed < COLOR_SPECIAL_MIN {
                    to.color = fixed;
                }
                let mut at = (0, 1);
                while let Some((x, y)) = self.sim.world.board.find_tile(at, from) {
                    self.sim.place_tile(x, y, to);
                    at = (x, y);
                }
            }
            "PLAY" => {
                let tune = self.read_line_to_end();
                let pattern = sound::parse(&tune);
                if !pattern.is_empty() {
                    self.sim.host.queue_sound(-1, &pattern);
                }
                self.line_finished = false;
            }
            "CYCLE" => {
                let value = self.read_value();
                if value > 0
                    && let Some(stat) = self.own_mut()
                {
                    stat.cycle = value;
                }
            }
            "CHAR" => {
                let value = self.read_value();
                if let Ok(glyph @ 1..=255) = u8::try_from(value) {
                    if let Some(stat) = self.own_mut() {
                        stat.p1 = glyph;
                    }
                    let (x, y) = self.pos();
                    self.sim.draw_tile(x, y);
                }
            }
            "DIE" => self.replace = Some(Tile::new(id::EMPTY, 0x0F)),
            "BIND" => {
                let target = self.read_word();
                let mut bound = 0;
                if self.sim.world.board.iterate_stat(id, &mut bound, &target) {
                    let shared = self.sim.world.board.stats.get(bound).script.clone();
                    if let Some(stat) = self.own_mut() {
                        stat.script = shared;
                        stat.cursor = 0;
                    }
                }
            }
            label => {
                if self.sim.world.board.send(id, label, false, false) {
                    self.line_finished = false;
                } else if !label.contains(':') {
                    return Err(ScriptError::BadCommand(label.to_string()));
                }
            }
        }
        Ok(Flow::Next)
    }
}

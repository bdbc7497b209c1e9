//! The presentation, input, sound and randomness collaborator.
//!
//! The engine never touches a terminal, clock or speaker directly. Every
//! side effect goes through a [`Host`]. [`HeadlessHost`] records those
//! effects and replays scripted answers, which makes a simulation fully
//! deterministic for tests and batch runs.

use std::collections::VecDeque;

use crate::board::{BOARD_HEIGHT, BOARD_WIDTH};
use crate::sound::SoundQueue;

/// What a cell looks like on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Glyph {
    /// Code page 437 character.
    pub character: u8,
    /// Background in the high nibble, foreground in the low nibble.
    pub color: u8,
}

impl Glyph {
    /// Create a glyph.
    #[must_use]
    pub const fn new(character: u8, color: u8) -> Self {
        Self { character, color }
    }
}

/// One polled input frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerInput {
    /// Horizontal direction, -1..=1.
    pub dx: i16,
    /// Vertical direction, -1..=1.
    pub dy: i16,
    /// Fire in the direction instead of moving.
    pub shoot: bool,
    /// Light a torch.
    pub torch: bool,
    /// Ask to leave the game.
    pub quit: bool,
}

impl PlayerInput {
    /// A move (or shot) in direction `(dx, dy)`.
    #[must_use]
    pub const fn step(dx: i16, dy: i16) -> Self {
        Self {
            dx,
            dy,
            shoot: false,
            torch: false,
            quit: false,
        }
    }

    /// Whether a direction is held.
    #[must_use]
    pub const fn has_direction(&self) -> bool {
        self.dx != 0 || self.dy != 0
    }
}

/// A `!label;caption` line of a text window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperlink<'a> {
    /// Label sent when the line is chosen.
    pub label: &'a str,
    /// Text shown to the player.
    pub caption: &'a str,
}

impl<'a> Hyperlink<'a> {
    /// Parse a window line. Lines not starting with `!` are plain text.
    #[must_use]
    pub fn parse(line: &'a str) -> Option<Self> {
        let rest = line.strip_prefix('!')?;
        Some(match rest.split_once(';') {
            Some((label, caption)) => Self { label, caption },
            None => Self {
                label: rest,
                caption: rest,
            },
        })
    }
}

/// A titled popup of text lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextWindow {
    /// Window title.
    pub title: String,
    /// Lines in display order.
    pub lines: Vec<String>,
}

impl TextWindow {
    /// Links in the window, in line order.
    pub fn hyperlinks(&self) -> impl Iterator<Item = Hyperlink<'_>> {
        self.lines.iter().filter_map(|l| Hyperlink::parse(l))
    }
}

/// Everything the engine needs from its surroundings.
pub trait Host {
    /// Show `glyph` at board cell `(x, y)`.
    fn draw_tile(&mut self, x: i16, y: i16, glyph: Glyph);

    /// Offer a compiled sound pattern (see [`crate::sound`]).
    fn queue_sound(&mut self, priority: i16, pattern: &[u8]);

    /// Show a status-line message for `ticks` ticks. An empty text clears it.
    fn display_message(&mut self, ticks: i16, text: &str);

    /// Show a popup and return the label of the hyperlink the player chose.
    fn display_lines(&mut self, window: &TextWindow) -> Option<String>;

    /// A random number in `0..bound`.
    fn random(&mut self, bound: i16) -> i16;

    /// Ask a yes/no question.
    fn prompt_yes_no(&mut self, question: &str) -> bool;

    /// Ask for a line of text; `None` when cancelled.
    fn prompt_line(&mut self, prompt: &str) -> Option<String>;

    /// The input for the current tick.
    fn poll_input(&mut self) -> PlayerInput;
}

/// Linear congruential generator with the classic 134775813 multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lcg {
    seed: u32,
}

impl Lcg {
    /// Start from `seed`.
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self { seed }
    }

    /// Next value in `0..bound`; 0 for a non-positive bound.
    pub fn next(&mut self, bound: i16) -> i16 {
        self.seed = self.seed.wrapping_mul(134_775_813).wrapping_add(1);
        if bound <= 0 {
            return 0;
        }
        ((self.seed >> 16) % bound as u32) as i16
    }
}

impl Default for Lcg {
    fn default() -> Self {
        Self::new(1)
    }
}

/// A side effect recorded by [`HeadlessHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A sound pattern was offered.
    Sound {
        /// Requested priority.
        priority: i16,
        /// Compiled pattern.
        pattern: Vec<u8>,
    },
    /// A status message was shown or cleared.
    Message {
        /// Display duration.
        ticks: i16,
        /// Text; empty when cleared.
        text: String,
    },
    /// A popup was shown.
    Window(TextWindow),
}

/// A host with no terminal: it keeps a glyph buffer, records events and
/// answers prompts from queues filled in advance.
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    rng: Lcg,
    screen: Vec<Glyph>,
    events: Vec<HostEvent>,
    record_events: bool,
    inputs: VecDeque<PlayerInput>,
    choices: VecDeque<String>,
    answers: VecDeque<bool>,
    lines: VecDeque<String>,
    sound: SoundQueue,
    script_errors: usize,
}

impl HeadlessHost {
    /// A host whose random source starts at `seed`.
    #[must_use]
    pub fn new(seed: u32) -> Self {
        Self {
            rng: Lcg::new(seed),
            screen: vec![Glyph::default(); (BOARD_WIDTH * BOARD_HEIGHT) as usize],
            events: Vec::new(),
            record_events: true,
            inputs: VecDeque::new(),
            choices: VecDeque::new(),
            answers: VecDeque::new(),
            lines: VecDeque::new(),
            sound: SoundQueue::new(),
            script_errors: 0,
        }
    }

    /// Stop keeping the event log; counters still update.
    #[must_use]
    pub const fn without_event_log(mut self) -> Self {
        self.record_events = false;
        self
    }

    /// Queue one input frame; an empty queue polls as idle.
    pub fn push_input(&mut self, input: PlayerInput) {
        self.inputs.push_back(input);
    }

    /// Queue the hyperlink chosen in the next popup that has links.
    pub fn push_choice(&mut self, label: &str) {
        self.choices.push_back(label.to_string());
    }

    /// Queue an answer for the next yes/no prompt; the default is no.
    pub fn push_answer(&mut self, answer: bool) {
        self.answers.push_back(answer);
    }

    /// Queue a reply for the next line prompt; the default is cancel.
    pub fn push_line(&mut self, line: &str) {
        self.lines.push_back(line.to_string());
    }

    /// Recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    /// Drop recorded events.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Messages shown so far, oldest first.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|e| match e {
            HostEvent::Message { text, .. } if !text.is_empty() => Some(text.as_str()),
            _ => None,
        })
    }

    /// Popups shown so far.
    pub fn windows(&self) -> impl Iterator<Item = &TextWindow> {
        self.events.iter().filter_map(|e| match e {
            HostEvent::Window(w) => Some(w),
            _ => None,
        })
    }

    /// Number of `ERR:` messages shown.
    #[must_use]
    pub const fn script_errors(&self) -> usize {
        self.script_errors
    }

    /// Last glyph drawn at `(x, y)`.
    #[must_use]
    pub fn glyph(&self, x: i16, y: i16) -> Option<Glyph> {
        screen_index(x, y).map(|i| self.screen[i])
    }

    /// The host's sound voice.
    #[must_use]
    pub const fn sound(&self) -> &SoundQueue {
        &self.sound
    }

    fn record(&mut self, event: HostEvent) {
        if self.record_events {
            self.events.push(event);
        }
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new(1)
    }
}

fn screen_index(x: i16, y: i16) -> Option<usize> {
    if (1..=BOARD_WIDTH).contains(&x) && (1..=BOARD_HEIGHT).contains(&y) {
        Some(((y - 1) * BOARD_WIDTH + (x - 1)) as usize)
    } else {
        None
    }
}

impl Host for HeadlessHost {
    fn draw_tile(&mut self, x: i16, y: i16, glyph: Glyph) {
        if let Some(i) = screen_index(x, y) {
            self.screen[i] = glyph;
        }
    }

    fn queue_sound(&mut self, priority: i16, pattern: &[u8]) {
        self.sound.queue(priority, pattern);
        self.record(HostEvent::Sound {
            priority,
            pattern: pattern.to_vec(),
        });
    }

    fn display_message(&mut self, ticks: i16, text: &str) {
        if text.starts_with("ERR:") {
            self.script_errors += 1;
        }
        self.record(HostEvent::Message {
            ticks,
            text: text.to_string(),
        });
    }

    fn display_lines(&mut self, window: &TextWindow) -> Option<String> {
        self.record(HostEvent::Window(window.clone()));
        if window.hyperlinks().next().is_none() {
            return None;
        }
        self.choices.pop_front()
    }

    fn random(&mut self, bound: i16) -> i16 {
        self.rng.next(bound)
    }

    fn prompt_yes_no(&mut self, _question: &str) -> bool {
        self.answers.pop_front().unwrap_or(false)
    }

    fn prompt_line(&mut self, _prompt: &str) -> Option<String> {
        self.lines.pop_front()
    }

    fn poll_input(&mut self) -> PlayerInput {
        self.inputs.pop_front().unwrap_or_default()
    }
}

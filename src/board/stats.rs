//! Stats (scripted actors) and the ordered stat table.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::tiles::Tile;

/// A shared handle to a script buffer.
///
/// Cloning the handle aliases the buffer: a byte written through one clone
/// is seen through every other. [`Script::deep_copy`] makes an independent
/// buffer. Equality compares contents; use [`Script::same_buffer`] for
/// identity.
#[derive(Clone)]
pub struct Script(Rc<RefCell<Vec<u8>>>);

impl Script {
    /// Wrap raw script bytes (lines separated by `\r`).
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Rc::new(RefCell::new(bytes)))
    }

    /// Build a script from text, turning `\n` line breaks into `\r`.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let bytes = crate::wire::string_bytes(text)
            .into_iter()
            .filter(|&b| b != b'\r')
            .map(|b| if b == b'\n' { b'\r' } else { b })
            .collect();
        Self::new(bytes)
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Byte at `pos`, or `None` outside the buffer.
    #[must_use]
    pub fn byte_at(&self, pos: i16) -> Option<u8> {
        let index = usize::try_from(pos).ok()?;
        self.0.borrow().get(index).copied()
    }

    /// Overwrite the byte at `pos`; out-of-range writes are ignored.
    pub fn set_byte(&self, pos: i16, value: u8) {
        if let Ok(index) = usize::try_from(pos)
            && let Some(b) = self.0.borrow_mut().get_mut(index)
        {
            *b = value;
        }
    }

    /// Whether both handles point at the same buffer.
    #[must_use]
    pub fn same_buffer(&self, other: &Script) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Number of live handles to this buffer.
    #[must_use]
    pub fn alias_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// Copy of the bytes.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.borrow().clone()
    }

    /// An independent buffer with the same bytes.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        Self::new(self.to_vec())
    }

    /// Run `f` over the bytes without copying.
    pub fn with_bytes<T>(&self, f: impl FnOnce(&[u8]) -> T) -> T {
        f(&self.0.borrow())
    }
}

impl PartialEq for Script {
    fn eq(&self, other: &Self) -> bool {
        self.same_buffer(other) || *self.0.borrow() == *other.0.borrow()
    }
}

impl Eq for Script {}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0.borrow();
        let text: String = bytes
            .iter()
            .map(|&b| if b == b'\r' { '\n' } else { char::from(b) })
            .collect();
        f.debug_tuple("Script").field(&text).finish()
    }
}

/// An actor bound to a board position.
///
/// Equality treats an empty script and no script alike: both read as end of
/// buffer, and both are stored with a zero length.
#[derive(Debug, Clone, Eq)]
pub struct Stat {
    /// Column, 1-based.
    pub x: u8,
    /// Row, 1-based.
    pub y: u8,
    /// Horizontal step (walk direction, projectile velocity).
    pub step_x: i16,
    /// Vertical step.
    pub step_y: i16,
    /// Scheduling stride; 0 never ticks.
    pub cycle: i16,
    /// Element-specific parameter (object glyph, creature intelligence).
    pub p1: u8,
    /// Element-specific parameter (object lock flag, projectile life).
    pub p2: u8,
    /// Element-specific parameter (passage destination).
    pub p3: u8,
    /// Next stat in a chain, -1 for none.
    pub follower: i16,
    /// Previous stat in a chain, -1 for none.
    pub leader: i16,
    /// Tile restored when the stat leaves or is removed.
    pub under: Tile,
    /// Script buffer, possibly shared with other stats.
    pub script: Option<Script>,
    /// Script position; -1 is halted.
    pub cursor: i16,
}

impl PartialEq for Stat {
    fn eq(&self, other: &Self) -> bool {
        let script = |s: &Self| s.script.as_ref().filter(|script| !script.is_empty()).cloned();
        self.x == other.x
            && self.y == other.y
            && self.step_x == other.step_x
            && self.step_y == other.step_y
            && self.cycle == other.cycle
            && self.p1 == other.p1
            && self.p2 == other.p2
            && self.p3 == other.p3
            && self.follower == other.follower
            && self.leader == other.leader
            && self.under == other.under
            && self.cursor == other.cursor
            && script(self) == script(other)
    }
}

impl Default for Stat {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            step_x: 0,
            step_y: 0,
            cycle: 0,
            p1: 0,
            p2: 0,
            p3: 0,
            follower: -1,
            leader: -1,
            under: Tile::EMPTY,
            script: None,
            cursor: 0,
        }
    }
}

impl Stat {
    /// Position as signed coordinates.
    #[must_use]
    pub fn pos(&self) -> (i16, i16) {
        (i16::from(self.x), i16::from(self.y))
    }

    /// Script length in bytes, 0 without a script.
    #[must_use]
    pub fn script_len(&self) -> usize {
        self.script.as_ref().map_or(0, Script::len)
    }

    /// Whether this stat ignores messages.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.p2 != 0
    }

    /// A copy with its own script buffer.
    #[must_use]
    pub fn deep_clone(&self) -> Self {
        Self {
            script: self.script.as_ref().map(Script::deep_copy),
            ..self.clone()
        }
    }

    fn sentinel() -> Self {
        Self {
            x: 0,
            y: 1,
            step_x: 256,
            step_y: 256,
            cycle: 256,
            p1: 0,
            p2: 1,
            p3: 0,
            follower: 1,
            leader: 1,
            under: Tile::EDGE,
            script: None,
            cursor: 1,
        }
    }
}

/// Dense, ordered stats. Index 0 is the player and always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatTable {
    stats: Vec<Stat>,
    capacity: usize,
    sentinel: Stat,
}

impl StatTable {
    /// A table holding only a default player, with room for `capacity` more.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let mut stats = Vec::with_capacity(capacity + 1);
        stats.push(Stat::default());
        Self {
            stats,
            capacity,
            sentinel: Stat::sentinel(),
        }
    }

    /// Non-player stats the table can hold.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of stats including the player.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    /// Always false: the player slot exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Highest valid index.
    #[must_use]
    pub fn count(&self) -> i16 {
        self.stats.len() as i16 - 1
    }

    /// Whether `add` would be refused.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.stats.len() > self.capacity
    }

    /// Stat at `index`; invalid indices (including -1) read an inert sentinel.
    #[must_use]
    pub fn get(&self, index: i16) -> &Stat {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.stats.get(i))
            .unwrap_or(&self.sentinel)
    }

    /// Mutable stat at `index`, `None` when out of range.
    pub fn get_mut(&mut self, index: i16) -> Option<&mut Stat> {
        let i = usize::try_from(index).ok()?;
        self.stats.get_mut(i)
    }

    /// The player stat.
    #[must_use]
    pub fn player(&self) -> &Stat {
        &self.stats[0]
    }

    /// The player stat, mutably.
    pub fn player_mut(&mut self) -> &mut Stat {
        &mut self.stats[0]
    }

    /// Append a stat, returning its index. A full table refuses silently.
    pub fn push(&mut self, stat: Stat) -> Option<i16> {
        if self.is_full() {
            return None;
        }
        self.stats.push(stat);
        Some(self.count())
    }

    /// Remove the stat at `index`, shifting later stats down and re-linking
    /// every follower/leader reference. The player cannot be removed.
    ///
    /// The script buffer is released with the stat; it survives only while
    /// another stat still holds a handle to it.
    pub fn remove(&mut self, index: i16) -> Option<Stat> {
        if index <= 0 || index > self.count() {
            return None;
        }
        for stat in self.stats.iter_mut().skip(1) {
            stat.follower = relink(stat.follower, index);
            stat.leader = relink(stat.leader, index);
        }
        Some(self.stats.remove(index as usize))
    }

    /// Index of the first stat at `(x, y)`.
    #[must_use]
    pub fn index_at(&self, x: i16, y: i16) -> Option<i16> {
        self.stats
            .iter()
            .position(|s| s.pos() == (x, y))
            .map(|i| i as i16)
    }

    /// Stats in scheduling order.
    pub fn iter(&self) -> impl Iterator<Item = &Stat> {
        self.stats.iter()
    }

    pub(crate) fn from_vec(stats: Vec<Stat>, capacity: usize) -> Self {
        let mut table = Self::new(capacity);
        if !stats.is_empty() {
            table.stats = stats;
        }
        table
    }
}

fn relink(link: i16, removed: i16) -> i16 {
    match link.cmp(&removed) {
        std::cmp::Ordering::Less => link,
        std::cmp::Ordering::Equal => -1,
        std::cmp::Ordering::Greater => link - 1,
    }
}

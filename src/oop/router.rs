//! Labels and messages between scripts.
//!
//! A label is a line `:NAME`; a zapped label is `'NAME`. Messages are
//! addressed as `LABEL` (the sender itself) or `TARGET:LABEL`, where the
//! target is `ALL`, `OTHERS`, `SELF` or an object name declared by a
//! leading `@NAME` line.

use super::cursor::Cursor;
use crate::board::{Board, Script};

/// Prefix of an active label.
pub const ACTIVE_LABEL: &[u8] = b"\r:";
/// Prefix of a zapped label.
pub const ZAPPED_LABEL: &[u8] = b"\r'";

/// Position of the first case-insensitive match of `needle` at or after
/// `start` that is not followed by a letter or `_`.
#[must_use]
pub fn find_string(script: Option<&Script>, needle: &[u8], start: i16) -> Option<i16> {
    let script = script?;
    let len = i16::try_from(script.len()).unwrap_or(i16::MAX);
    let byte = |pos: i16| script.byte_at(pos).unwrap_or(0).to_ascii_uppercase();
    let mut pos = start.max(0);
    while pos <= len {
        let matched = needle
            .iter()
            .zip(pos..)
            .all(|(&want, at)| want.to_ascii_uppercase() == byte(at));
        if matched {
            let next = byte(pos.saturating_add(needle.len() as i16));
            if !(next.is_ascii_uppercase() || next == b'_') {
                return Some(pos);
            }
        }
        pos += 1;
    }
    None
}

/// Walks the stats matched by a message target, one label hit at a time.
#[derive(Debug, Clone)]
pub struct LabelSearch<'a> {
    caller: i16,
    target: Option<&'a str>,
    label: &'a str,
    index: i16,
}

impl<'a> LabelSearch<'a> {
    /// Start a search for `message` sent by stat `caller`.
    #[must_use]
    pub fn new(caller: i16, message: &'a str) -> Self {
        let (target, label) = match message.split_once(':') {
            Some((target, label)) => (Some(target), label),
            None => (None, message),
        };
        Self {
            caller,
            target,
            label,
            index: 0,
        }
    }

    /// The label part of the message.
    #[must_use]
    pub const fn label(&self) -> &'a str {
        self.label
    }

    /// Next `(stat, position)` whose script holds `prefix + label`.
    ///
    /// `RESTART` resolves to position 0 of every matched stat. Without a
    /// target only the caller is searched, once.
    pub fn next(&mut self, board: &Board, prefix: &[u8]) -> Option<(i16, i16)> {
        let mut needle = prefix.to_vec();
        needle.extend(crate::wire::string_bytes(self.label));

        let Some(target) = self.target else {
            if self.index >= self.caller {
                return None;
            }
            self.index = self.caller;
            if self.label == "RESTART" {
                return Some((self.index, 0));
            }
            let script = board.stats.get(self.index).script.as_ref();
            return find_string(script, &needle, 0).map(|pos| (self.index, pos));
        };

        while board.iterate_stat(self.caller, &mut self.index, target) {
            if self.label == "RESTART" {
                return Some((self.index, 0));
            }
            let script = board.stats.get(self.index).script.as_ref();
            if let Some(pos) = find_string(script, &needle, 0) {
                return Some((self.index, pos));
            }
        }
        None
    }
}

impl Board {
    /// Advance `index` to the next stat matched by `target`, as seen from
    /// stat `caller`. Returns `false` when no stat is left.
    pub fn iterate_stat(&self, caller: i16, index: &mut i16, target: &str) -> bool {
        *index += 1;
        let count = self.stats.count();
        match target {
            "ALL" => *index <= count,
            "OTHERS" => {
                if *index == caller {
                    *index += 1;
                }
                *index <= count
            }
            "SELF" => {
                if caller > 0 && *index <= caller {
                    *index = caller;
                    true
                } else {
                    false
                }
            }
            name => {
                while *index <= count {
                    if self.object_name(*index).as_deref() == Some(name) {
                        return true;
                    }
                    *index += 1;
                }
                false
            }
        }
    }

    /// The upper-cased `@NAME` on the first line of a stat's script.
    #[must_use]
    pub fn object_name(&self, index: i16) -> Option<String> {
        let script = self.stats.get(index).script.as_ref()?;
        let mut pos = 0;
        let mut cursor = Cursor::new(Some(script), &mut pos);
        (cursor.read_char() == b'@').then(|| cursor.read_word())
    }

    /// Jump every stat matched by `message` to its label.
    ///
    /// Locked stats are skipped unless `ignore_lock` is set; the caller
    /// itself is also reached through its own lock unless
    /// `respect_self_lock` is set. Returns whether the caller jumped.
    pub fn send(&mut self, caller: i16, message: &str, ignore_lock: bool, respect_self_lock: bool) -> bool {
        let mut search = LabelSearch::new(caller, message);
        let mut caller_jumped = false;
        while let Some((index, pos)) = search.next(self, ACTIVE_LABEL) {
            let Some(stat) = self.stats.get_mut(index) else {
                continue;
            };
            if !stat.is_locked() || ignore_lock || (index == caller && !respect_self_lock) {
                stat.cursor = pos;
                caller_jumped |= index == caller;
            }
        }
        caller_jumped
    }

    /// Deactivate the first active occurrence of the label in every matched
    /// stat.
    pub fn zap(&mut self, caller: i16, message: &str) {
        let mut search = LabelSearch::new(caller, message);
        while let Some((index, pos)) = search.next(self, ACTIVE_LABEL) {
            if let Some(script) = &self.stats.get(index).script {
                script.set_byte(pos + 1, b'\'');
            }
        }
    }

    /// Reactivate every zapped occurrence of the label line in every
    /// matched stat.
    pub fn restore(&mut self, caller: i16, message: &str) {
        let mut search = LabelSearch::new(caller, message);
        let mut line = ZAPPED_LABEL.to_vec();
        line.extend(crate::wire::string_bytes(search.label()));
        line.push(b'\r');

        while let Some((index, mut pos)) = search.next(self, ZAPPED_LABEL) {
            let Some(script) = self.stats.get(index).script.as_ref() else {
                continue;
            };
            loop {
                script.set_byte(pos + 1, b':');
                match find_string(Some(script), &line, pos) {
                    Some(next) if next > 0 => pos = next,
                    _ => break,
                }
            }
        }
    }
}

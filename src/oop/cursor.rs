//! Token reader over a script buffer.

use crate::board::Script;

/// Reads characters, words and numbers from a script at a position owned
/// by someone else (usually a stat's cursor).
///
/// Reads outside the buffer, or from a stat with no script, yield `0` and
/// leave the position alone.
pub struct Cursor<'a> {
    script: Option<&'a Script>,
    pos: &'a mut i16,
    /// Last character read. Word and value readers leave it upper-cased.
    pub ch: u8,
}

impl<'a> Cursor<'a> {
    /// A reader over `script` that advances `pos`.
    pub fn new(script: Option<&'a Script>, pos: &'a mut i16) -> Self {
        Self { script, pos, ch: 0 }
    }

    /// Current position.
    #[must_use]
    pub fn pos(&self) -> i16 {
        *self.pos
    }

    /// Move to `pos`.
    pub fn set_pos(&mut self, pos: i16) {
        *self.pos = pos;
    }

    fn len(&self) -> i16 {
        self.script
            .map_or(0, |s| i16::try_from(s.len()).unwrap_or(i16::MAX))
    }

    /// Read one character.
    pub fn read_char(&mut self) -> u8 {
        let pos = *self.pos;
        self.ch = if pos >= 0 && pos < self.len() {
            *self.pos += 1;
            self.script.and_then(|s| s.byte_at(pos)).unwrap_or(0)
        } else {
            0
        };
        self.ch
    }

    /// Read an upper-cased word of letters, digits, `:` and `_`, skipping
    /// leading spaces. A word cannot start with a digit. The character that
    /// ended the word is left unread.
    pub fn read_word(&mut self) -> String {
        let mut word = String::new();
        while self.read_char() == b' ' {}
        self.ch = self.ch.to_ascii_uppercase();
        if !self.ch.is_ascii_digit() {
            while self.ch.is_ascii_uppercase() || self.ch.is_ascii_digit() || matches!(self.ch, b':' | b'_') {
                word.push(char::from(self.ch));
                self.read_char();
                self.ch = self.ch.to_ascii_uppercase();
            }
        }
        self.unread();
        word
    }

    /// Read a decimal number, skipping leading spaces. Returns -1 when no
    /// digits follow.
    pub fn read_value(&mut self) -> i16 {
        let mut digits = String::new();
        while self.read_char() == b' ' {}
        while self.ch.is_ascii_digit() {
            digits.push(char::from(self.ch));
            self.read_char();
        }
        self.ch = self.ch.to_ascii_uppercase();
        self.unread();
        if digits.is_empty() {
            -1
        } else {
            digits
                .parse::<i32>()
                .map_or(i16::MAX, |v| v.clamp(0, i32::from(i16::MAX)) as i16)
        }
    }

    fn unread(&mut self) {
        if *self.pos > 0 {
            *self.pos -= 1;
        }
    }

    /// Skip past the end of the current line.
    pub fn skip_line(&mut self) {
        while !matches!(self.read_char(), 0 | b'\r') {}
    }

    /// Read the rest of the current line, consuming the line break.
    pub fn read_line_to_end(&mut self) -> String {
        let mut line = Vec::new();
        loop {
            match self.read_char() {
                0 | b'\r' => break,
                c => line.push(c),
            }
        }
        crate::wire::bytes_to_string(&line)
    }
}

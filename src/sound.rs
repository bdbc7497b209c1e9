//! Sound patterns: the `#PLAY` notation compiler and a priority note queue.
//!
//! A compiled pattern is a byte string of `(note, duration)` pairs. A note
//! byte of `0` is a rest, `octave * 16 + tone` is a pitched note and
//! `0xF0 + n` is drum `n`. Durations are in timer ticks.

/// Compile `#PLAY` notation into a pattern.
///
/// Letters `T S I Q H W` select a duration, `.` extends it by half and `3`
/// divides it by three. `+`/`-` move the octave within 1..=6. `A`..`G` play
/// a note, optionally followed by `#` (sharp) or `!` (flat). `X` rests and
/// the digits other than `3` play drums. Anything else is ignored.
#[must_use]
pub fn parse(input: &str) -> Vec<u8> {
    let mut out = Vec::new();
    let mut octave: i16 = 3;
    let mut duration: i16 = 1;
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i].to_ascii_uppercase();
        i += 1;
        match c {
            b'T' => duration = 1,
            b'S' => duration = 2,
            b'I' => duration = 4,
            b'Q' => duration = 8,
            b'H' => duration = 16,
            b'W' => duration = 32,
            b'.' => duration = duration * 3 / 2,
            b'3' => duration /= 3,
            b'+' => octave = (octave + 1).min(6),
            b'-' => octave = (octave - 1).max(1),
            b'A'..=b'G' => {
                let mut tone: i16 = match c {
                    b'C' => 0,
                    b'D' => 2,
                    b'E' => 4,
                    b'F' => 5,
                    b'G' => 7,
                    b'A' => 9,
                    _ => 11,
                };
                match bytes.get(i).map(u8::to_ascii_uppercase) {
                    Some(b'!') => {
                        tone -= 1;
                        i += 1;
                    }
                    Some(b'#') => {
                        tone += 1;
                        i += 1;
                    }
                    _ => {}
                }
                out.push((octave * 0x10 + tone) as u8);
                out.push(duration as u8);
            }
            b'X' => {
                out.push(0);
                out.push(duration as u8);
            }
            b'0'..=b'9' => {
                out.push(c - b'0' + 0xF0);
                out.push(duration as u8);
            }
            _ => {}
        }
    }
    out
}

/// Frequency in Hz of a pitched note byte, `None` for rests, drums and
/// codes outside the table.
#[must_use]
pub fn frequency(code: u8) -> Option<u16> {
    let octave = i32::from(code >> 4);
    let tone = i32::from(code & 0x0F);
    if !(1..=15).contains(&octave) || tone > 11 {
        return None;
    }
    let hz = 32.0 * 2f64.powi(octave) * 2f64.powf(f64::from(tone) / 12.0);
    Some(hz.floor() as u16)
}

/// One decoded entry of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Note {
    /// Silence for the duration.
    Rest,
    /// A pitched tone.
    Tone(u16),
    /// Drum sample `0..=9`.
    Drum(u8),
}

/// Priority queue for a single voice.
///
/// A new pattern replaces the playing one when nothing is playing, or when
/// its priority is at least the current one (and the current one is not
/// -1). Priority -1 always appends to what is left of the playing pattern.
#[derive(Debug, Clone, Default)]
pub struct SoundQueue {
    buffer: Vec<u8>,
    pos: usize,
    priority: i16,
    playing: bool,
    /// Refuse every new pattern.
    pub blocked: bool,
}

impl SoundQueue {
    /// An idle queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a pattern is playing.
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// Priority of the playing pattern.
    #[must_use]
    pub const fn priority(&self) -> i16 {
        self.priority
    }

    /// Offer a pattern. Returns whether it was accepted.
    pub fn queue(&mut self, priority: i16, pattern: &[u8]) -> bool {
        let accepts = !self.playing
            || (priority >= self.priority && self.priority != -1)
            || priority == -1;
        if self.blocked || !accepts {
            return false;
        }
        if priority >= 0 || !self.playing {
            self.priority = priority;
            self.buffer = pattern.to_vec();
            self.pos = 0;
        } else {
            self.buffer.drain(..self.pos.min(self.buffer.len()));
            self.pos = 0;
            if self.buffer.len() + pattern.len() < 255 {
                self.buffer.extend_from_slice(pattern);
            }
        }
        self.playing = true;
        true
    }

    /// Stop and forget the playing pattern.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.pos = 0;
        self.playing = false;
    }

    /// Pop the next note and its duration. Finishes the pattern when fewer
    /// than two bytes remain.
    pub fn next_note(&mut self) -> Option<(Note, u8)> {
        if !self.playing {
            return None;
        }
        if self.pos + 1 >= self.buffer.len() {
            self.playing = false;
            return None;
        }
        let code = self.buffer[self.pos];
        let duration = self.buffer[self.pos + 1];
        self.pos += 2;
        let note = match code {
            0 => Note::Rest,
            c if c >= 0xF0 => Note::Drum(c - 0xF0),
            c => frequency(c).map_or(Note::Rest, Note::Tone),
        };
        Some((note, duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_notes_and_durations() {
        assert_eq!(parse("tcf#"), vec![0x30, 1, 0x36, 1]);
        assert_eq!(parse("q+c-x"), vec![0x40, 8, 0, 8]);
        assert_eq!(parse("ic!"), vec![0x2F, 4]);
    }

    #[test]
    fn test_parse_duration_modifiers() {
        assert_eq!(parse("q.c"), vec![0x30, 12]);
        assert_eq!(parse("h3c"), vec![0x30, 5]);
    }

    #[test]
    fn test_parse_octave_is_clamped() {
        assert_eq!(parse("++++++c"), vec![0x60, 1]);
        assert_eq!(parse("-----c"), vec![0x10, 1]);
    }

    #[test]
    fn test_parse_drums_and_noise() {
        assert_eq!(parse("s0 9?"), vec![0xF0, 2, 0xF9, 2]);
    }

    #[test]
    fn test_frequency_of_middle_octave() {
        assert_eq!(frequency(0x30), Some(256));
        assert_eq!(frequency(0x39), Some(430));
        assert_eq!(frequency(0x0C), None);
    }

    #[test]
    fn test_lower_priority_is_refused_while_playing() {
        let mut q = SoundQueue::new();
        assert!(q.queue(3, &[0x30, 1]));
        assert!(!q.queue(2, &[0x40, 1]));
        assert!(q.queue(3, &[0x40, 1]));
        assert_eq!(q.next_note(), Some((Note::Tone(512), 1)));
    }

    #[test]
    fn test_negative_priority_appends() {
        let mut q = SoundQueue::new();
        q.queue(-1, &[0x30, 1]);
        q.queue(-1, &[0, 2]);
        assert_eq!(q.next_note(), Some((Note::Tone(256), 1)));
        assert_eq!(q.next_note(), Some((Note::Rest, 2)));
        assert_eq!(q.next_note(), None);
        assert!(!q.is_playing());
    }
}

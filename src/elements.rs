//! The fixed element table.
//!
//! Every tile names one of these definitions. The table drives physics
//! (walkable, pushable, destructible), presentation (glyph, default colour,
//! darkness) and scheduling (the default cycle of a stat spawned for it).

/// Element ids.
#[allow(missing_docs)]
pub mod id {
    pub const EMPTY: u8 = 0;
    pub const BOARD_EDGE: u8 = 1;
    pub const MESSAGE_TIMER: u8 = 2;
    pub const MONITOR: u8 = 3;
    pub const PLAYER: u8 = 4;
    pub const AMMO: u8 = 5;
    pub const TORCH: u8 = 6;
    pub const GEM: u8 = 7;
    pub const KEY: u8 = 8;
    pub const DOOR: u8 = 9;
    pub const SCROLL: u8 = 10;
    pub const PASSAGE: u8 = 11;
    pub const DUPLICATOR: u8 = 12;
    pub const BOMB: u8 = 13;
    pub const ENERGIZER: u8 = 14;
    pub const STAR: u8 = 15;
    pub const CONVEYOR_CW: u8 = 16;
    pub const CONVEYOR_CCW: u8 = 17;
    pub const BULLET: u8 = 18;
    pub const WATER: u8 = 19;
    pub const FOREST: u8 = 20;
    pub const SOLID: u8 = 21;
    pub const NORMAL: u8 = 22;
    pub const BREAKABLE: u8 = 23;
    pub const BOULDER: u8 = 24;
    pub const SLIDER_NS: u8 = 25;
    pub const SLIDER_EW: u8 = 26;
    pub const FAKE: u8 = 27;
    pub const INVISIBLE: u8 = 28;
    pub const BLINK_WALL: u8 = 29;
    pub const TRANSPORTER: u8 = 30;
    pub const LINE: u8 = 31;
    pub const RICOCHET: u8 = 32;
    pub const BLINK_RAY_EW: u8 = 33;
    pub const BEAR: u8 = 34;
    pub const RUFFIAN: u8 = 35;
    pub const OBJECT: u8 = 36;
    pub const SLIME: u8 = 37;
    pub const SHARK: u8 = 38;
    pub const SPINNING_GUN: u8 = 39;
    pub const PUSHER: u8 = 40;
    pub const LION: u8 = 41;
    pub const TIGER: u8 = 42;
    pub const BLINK_RAY_NS: u8 = 43;
    pub const CENTIPEDE_HEAD: u8 = 44;
    pub const CENTIPEDE_SEGMENT: u8 = 45;
    pub const TEXT_BLUE: u8 = 47;
    pub const TEXT_GREEN: u8 = 48;
    pub const TEXT_CYAN: u8 = 49;
    pub const TEXT_RED: u8 = 50;
    pub const TEXT_PURPLE: u8 = 51;
    pub const TEXT_YELLOW: u8 = 52;
    pub const TEXT_WHITE: u8 = 53;

    /// First text element.
    pub const TEXT_MIN: u8 = TEXT_BLUE;
    /// Highest defined element id.
    pub const MAX: u8 = TEXT_WHITE;
}

/// Default colours at or above this value are placement sentinels.
pub const COLOR_SPECIAL_MIN: u8 = 0xF0;
/// Foreground chosen by the placer, black background.
pub const COLOR_CHOICE_ON_BLACK: u8 = 0xFF;
/// White foreground on a background chosen by the placer.
pub const COLOR_WHITE_ON_CHOICE: u8 = 0xFE;
/// Both nibbles chosen by the placer.
pub const COLOR_CHOICE_ON_CHOICE: u8 = 0xFD;

/// Colour words accepted in tile descriptions, mapped to foreground 9..=15.
pub const COLOR_NAMES: [&str; 7] = ["Blue", "Green", "Cyan", "Red", "Purple", "Yellow", "White"];

/// Static definition of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementDef {
    /// Glyph drawn when the element has no custom draw rule.
    pub character: u8,
    /// Default colour, or one of the `COLOR_*` sentinels.
    pub color: u8,
    /// Shots and attacks can destroy it.
    pub destructible: bool,
    /// Pushes can move it.
    pub pushable: bool,
    /// Drawn even on dark boards.
    pub visible_in_dark: bool,
    /// Placing a stat on it keeps its background colour.
    pub placeable_on_top: bool,
    /// Stats can move onto it.
    pub walkable: bool,
    /// The glyph depends on the stat or its neighbours.
    pub has_draw_proc: bool,
    /// Cycle of a stat spawned for this element; -1 means it never gets one.
    pub cycle: i16,
    /// Score awarded for destroying it while energized.
    pub score_value: i16,
    /// Name used by scripts; empty names cannot be referenced.
    pub name: &'static str,
}

impl ElementDef {
    const fn new(character: u8, name: &'static str) -> Self {
        Self {
            character,
            color: COLOR_CHOICE_ON_BLACK,
            destructible: false,
            pushable: false,
            visible_in_dark: false,
            placeable_on_top: false,
            walkable: false,
            has_draw_proc: false,
            cycle: -1,
            score_value: 0,
            name,
        }
    }

    const fn color(mut self, color: u8) -> Self {
        self.color = color;
        self
    }

    const fn cycle(mut self, cycle: i16) -> Self {
        self.cycle = cycle;
        self
    }

    const fn score(mut self, value: i16) -> Self {
        self.score_value = value;
        self
    }

    const fn destructible(mut self) -> Self {
        self.destructible = true;
        self
    }

    const fn pushable(mut self) -> Self {
        self.pushable = true;
        self
    }

    const fn visible_in_dark(mut self) -> Self {
        self.visible_in_dark = true;
        self
    }

    const fn placeable_on_top(mut self) -> Self {
        self.placeable_on_top = true;
        self
    }

    const fn walkable(mut self) -> Self {
        self.walkable = true;
        self
    }

    const fn drawn(mut self) -> Self {
        self.has_draw_proc = true;
        self
    }

    const fn text(color: u8) -> Self {
        Self::new(b' ', "").color(color)
    }
}

const UNKNOWN: ElementDef = ElementDef::new(b'?', "");

static ELEMENTS: [ElementDef; id::MAX as usize + 1] = [
    ElementDef::new(b' ', "Empty").color(0x70).pushable().walkable(),
    ElementDef::new(b'E', "").color(0x00),
    ElementDef::new(b' ', "").color(0x00),
    ElementDef::new(b' ', "Monitor").color(0x07).cycle(1),
    ElementDef::new(0x02, "Player")
        .color(0x1F)
        .destructible()
        .pushable()
        .visible_in_dark()
        .cycle(1),
    ElementDef::new(0x84, "Ammo").color(0x03).pushable(),
    ElementDef::new(0x9D, "Torch").color(0x06).visible_in_dark(),
    ElementDef::new(0x04, "Gem").pushable().destructible(),
    ElementDef::new(0x0C, "Key").pushable(),
    ElementDef::new(0x0A, "Door").color(COLOR_WHITE_ON_CHOICE),
    ElementDef::new(0xE8, "Scroll").color(0x0F).pushable().cycle(1),
    ElementDef::new(0xF0, "Passage")
        .color(COLOR_WHITE_ON_CHOICE)
        .visible_in_dark()
        .cycle(0),
    ElementDef::new(0xFA, "Duplicator").color(0x0F).drawn().cycle(2),
    ElementDef::new(0x0B, "Bomb").pushable().drawn().cycle(6),
    ElementDef::new(0x7F, "Energizer").color(0x05),
    ElementDef::new(b'S', "Star").color(0x0F).destructible().drawn().cycle(1),
    ElementDef::new(b'/', "Clockwise").drawn().cycle(3),
    ElementDef::new(b'\\', "Counter").drawn().cycle(2),
    ElementDef::new(0xF8, "Bullet").color(0x0F).destructible().cycle(1),
    ElementDef::new(0xB0, "Water").color(0xF9).placeable_on_top(),
    ElementDef::new(0xB0, "Forest").color(0x20),
    ElementDef::new(0xDB, "Solid"),
    ElementDef::new(0xB2, "Normal"),
    ElementDef::new(0xB1, "Breakable").destructible(),
    ElementDef::new(0xFE, "Boulder").pushable(),
    ElementDef::new(0x12, "Slider (NS)"),
    ElementDef::new(0x1D, "Slider (EW)"),
    ElementDef::new(0xB2, "Fake").placeable_on_top().walkable(),
    ElementDef::new(b' ', "Invisible"),
    ElementDef::new(0xCE, "Blink wall").cycle(1),
    ElementDef::new(0xC5, "Transporter").drawn().cycle(2),
    ElementDef::new(0xCE, "Line").drawn(),
    ElementDef::new(b'*', "Ricochet").color(0x0A),
    ElementDef::new(0xCD, ""),
    ElementDef::new(0x99, "Bear")
        .color(0x06)
        .destructible()
        .pushable()
        .cycle(3)
        .score(1),
    ElementDef::new(0x05, "Ruffian")
        .color(0x0D)
        .destructible()
        .pushable()
        .cycle(1)
        .score(2),
    ElementDef::new(0x02, "Object").drawn().cycle(3),
    ElementDef::new(b'*', "Slime").destructible().cycle(3),
    ElementDef::new(b'^', "Shark").color(0x07).cycle(3),
    ElementDef::new(0x18, "Spinning gun").drawn().cycle(2),
    ElementDef::new(0x10, "Pusher").drawn().cycle(4),
    ElementDef::new(0xEA, "Lion")
        .color(0x0C)
        .destructible()
        .pushable()
        .cycle(2)
        .score(1),
    ElementDef::new(0xE3, "Tiger")
        .color(0x0B)
        .destructible()
        .pushable()
        .cycle(2)
        .score(2),
    ElementDef::new(0xBA, ""),
    ElementDef::new(0xE9, "Head").destructible().cycle(2).score(1),
    ElementDef::new(b'O', "Segment").destructible().cycle(2).score(3),
    UNKNOWN,
    ElementDef::text(0x1F),
    ElementDef::text(0x2F),
    ElementDef::text(0x3F),
    ElementDef::text(0x4F),
    ElementDef::text(0x5F),
    ElementDef::text(0x6F),
    ElementDef::text(0x0F),
];

/// Looks up an element definition. Unknown ids get an inert placeholder.
#[must_use]
pub fn def(element: u8) -> &'static ElementDef {
    ELEMENTS.get(usize::from(element)).unwrap_or(&UNKNOWN)
}

/// Upper-cases letters and drops everything that is not alphanumeric.
#[must_use]
pub fn to_word(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Finds the element whose script name matches `word` (already upper-cased).
#[must_use]
pub fn find_by_word(word: &str) -> Option<u8> {
    if word.is_empty() {
        return None;
    }
    (0..=id::MAX).find(|&e| {
        let name = def(e).name;
        !name.is_empty() && to_word(name) == word
    })
}

/// Maps a colour word to its foreground colour (9..=15).
#[must_use]
pub fn find_color_by_word(word: &str) -> Option<u8> {
    COLOR_NAMES
        .iter()
        .position(|name| to_word(name) == word)
        .map(|i| i as u8 + 9)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_complete() {
        assert_eq!(def(id::PLAYER).name, "Player");
        assert_eq!(def(id::CENTIPEDE_SEGMENT).name, "Segment");
        assert_eq!(def(id::TEXT_WHITE).color, 0x0F);
        assert_eq!(def(200).name, "");
    }

    #[test]
    fn test_find_by_word_strips_punctuation() {
        assert_eq!(find_by_word("SLIDERNS"), Some(id::SLIDER_NS));
        assert_eq!(find_by_word("BLINKWALL"), Some(id::BLINK_WALL));
        assert_eq!(find_by_word("EMPTY"), Some(id::EMPTY));
        assert_eq!(find_by_word(""), None);
        assert_eq!(find_by_word("DRAGON"), None);
    }

    #[test]
    fn test_color_words() {
        assert_eq!(find_color_by_word("BLUE"), Some(9));
        assert_eq!(find_color_by_word("WHITE"), Some(15));
        assert_eq!(find_color_by_word("BLACK"), None);
    }

    #[test]
    fn test_only_actors_have_cycles() {
        assert_eq!(def(id::OBJECT).cycle, 3);
        assert_eq!(def(id::PASSAGE).cycle, 0);
        assert_eq!(def(id::NORMAL).cycle, -1);
        assert!(def(id::EMPTY).walkable);
        assert!(!def(id::WATER).walkable);
    }
}

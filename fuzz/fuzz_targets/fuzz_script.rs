#![no_main]

//! Script interpreter fuzzer.
//!
//! Runs generated scripts on a small board of objects for a few ticks,
//! with random player input, and checks that the board stays consistent.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use zoo::board::{BOARD_HEIGHT, BOARD_WIDTH, Script, Stat};
use zoo::elements::id;
use zoo::engine::Simulation;
use zoo::host::{HeadlessHost, PlayerInput};
use zoo::{EngineConfig, World};

/// Script words the fuzzer splices together, so that most inputs reach
/// real commands instead of failing on the first token.
const WORDS: &[&str] = &[
    "#go ", "#walk ", "#try ", "#shoot ", "#throwstar ", "#put ", "#change ", "#become ", "#send ",
    "#all:", "#others:", "#zap ", "#restore ", "#bind ", "#lock", "#unlock", "#die", "#end",
    "#restart", "#idle", "#give ", "#take ", "#set ", "#clear ", "#if ", "#char ", "#cycle ",
    "#play ", "#endgame", ":touch", ":shot", ":thud", ":a", "'a", "@a", "/", "?", "n", "s", "e",
    "w", "i", "seek", "flow", "rnd", "cw ", "ccw ", "opp ", "rndp ", "not ", "alligned", "contact",
    "blocked ", "energized", "any ", "ammo ", "gems ", "score ", "torches ", "health ", "time ",
    "red ", "boulder", "object", "gem", "empty", "a", "3", "10", " ", "\n", "!a;go", "$title",
];

/// One object on the fuzzed board.
#[derive(Arbitrary, Debug)]
struct FuzzObject {
    x: u8,
    y: u8,
    cycle: u8,
    words: Vec<u8>,
    raw: Vec<u8>,
}

#[derive(Arbitrary, Debug)]
struct ScriptInput {
    objects: Vec<FuzzObject>,
    moves: Vec<(i8, i8, bool)>,
    seed: u32,
}

fn script_text(object: &FuzzObject) -> Vec<u8> {
    let mut text: Vec<u8> = object
        .words
        .iter()
        .flat_map(|&w| WORDS[usize::from(w) % WORDS.len()].bytes())
        .map(|b| if b == b'\n' { b'\r' } else { b })
        .collect();
    text.extend(object.raw.iter().copied().filter(|&b| b != 0));
    text
}

fuzz_target!(|input: ScriptInput| {
    let mut sim = Simulation::new(
        World::new(),
        EngineConfig { seed: Some(input.seed), ..EngineConfig::default() },
        HeadlessHost::new(input.seed).without_event_log(),
    );
    for object in input.objects.iter().take(16) {
        let x = 2 + i16::from(object.x) % (BOARD_WIDTH - 2);
        let y = 2 + i16::from(object.y) % (BOARD_HEIGHT - 2);
        let template = Stat {
            p1: b'@',
            script: Some(Script::new(script_text(object))),
            ..Stat::default()
        };
        sim.add_stat(x, y, id::OBJECT, 0x0F, i16::from(object.cycle % 4), &template);
    }

    for &(dx, dy, shoot) in input.moves.iter().take(64) {
        let mut step = PlayerInput::step(i16::from(dx.signum()), i16::from(dy.signum()));
        step.shoot = shoot;
        sim.host.push_input(step);
        sim.tick();
        if sim.is_game_over() || sim.exit_requested() {
            break;
        }

        for stat in sim.world.board.stats.iter() {
            let (x, y) = stat.pos();
            assert!((0..=BOARD_WIDTH + 1).contains(&x) && (0..=BOARD_HEIGHT + 1).contains(&y));
            let len = i16::try_from(stat.script_len()).unwrap_or(i16::MAX);
            assert!((-1..=len).contains(&stat.cursor), "cursor escaped its script");
        }
    }
});

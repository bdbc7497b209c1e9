//! Integration tests for saving and loading world files from disk.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::fs;

use tempfile::TempDir;
use zoo::board::{Board, Script, Stat, Tile};
use zoo::elements::id;
use zoo::engine::Simulation;
use zoo::host::{HeadlessHost, HostEvent};
use zoo::world::{LoadMode, World};
use zoo::{EngineConfig, Mode};

/// A title board plus one playable board with a scripted guard.
fn sample_world() -> World {
    let mut world = World::new();
    world.info.name = "SAMPLE".to_string();

    let mut board = Board::new();
    board.name = "Hall".to_string();
    board.tiles.set(5, 5, Tile::new(id::GEM, 0x0B));
    let guard = Stat {
        p1: b'@',
        script: Some(Script::from_text("@guard\n#end\n:touch\nHalt!\n")),
        ..Stat::default()
    };
    board.add_stat(8, 8, id::OBJECT, 0x0F, 1, &guard);
    world.push_board(&board).unwrap();
    world.open(1).unwrap();
    world
}

fn simulation(world: World) -> Simulation<HeadlessHost> {
    Simulation::new(world, EngineConfig::default(), HeadlessHost::new(5))
}

#[test]
fn test_save_then_load_restores_progress() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sample.zzt");

    let mut sim = simulation(sample_world());
    sim.world.info.gems = 7;
    sim.world.info.set_flag("VISITED");
    sim.run(10);
    assert!(sim.save_world(&path));

    let mut other = simulation(World::new());
    assert!(other.load_world(&path, LoadMode::Full));
    assert_eq!(other.world.info.name, "SAMPLE");
    assert_eq!(other.world.info.gems, 7);
    assert!(other.world.info.has_flag("VISITED"));
    assert_eq!(other.world.info.current_board, 1);
    assert_eq!(other.world.board.name, "Hall");
    assert_eq!(other.world.board_count(), 2);
    assert_eq!(other.world.board.tiles.get(5, 5), Tile::new(id::GEM, 0x0B));
    assert_eq!(other.world.board.stats.count(), 1);
    assert_eq!(other.world.board.object_name(1).as_deref(), Some("GUARD"));
}

#[test]
fn test_loaded_world_keeps_script_state() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.zzt");

    let mut sim = simulation(sample_world());
    sim.tick();
    let halted = sim.world.board.stats.get(1).cursor;
    assert_eq!(halted, -1);
    assert!(sim.save_world(&path));

    let mut other = simulation(World::new());
    assert!(other.load_world(&path, LoadMode::Full));
    assert_eq!(other.world.board.stats.get(1).cursor, -1);

    other.world.board.send(0, "GUARD:TOUCH", false, false);
    other.tick();
    assert!(other.host.messages().any(|m| m == "Halt!"));
}

#[test]
fn test_title_only_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("title.zzt");
    let mut sim = simulation(sample_world());
    assert!(sim.save_world(&path));

    let mut title = Simulation::title(World::new(), EngineConfig::default(), HeadlessHost::new(1));
    assert!(title.load_world(&path, LoadMode::TitleOnly));
    assert_eq!(title.mode(), Mode::Title);
    assert_eq!(title.world.board_count(), 1);
    assert_eq!(title.world.info.current_board, 0);
    assert!(title.world.info.is_save);
    assert_eq!(title.world.info.name, "SAMPLE");
}

#[test]
fn test_incompatible_file_keeps_current_world() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("future.zzt");
    let mut bytes = sample_world().encode().unwrap();
    bytes[..2].copy_from_slice(&(-3i16).to_le_bytes());
    fs::write(&path, &bytes).unwrap();

    let mut sim = simulation(World::new());
    sim.world.info.gems = 42;
    assert!(!sim.load_world(&path, LoadMode::Full));
    assert_eq!(sim.world.info.gems, 42);
    assert!(sim.host.events().iter().any(|e| matches!(
        e,
        HostEvent::Window(window) if window.lines[0].contains("newer")
    )));
}

#[test]
fn test_missing_and_truncated_files_are_reported() {
    let dir = TempDir::new().unwrap();
    let mut sim = simulation(World::new());
    assert!(!sim.load_world(&dir.path().join("absent.zzt"), LoadMode::Full));

    let path = dir.path().join("short.zzt");
    let bytes = sample_world().encode().unwrap();
    fs::write(&path, &bytes[..bytes.len() - 10]).unwrap();
    assert!(!sim.load_world(&path, LoadMode::Full));
    assert_eq!(sim.host.windows().count(), 2);
    assert_eq!(sim.world.board_count(), 1);
}

#[test]
fn test_config_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("engine.json");
    fs::write(&path, r#"{"instruction_budget": 4, "seed": 9}"#).unwrap();

    let config = EngineConfig::load(&path).unwrap();
    assert_eq!(config.instruction_budget, 4);
    assert_eq!(config.seed, Some(9));
    assert_eq!(config.tick_speed, EngineConfig::default().tick_speed);

    let mut sim = Simulation::new(World::new(), config, HeadlessHost::new(1));
    let template = Stat {
        script: Some(Script::from_text(&"#give gems 1\n".repeat(10))),
        ..Stat::default()
    };
    sim.add_stat(10, 10, id::OBJECT, 0x0F, 1, &template).unwrap();
    sim.tick();
    assert_eq!(sim.world.info.gems, 4);
}

//! Benchmarks for the board and world binary formats.

#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use zoo::board::{BOARD_HEIGHT, BOARD_WIDTH, Board, Script, Stat, Tile, rle_runs};
use zoo::elements::id;
use zoo::world::{LoadMode, World};

/// A board with noisy tiles and many objects sharing one script.
fn dense_board() -> Board {
    let mut board = Board::new();
    for y in 2..BOARD_HEIGHT {
        for x in 2..BOARD_WIDTH {
            let element = [id::EMPTY, id::FOREST, id::BREAKABLE, id::WATER][((x * 7 + y * 3) % 4) as usize];
            board.tiles.set(x, y, Tile::new(element, ((x + y) % 16) as u8));
        }
    }
    let shared = Script::from_text("@twin\n#end\n:touch\nHello!\n#end\n");
    for i in 0..100 {
        if let Some(index) = board.add_stat(2 + i % 50, 3 + (i / 50) * 5, id::OBJECT, 0x0F, 3, &Stat::default())
            && let Some(stat) = board.stats.get_mut(index)
        {
            stat.script = Some(shared.clone());
        }
    }
    board
}

fn bench_board(c: &mut Criterion) {
    let board = dense_board();
    let bytes = board.encode().unwrap_or_default();

    c.bench_function("board_rle_runs", |b| b.iter(|| black_box(rle_runs(black_box(&board.tiles)))));
    c.bench_function("board_encode", |b| b.iter(|| black_box(board.encode())));
    c.bench_function("board_decode", |b| b.iter(|| black_box(Board::decode(black_box(&bytes)))));
}

fn bench_world(c: &mut Criterion) {
    let mut world = World::new();
    let board = dense_board();
    for _ in 0..20 {
        world.push_board(&board).ok();
    }
    let bytes = world.encode().unwrap_or_default();

    c.bench_function("world_decode_full", |b| {
        b.iter(|| black_box(World::decode(black_box(&bytes), LoadMode::Full)));
    });
    c.bench_function("world_decode_title_only", |b| {
        b.iter(|| black_box(World::decode(black_box(&bytes), LoadMode::TitleOnly)));
    });
}

criterion_group!(benches, bench_board, bench_world);
criterion_main!(benches);

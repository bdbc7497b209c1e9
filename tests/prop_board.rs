//! Property-based tests for the board format and the stat table.
//!
//! Run with: cargo test --release prop_board

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use zoo::board::{BOARD_HEIGHT, BOARD_WIDTH, Board, Script, Stat, Tile, rle_runs};
use zoo::elements::id;

/// A tile placement: position, element and colour.
fn tile_strategy() -> impl Strategy<Value = (i16, i16, u8, u8)> {
    (1..=BOARD_WIDTH, 1..=BOARD_HEIGHT, 0..=id::MAX, any::<u8>())
}

/// A stat placement with arbitrary parameters and an optional script.
fn stat_strategy() -> impl Strategy<Value = (i16, i16, Stat)> {
    (
        1..=BOARD_WIDTH,
        1..=BOARD_HEIGHT,
        (-1i16..=1, -1i16..=1, 0i16..=10),
        (any::<u8>(), any::<u8>(), any::<u8>()),
        proptest::option::of(proptest::collection::vec(1u8..=255, 0..64)),
    )
        .prop_map(|(x, y, (step_x, step_y, cycle), (p1, p2, p3), script)| {
            let stat = Stat {
                step_x,
                step_y,
                cycle,
                p1,
                p2,
                p3,
                script: script.map(Script::new),
                ..Stat::default()
            };
            (x, y, stat)
        })
}

fn build_board(name: &str, tiles: &[(i16, i16, u8, u8)], stats: &[(i16, i16, Stat)]) -> Board {
    let mut board = Board::new();
    board.name = name.to_string();
    for &(x, y, element, color) in tiles {
        board.tiles.set(x, y, Tile::new(element, color));
    }
    for (x, y, template) in stats {
        let cycle = template.cycle;
        board.add_stat(*x, *y, id::OBJECT, 0x0F, cycle, template);
    }
    board
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Decoding an encoded board gives back the same tiles, stats and info.
    #[test]
    fn prop_board_roundtrip(
        name in "[A-Za-z0-9 ]{0,50}",
        tiles in proptest::collection::vec(tile_strategy(), 0..400),
        stats in proptest::collection::vec(stat_strategy(), 0..40),
        max_shots in any::<u8>(),
        is_dark in any::<bool>(),
        time_limit in 0i16..1000,
    ) {
        let mut board = build_board(&name, &tiles, &stats);
        board.info.max_shots = max_shots;
        board.info.is_dark = is_dark;
        board.info.time_limit = time_limit;

        let bytes = board.encode().unwrap();
        let decoded = Board::decode(&bytes).unwrap();
        prop_assert_eq!(decoded, board);
    }

    /// Runs are never empty, never exceed a byte and cover every playable cell.
    #[test]
    fn prop_rle_runs_cover_grid(
        tiles in proptest::collection::vec(tile_strategy(), 0..1500),
    ) {
        let board = build_board("", &tiles, &[]);
        let runs = rle_runs(&board.tiles);
        prop_assert!(runs.iter().all(|r| r.count >= 1));
        let covered: usize = runs.iter().map(|r| usize::from(r.count)).sum();
        prop_assert_eq!(covered, (BOARD_WIDTH * BOARD_HEIGHT) as usize);
    }

    /// Any byte soup either decodes or fails cleanly.
    #[test]
    fn prop_decode_garbage_no_panic(bytes in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let _ = Board::decode(&bytes);
    }

    /// Removing a stat re-links every chain reference around the hole.
    #[test]
    fn prop_remove_relinks(
        links in proptest::collection::vec((-1i16..=20, -1i16..=20), 1..=20),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut board = Board::new();
        let count = links.len() as i16;
        for (i, &(follower, leader)) in links.iter().enumerate() {
            let template = Stat {
                follower: follower.min(count),
                leader: leader.min(count),
                ..Stat::default()
            };
            let x = 2 + (i as i16 % 50);
            let y = 2 + (i as i16 / 50);
            board.add_stat(x, y, id::CENTIPEDE_SEGMENT, 0x09, 2, &template).unwrap();
        }
        let before = board.stats.clone();
        let removed = 1 + pick.index(links.len()) as i16;

        let expected = |link: i16| match link.cmp(&removed) {
            std::cmp::Ordering::Less => link,
            std::cmp::Ordering::Equal => -1,
            std::cmp::Ordering::Greater => link - 1,
        };

        board.remove_stat(removed).unwrap();
        prop_assert_eq!(board.stats.count(), count - 1);
        for old in (1..=count).filter(|&i| i != removed) {
            let new = if old > removed { old - 1 } else { old };
            let stat = board.stats.get(new);
            let original = before.get(old);
            prop_assert_eq!(stat.follower, expected(original.follower));
            prop_assert_eq!(stat.leader, expected(original.leader));
            prop_assert!((-1..=board.stats.count()).contains(&stat.follower));
            prop_assert!((-1..=board.stats.count()).contains(&stat.leader));
        }
    }

    /// Placing then removing a stat restores the covered tile exactly.
    #[test]
    fn prop_add_remove_restores_under(
        (x, y, element, color) in tile_strategy(),
        cycle in 1i16..10,
    ) {
        let mut board = Board::new();
        prop_assume!((x, y) != board.player_pos());
        let original = Tile::new(element, color);
        board.tiles.set(x, y, original);

        let index = board.add_stat(x, y, id::LION, 0x0C, cycle, &Stat::default()).unwrap();
        prop_assert_eq!(board.stats.get(index).under, original);
        board.remove_stat(index).unwrap();
        prop_assert_eq!(board.tiles.get(x, y), original);
    }
}

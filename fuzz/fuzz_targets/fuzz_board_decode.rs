#![no_main]

//! Board decoder fuzzer.
//!
//! Any byte string must either fail to decode or produce a board that
//! encodes and decodes back to itself.

use libfuzzer_sys::fuzz_target;
use zoo::board::Board;

fuzz_target!(|data: &[u8]| {
    let Ok(board) = Board::decode(data) else {
        return;
    };
    let Ok(bytes) = board.encode() else {
        return;
    };
    let again = Board::decode(&bytes).expect("re-encoded board must decode");
    assert_eq!(again, board, "board changed across a round trip");
});

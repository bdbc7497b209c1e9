#![no_main]

//! World file fuzzer: headers, board counts and blobs from raw bytes.

use libfuzzer_sys::fuzz_target;
use zoo::world::{LoadMode, World};

fuzz_target!(|data: &[u8]| {
    for mode in [LoadMode::Full, LoadMode::TitleOnly] {
        if let Ok(mut world) = World::decode(data, mode) {
            let count = world.board_count();
            let bytes = world.encode().expect("decoded world must encode");
            let again = World::decode(&bytes, mode).expect("re-encoded world must decode");
            assert_eq!(again.board_count(), count);
        }
    }
});

//! Fuzz target for the json capability.
//!
//! Parsed documents must serialize and parse back to the same value.

#![no_main]

use capprobe::capability::{Json, StandardJson};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(value) = StandardJson.loads(text) {
        let dumped = StandardJson.dumps(&value).expect("parsed value serializes");
        let reparsed = StandardJson.loads(&dumped).expect("dumped text parses");
        assert_eq!(value, reparsed);
    }
});

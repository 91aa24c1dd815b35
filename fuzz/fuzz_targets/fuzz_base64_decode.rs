//! Fuzz target for base64 decoding.

#![no_main]

use capprobe::capability::crypto::encoding::{base64_decode, base64_encode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Whitespace aside, accepted input is canonical and re-encodes to itself.
    if let Ok(bytes) = base64_decode(text) {
        let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        assert_eq!(base64_encode(&bytes), compact);
    }
});

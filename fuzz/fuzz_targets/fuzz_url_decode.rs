//! Fuzz target for URL decoding.
//!
//! Arbitrary text must decode to `Ok` or `Err`, never panic. Anything that
//! decodes must survive a re-encode and decode unchanged.

#![no_main]

use capprobe::capability::crypto::encoding::{url_decode, url_encode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(decoded) = url_decode(text) {
        let again = url_decode(&url_encode(&decoded)).expect("re-encoded text decodes");
        assert_eq!(decoded, again);
    }
});

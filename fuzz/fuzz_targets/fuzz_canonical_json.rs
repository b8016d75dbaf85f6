//! Fuzz target for JSON canonicalization.
//!
//! Canonicalization must never panic, and must be idempotent on any input.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_canonical_json -- -max_total_time=600

#![no_main]

use chef_provider::canonical::{normalize_json, try_normalize_json, INVALID_JSON};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let once = normalize_json(s);
        let twice = normalize_json(&once);
        assert_eq!(once, twice);

        match try_normalize_json(s) {
            Ok(canonical) => assert_eq!(canonical, once),
            Err(_) => assert_eq!(once, INVALID_JSON),
        }
    }
});

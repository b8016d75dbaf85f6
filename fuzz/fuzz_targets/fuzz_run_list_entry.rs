//! Fuzz target for run-list entry qualification.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_run_list_entry -- -max_total_time=600

#![no_main]

use chef_provider::canonical::normalize_run_list_entry;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let once = normalize_run_list_entry(s);
        assert_eq!(normalize_run_list_entry(&once), once);
        assert!(once.contains('['));
    }
});

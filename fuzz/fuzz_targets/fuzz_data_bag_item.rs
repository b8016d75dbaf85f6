//! Fuzz target for data bag item responses.
//!
//! Arbitrary server bodies must decode or fail cleanly.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_data_bag_item -- -max_total_time=600

#![no_main]

use chef_provider::entity::{DataBagItem, EntityKind, Locator, RemoteEntity};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(body) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    let locator = Locator::within(EntityKind::DataBagItem, "fuzz", "item");
    if let Ok(item) = DataBagItem::from_response(&locator, body) {
        assert_eq!(item.data_bag, "fuzz");
        assert!(!item.content.contains_key("id"));
    }
});

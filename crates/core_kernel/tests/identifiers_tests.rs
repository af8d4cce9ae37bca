//! Unit tests for the identifiers module

use core_kernel::{MessageId, UserId};
use proptest::prelude::*;

#[test]
fn test_prefixes() {
    assert_eq!(UserId::prefix(), "USR");
    assert_eq!(MessageId::prefix(), "MSG");
}

#[test]
fn test_ordering_follows_raw_value() {
    assert!(UserId::new(1) < UserId::new(2));
}

#[test]
fn test_serde_is_transparent() {
    let id = UserId::new(7355988800);
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "7355988800");
    let back: UserId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}

#[test]
fn test_whitespace_around_raw_value_is_accepted() {
    let id: UserId = " 12 ".parse().unwrap();
    assert_eq!(id.get(), 12);
}

proptest! {
    #[test]
    fn prop_display_parses_back(raw in any::<i64>()) {
        let id = UserId::new(raw);
        let parsed: UserId = id.to_string().parse().unwrap();
        prop_assert_eq!(parsed, id);
    }
}

//! Custom Test Assertions
//!
//! Provides assertion helpers for conversation transcripts that give more
//! meaningful failure messages than comparing whole vectors.

use core_kernel::{ChoiceButtons, UserId};

use crate::fakes::RecordingTransport;

/// Asserts that the last message sent to `user` has the expected text
///
/// # Panics
///
/// Panics if nothing was sent to `user` or the text differs
pub fn assert_last_text(transport: &RecordingTransport, user: UserId, expected: &str) {
    match transport.last_sent_to(user) {
        Some((text, _)) => assert_eq!(
            text, expected,
            "Last message to {} was {:?}, expected {:?}",
            user, text, expected
        ),
        None => panic!("No message was sent to {}, expected {:?}", user, expected),
    }
}

/// Asserts that the last message sent to `user` carries buttons with the
/// given callback payloads, in order
pub fn assert_last_buttons(transport: &RecordingTransport, user: UserId, expected: &[&str]) {
    let buttons: Option<ChoiceButtons> = transport.last_sent_to(user).and_then(|(_, b)| b);
    let data: Vec<String> = buttons
        .map(|b| b.buttons().map(|button| button.data.clone()).collect())
        .unwrap_or_default();
    assert_eq!(
        data, expected,
        "Buttons on the last message to {} were {:?}, expected {:?}",
        user, data, expected
    );
}

/// Asserts that nothing at all was sent to `user`
pub fn assert_silent(transport: &RecordingTransport, user: UserId) {
    let calls = transport.calls_to(user);
    assert_eq!(calls, 0, "Expected no messages to {}, found {}", user, calls);
}

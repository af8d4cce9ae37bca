//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating conversation inputs that
//! respect or deliberately break the intake rules.

use core_kernel::{InboundEvent, UserId};
use domain_claims::Network;
use proptest::prelude::*;

/// Strategy for generating positive chat identities
pub fn user_id_strategy() -> impl Strategy<Value = UserId> {
    (1i64..10_000_000_000i64).prop_map(UserId::new)
}

/// Strategy for generating supported networks
pub fn network_strategy() -> impl Strategy<Value = Network> {
    prop_oneof![Just(Network::Sol), Just(Network::Eth), Just(Network::Btc)]
}

/// Strategy for generating network callback payloads in any casing
pub fn network_choice_strategy() -> impl Strategy<Value = String> {
    (network_strategy(), any::<bool>()).prop_map(|(network, lower)| {
        if lower {
            network.code().to_lowercase()
        } else {
            network.code().to_string()
        }
    })
}

/// Strategy for generating payloads that are not a supported network
pub fn unknown_choice_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z]{0,6}".prop_filter("must not name a network", |s| s.parse::<Network>().is_err())
}

/// Strategy for generating non-blank handles
pub fn handle_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_]{1,16}"
}

/// Strategy for generating non-blank wallet addresses
pub fn wallet_strategy() -> impl Strategy<Value = String> {
    prop_oneof!["0x[0-9a-f]{40}", "bc1[0-9a-z]{20,39}", "[1-9A-HJ-NP-Za-km-z]{32,44}"]
}

/// Strategy for generating arbitrary inbound events from one user
pub fn event_strategy(user: UserId) -> impl Strategy<Value = InboundEvent> {
    prop_oneof![
        prop_oneof![Just("start"), Just("cancel"), Just("admin"), Just("help")]
            .prop_map(move |c| InboundEvent::command(c, user)),
        prop_oneof![Just("claim".to_string()), network_choice_strategy(), unknown_choice_strategy()]
            .prop_map(move |d| InboundEvent::button(d, user)),
        prop_oneof![handle_strategy(), wallet_strategy(), Just("   ".to_string())]
            .prop_map(move |t| InboundEvent::text(t, user)),
    ]
}

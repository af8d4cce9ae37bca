//! Pre-built Test Fixtures
//!
//! Provides ready-to-use identities and answers used across the conversation
//! tests. Values are fixed so transcripts are predictable.

use chrono::{DateTime, TimeZone, Utc};
use core_kernel::UserId;
use domain_claims::Network;

/// Fixture for chat identities
pub struct IdFixtures;

impl IdFixtures {
    /// The operator configured for notifications and `/admin`
    pub fn operator() -> UserId {
        UserId::new(7_355_988_800)
    }

    /// A regular user walking through the flow
    pub fn alice() -> UserId {
        UserId::new(1001)
    }

    /// A second regular user, for concurrency scenarios
    pub fn bob() -> UserId {
        UserId::new(1002)
    }
}

/// Fixture for the answers a user types
pub struct AnswerFixtures;

impl AnswerFixtures {
    pub fn handle() -> &'static str {
        "player1"
    }

    pub fn network() -> Network {
        Network::Eth
    }

    pub fn wallet() -> &'static str {
        "0xABC"
    }
}

/// Fixture for timestamps
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// A fixed instant used as `created_at` in builders
    pub fn filed_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

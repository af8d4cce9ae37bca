//! Strongly-typed identifiers for chat entities
//!
//! The chat platform hands out signed 64-bit integers for users and messages.
//! Newtype wrappers keep a user identity from being mixed up with a message
//! identity anywhere in the domain.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an identifier from the raw platform value
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw platform value
            pub const fn get(&self) -> i64 {
                self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let raw = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                raw.trim().parse::<i64>().map(Self).map_err(|e| {
                    CoreError::validation(format!(
                        "invalid {} '{}': {}",
                        stringify!($name),
                        s,
                        e
                    ))
                })
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

// Identity of a chat user; private chats share the same value
define_id!(UserId, "USR");
define_id!(MessageId, "MSG");

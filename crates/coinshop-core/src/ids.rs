//! Identifier types for coinshop.
//!
//! Every persisted row is keyed by a 64-bit serial assigned by the store.
//! Wrapping those keys in distinct newtypes keeps an `ItemId` from ever being
//! passed where an `AccountId` is expected.
//!
//! # Macro-based ID Types
//!
//! The `serial_id_type!` macro reduces boilerplate for serial identifier types,
//! ensuring consistent implementation of serialization, parsing, and display traits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Macro to define a serial identifier type with standard trait implementations.
///
/// This macro generates a newtype wrapper around `i64` with implementations for:
/// - `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `Serialize`, `Deserialize` (as a bare integer)
/// - `FromStr`, `Display`, `Debug`
/// - `From<i64>`, `From<Self> for i64`
///
/// # Example
///
/// ```ignore
/// serial_id_type!(MyId, "A custom identifier type.");
/// let id = MyId::new(7);
/// let parsed: MyId = id.to_string().parse().unwrap();
/// ```
macro_rules! serial_id_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw store key.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Return the raw store key.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s.parse::<i64>().map_err(|_| IdError::NotAnInteger)?;
                if raw <= 0 {
                    return Err(IdError::NotPositive);
                }
                Ok(Self(raw))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

serial_id_type!(AccountId, "An account identifier.\n\nAssigned when the account row is first inserted and carried in issued tokens.");
serial_id_type!(ItemId, "A catalog item identifier.");
serial_id_type!(OrderId, "An order identifier.\n\nOrders are append-only, so a larger id means a later purchase.");
serial_id_type!(TransactionId, "A coin transaction identifier.\n\nTransactions are append-only, so a larger id means a later transfer.");

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is not a base-10 integer.
    #[error("identifier is not an integer")]
    NotAnInteger,

    /// Store keys start at 1.
    #[error("identifier must be positive")]
    NotPositive,
}

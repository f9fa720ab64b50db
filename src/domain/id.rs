//! Typed record identifiers
//!
//! Every table uses an integer primary key assigned by the store. Wrapping
//! them keeps an animal id from being passed where a litter id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid {kind} id: expected a positive integer, got '{value}'")]
    Invalid { kind: &'static str, value: String },
}

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Human-readable name of the record kind
            pub const KIND: &'static str = $kind;

            /// Returns the raw integer key
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                match trimmed.parse::<i64>() {
                    Ok(n) if n > 0 => Ok(Self(n)),
                    _ => Err(IdError::Invalid {
                        kind: $kind,
                        value: trimmed.to_string(),
                    }),
                }
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

record_id!(
    /// Primary key of an animal row
    AnimalId,
    "animal"
);
record_id!(
    /// Primary key of a breeding row
    BreedingId,
    "breeding"
);
record_id!(
    /// Primary key of a litter row
    LitterId,
    "litter"
);
record_id!(
    /// Primary key of a harvest row
    HarvestId,
    "harvest"
);
record_id!(
    /// Primary key of a feed cost row
    FeedCostId,
    "feed cost"
);
record_id!(
    /// Primary key of a sale row
    SaleId,
    "sale"
);

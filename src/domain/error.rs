//! Domain error taxonomy
//!
//! [`ValidationError`] covers malformed requests and is raised before any
//! record is read. [`LifecycleError`] covers requests that are well formed
//! but violate a rule given the current records.

use thiserror::Error;

/// A rule violation detected against the current state of the herd
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    /// A referenced record does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// The requested transition or payload breaks a domain rule
    #[error("{0}")]
    InvalidState(String),

    /// A live reference blocks the requested change
    #[error("{0}")]
    Conflict(String),
}

impl LifecycleError {
    pub fn not_found(entity: &'static str, id: impl Into<i64>) -> Self {
        LifecycleError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        LifecycleError::InvalidState(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        LifecycleError::Conflict(message.into())
    }
}

/// A request whose shape is wrong regardless of stored records
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },

    #[error("{field} cannot be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("male_count + female_count cannot exceed weaned_count")]
    SexCountsExceedWeaned,

    #[error("Provide animal_id or litter_id, not both")]
    AmbiguousSaleTarget,

    #[error("One of animal_id or litter_id is required")]
    MissingSaleTarget,

    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
}

/// Rejects negative money amounts
pub fn non_negative(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value < 0.0 || value.is_nan() {
        Err(ValidationError::Negative { field, value })
    } else {
        Ok(value)
    }
}

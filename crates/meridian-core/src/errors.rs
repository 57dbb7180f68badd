//! Unified error type for metadata operations
//!
//! The core has no fatal errors. The only failure a pure operation can report
//! is that a single resolved value was requested while concurrent branches
//! are still unresolved; the remaining variants belong to the typed
//! administrative surface layered on top.

use serde::{Deserialize, Serialize};

/// Errors raised by metadata accessors and administrative writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum MetadataError {
    /// A single value was requested but concurrent branches are unresolved
    #[error("Value in conflict: {branches} concurrent branches")]
    ValueInConflict {
        /// Number of distinct concurrent values
        branches: usize,
    },

    /// The field may only be written by its owning subsystem
    #[error("Field is read-only: {field}")]
    ReadOnlyField {
        /// Field name as exposed to operators
        field: String,
    },

    /// No field with this name exists
    #[error("Unknown field: {field}")]
    UnknownField {
        /// The name that was requested
        field: String,
    },

    /// Invalid input for a write
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },

    /// Encoding or decoding failed
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },
}

impl MetadataError {
    /// Create a conflict error for `branches` concurrent values
    pub fn value_in_conflict(branches: usize) -> Self {
        Self::ValueInConflict { branches }
    }

    /// Create a read-only field error
    pub fn read_only(field: impl Into<String>) -> Self {
        Self::ReadOnlyField {
            field: field.into(),
        }
    }

    /// Create an unknown field error
    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::UnknownField {
            field: field.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Whether this error reports unresolved concurrent branches
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ValueInConflict { .. })
    }
}

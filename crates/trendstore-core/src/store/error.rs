//! Error types and SNAFU context selectors for the store engine.
//!
//! The taxonomy separates what the caller can fix from what the store broke:
//! [`ValidationError`] covers bad or missing input (recoverable, mapped to
//! client errors by transports), while the remaining [`EngineError`]
//! variants cover storage/engine failures (surfaced, never retried
//! internally). Keep new variants here so user-facing messages stay in one
//! place.

use snafu::prelude::*;

use crate::{schema::StorageType, storage::StorageError};

/// General result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Bad or missing caller input, recoverable by the caller.
///
/// Per-item failures during batch operations never abort the batch at a
/// coarser grain than the single item; single-item operations fail fast
/// with one of these.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ValidationError {
    /// The target collection has not been provisioned (ingestion never
    /// creates collections implicitly).
    #[snafu(display("unknown collection '{collection}' in dataset '{dataset}'"))]
    UnknownCollection {
        /// Dataset namespace.
        dataset: String,
        /// Collection that was not found.
        collection: String,
    },

    /// A required field (schema column without a default) is absent.
    #[snafu(display("missing required field '{field}'"))]
    MissingField {
        /// Name of the missing field.
        field: String,
    },

    /// A supplied value does not conform to the column's storage type.
    #[snafu(display("field '{field}' does not conform to type {expected}"))]
    WrongType {
        /// Name of the offending field.
        field: String,
        /// The column's storage type.
        expected: StorageType,
    },

    /// A supplied field is not part of the collection's schema.
    #[snafu(display("field '{field}' is not defined by the collection schema"))]
    UnknownField {
        /// Name of the unknown field.
        field: String,
    },

    /// A supplied field collides with a store-reserved field.
    #[snafu(display("field '{field}' is reserved and cannot be supplied"))]
    ReservedField {
        /// Name of the reserved field.
        field: String,
    },

    /// A caller-supplied time bound could not be parsed.
    #[snafu(display("unparsable timestamp '{input}'"))]
    BadTimestamp {
        /// The input that failed to parse.
        input: String,
    },

    /// A dataset or collection name is not usable as a path component.
    #[snafu(display("invalid dataset or collection name '{name}'"))]
    InvalidName {
        /// The offending name.
        name: String,
    },
}

/// Errors from engine operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum EngineError {
    /// Caller input failed validation.
    #[snafu(display("validation failure: {source}"))]
    Validation {
        /// The specific validation failure.
        source: ValidationError,
    },

    /// The storage backend failed.
    #[snafu(display("store failure: {source}"))]
    Storage {
        /// Underlying storage error.
        source: StorageError,
    },

    /// A record could not be encoded for storage.
    #[snafu(display("failed to encode record: {source}"))]
    Encode {
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

impl EngineError {
    /// True when the failure is caller-recoverable (maps to a client error
    /// in transports, as opposed to a store/engine failure).
    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Validation { .. })
    }
}

impl From<ValidationError> for EngineError {
    fn from(source: ValidationError) -> Self {
        EngineError::Validation { source }
    }
}

/// Reject dataset/collection names that cannot be path components.
pub(crate) fn validate_name(name: &str) -> Result<(), ValidationError> {
    if crate::storage::is_valid_name(name) {
        Ok(())
    } else {
        InvalidNameSnafu { name }.fail()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_is_distinguishable_from_store_failures() {
        let v: EngineError = ValidationError::MissingField {
            field: "SID".to_string(),
        }
        .into();
        assert!(v.is_validation());
        assert!(v.to_string().contains("missing required field 'SID'"));
    }
}

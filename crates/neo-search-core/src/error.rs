//! Error taxonomy for catalog ingestion, query planning, and search.
//!
//! | Variant | Raised by |
//! |---------|-----------|
//! | [`CatalogError::MissingField`] | ingestion (absent column), plan building (absent date parameter) |
//! | [`CatalogError::InvalidFormat`] | ingestion (unparsable number/flag/date), plan building (bad token or value) |
//! | [`CatalogError::UnsupportedFeature`] | plan building (unknown field, operator, or result shape) |
//! | [`CatalogError::InvariantViolation`] | internal state that a validated plan and built index rule out |

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors produced by the core crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// A required key was absent from a record or query.
    #[error("missing field: {field}")]
    MissingField {
        /// Name of the absent field.
        field: String,
    },

    /// A value was present but could not be parsed.
    #[error("invalid format for {field}: '{value}'")]
    InvalidFormat {
        /// Name of the offending field.
        field: String,
        /// The raw value as supplied.
        value: String,
    },

    /// A filter field, operator, or result shape is not recognized.
    #[error("unsupported feature: {message}")]
    UnsupportedFeature {
        /// Description of what was not recognized.
        message: String,
    },

    /// Internal state that should be unreachable.
    #[error("invariant violation: {message}")]
    InvariantViolation {
        /// Description of the broken invariant.
        message: String,
    },
}

impl CatalogError {
    pub(crate) fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub(crate) fn invalid(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidFormat {
            field: field.into(),
            value: value.into(),
        }
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedFeature {
            message: message.into(),
        }
    }
}

/// An ingestion error tagged with the 1-based position of the record that
/// produced it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("record {record}: {source}")]
pub struct RecordError {
    /// 1-based position of the record in the input sequence.
    pub record: usize,
    /// The underlying error.
    #[source]
    pub source: CatalogError,
}

//! Commerce error types.

use route66_storage::StorageError;
use thiserror::Error;

/// Product data failed validation.
///
/// Every variant carries the zero-based index of the offending entry so a
/// broken catalog file can be fixed without bisecting it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// The top-level JSON value is not an array.
    #[error("Product data must be a JSON array, got {0}")]
    NotAnArray(&'static str),

    /// An entry is not a JSON object.
    #[error("Product at index {index} must be an object")]
    NotAnObject { index: usize },

    /// A field is missing or has the wrong shape.
    #[error("Product at index {index} has invalid `{field}`: {reason}")]
    InvalidField {
        index: usize,
        field: String,
        reason: String,
    },

    /// Two entries share a name.
    #[error("Product at index {index} duplicates the name {name:?}")]
    DuplicateName { index: usize, name: String },

    /// The catalog file could not be read.
    #[error("Failed to read product data: {0}")]
    Io(String),

    /// The catalog file is not valid JSON.
    #[error("Failed to parse product data: {0}")]
    Parse(String),
}

impl CatalogError {
    pub(crate) fn field(index: usize, field: impl Into<String>, reason: impl Into<String>) -> Self {
        CatalogError::InvalidField {
            index,
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that can occur in storefront operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Product data failed validation.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Invalid unit price.
    #[error("Invalid unit price: {0}")]
    InvalidPrice(f64),

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Action not allowed in the consent gate's current state.
    #[error("Invalid consent transition: cannot {action} while {state}")]
    InvalidConsentTransition { state: String, action: String },

    /// Unknown sort order string.
    #[error("Unknown sort order: {0}")]
    UnknownSortOrder(String),

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}

//! Access failure reasons
//!
//! The public accessors (`get`, `set`, `keys`) never fail: every reason below
//! is logged at trace level and collapsed to an absent value or a no-op.
//! `try_get` / `try_set` surface them for callers that need to tell a missing
//! property apart from a failed access.

use thiserror::Error;

/// Why a single property access did not produce a value or did not store one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The host value has no property by this name, or the index is past the end.
    #[error("Property '{0}' not found")]
    NotFound(String),

    /// An index is outside the bounds the operation accepts.
    #[error("Index {index} out of range for length {len}")]
    OutOfRange {
        /// Index resolved from the key
        index: i64,
        /// Length of the collection at the time of the access
        len: usize,
    },

    /// The value does not fit the storage slot (field type, array element type).
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Storage type name
        expected: &'static str,
        /// Type name of the offered value
        found: &'static str,
    },

    /// The record field is marked read-only.
    #[error("Property '{0}' is read-only")]
    ReadOnly(&'static str),

    /// The value cannot be expressed in the backing storage (e.g. NaN in a document).
    #[error("Value of type {0} cannot be represented in this storage")]
    Unrepresentable(&'static str),

    /// The host value is already borrowed elsewhere on this thread.
    #[error("Host value is busy (already borrowed)")]
    Busy,

    /// A record descriptor was invoked on an instance of another type.
    #[error("Descriptor for '{0}' invoked on a foreign receiver")]
    WrongReceiver(&'static str),

    /// The value has no property-access kind (absent or scalar).
    #[error("Values of type {0} have no properties")]
    NoProperties(&'static str),
}

impl AccessError {
    /// `true` when the failure only means "nothing there".
    pub fn is_not_found(&self) -> bool {
        matches!(self, AccessError::NotFound(_) | AccessError::OutOfRange { .. })
    }
}

/// Result type for fallible access operations.
pub type AccessResult<T> = Result<T, AccessError>;

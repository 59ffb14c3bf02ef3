//! Error types for Indagar operations.
//!
//! Provides rich error context for library consumers.

use std::fmt;

/// Main error type for Indagar operations.
///
/// Covers construction-time configuration failures (malformed augmentation
/// maps, missing strategy capabilities), query-time lookup failures, and the
/// pool-exhaustion guard of the query-filling loop.
///
/// # Examples
///
/// ```
/// use indagar::error::IndagarError;
///
/// let err = IndagarError::PoolExhausted {
///     requested: 5,
///     resolved: 3,
/// };
/// assert!(err.to_string().contains("exhausted"));
/// ```
#[derive(Debug)]
pub enum IndagarError {
    /// Augmentation map violates the partition invariant.
    InvalidAugmentationMap {
        /// Offending sample id
        id: usize,
        /// What the id collides with
        detail: String,
    },

    /// A strategy variant was built with a base strategy lacking a
    /// required capability.
    MissingCapability {
        /// Variant that was being constructed
        variant: String,
        /// Capability the base strategy must provide
        required: String,
    },

    /// Reverse lookup was asked for an id that is not an augmented id.
    UnknownAugmentedId {
        /// The id that has no owning original
        id: usize,
    },

    /// The fill loop ran out of candidates before reaching its quota.
    PoolExhausted {
        /// Number of distinct original ids requested
        requested: usize,
        /// Number resolved before the pool emptied
        resolved: usize,
    },

    /// A base strategy broke its selection contract.
    SelectionContract {
        /// Description of the violation
        detail: String,
    },

    /// I/O error (file not found, permission denied, etc.).
    Io(std::io::Error),

    /// Serialization/deserialization error.
    Serialization(String),

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for IndagarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndagarError::InvalidAugmentationMap { id, detail } => {
                write!(f, "Invalid augmentation map: id {id} {detail}")
            }
            IndagarError::MissingCapability { variant, required } => {
                write!(
                    f,
                    "Strategy capability missing: {variant} requires a base strategy with {required}"
                )
            }
            IndagarError::UnknownAugmentedId { id } => {
                write!(f, "Unknown augmented id: {id} is not in the augmented id set")
            }
            IndagarError::PoolExhausted {
                requested,
                resolved,
            } => {
                write!(
                    f,
                    "Candidate pool exhausted: resolved {resolved} of {requested} requested original ids"
                )
            }
            IndagarError::SelectionContract { detail } => {
                write!(f, "Base strategy selection contract violated: {detail}")
            }
            IndagarError::Io(e) => write!(f, "I/O error: {e}"),
            IndagarError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            IndagarError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for IndagarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IndagarError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for IndagarError {
    fn from(err: std::io::Error) -> Self {
        IndagarError::Io(err)
    }
}

impl From<&str> for IndagarError {
    fn from(msg: &str) -> Self {
        IndagarError::Other(msg.to_string())
    }
}

impl From<String> for IndagarError {
    fn from(msg: String) -> Self {
        IndagarError::Other(msg)
    }
}

/// Result type alias for Indagar operations.
pub type Result<T> = std::result::Result<T, IndagarError>;

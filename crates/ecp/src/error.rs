//! The errors that can occur while building, maintaining, or querying an
//! index.

use std::error::Error as StdError;
use std::fmt;

/// Helper type for index operations that can fail.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the eCP index.
///
/// `InvalidInput` and `DimensionMismatch` are detected before any mutation,
/// so the index is left in its pre-call state. `EmptyIndex`, `EmptyInput`,
/// and `Internal` indicate misuse or corruption; the index must not be used
/// after any of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A caller-supplied parameter was outside its valid range.
    InvalidInput(String),
    /// A descriptor's length did not match the index dimensionality.
    DimensionMismatch {
        /// The dimensionality fixed at index creation.
        expected: usize,
        /// The length of the offending descriptor.
        actual: usize,
    },
    /// The operation requires an index that already holds at least one point.
    EmptyIndex,
    /// A traversal primitive was handed an empty node sequence. This cannot
    /// happen on a consistent index.
    EmptyInput,
    /// An internal invariant was violated during an operation. The index
    /// must be considered corrupt.
    Internal(String),
}

impl Error {
    /// Shorthand for an [`Error::InvalidInput`] with the given message.
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Shorthand for an [`Error::Internal`] with the given message.
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::DimensionMismatch { expected, actual } => {
                write!(f, "descriptor has {actual} dimensions but the index expects {expected}")
            }
            Self::EmptyIndex => write!(f, "the index holds no points"),
            Self::EmptyInput => write!(f, "traversal over an empty node sequence"),
            Self::Internal(message) => write!(f, "internal invariant violated: {message}"),
        }
    }
}

impl StdError for Error {}

//! Error types for gridshift-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gridshift-core
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed cell address text
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Malformed cell range text
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Row index out of bounds
    #[error("Row index {0} out of bounds (valid: 1..={1})")]
    RowOutOfBounds(u32, u32),

    /// Column index out of bounds
    #[error("Column index {0} out of bounds (valid: 1..={1})")]
    ColumnOutOfBounds(u32, u32),

    /// A merge, table or filter region collides with an existing one
    #[error("{kind} {range} overlaps existing region {existing}")]
    Overlap {
        kind: &'static str,
        range: String,
        existing: String,
    },

    /// Sheet index out of bounds
    #[error("Sheet index {0} out of bounds (count: {1})")]
    SheetOutOfBounds(usize, usize),

    /// Sheet not found by name
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// Invalid sheet name
    #[error("Invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// Duplicate sheet name
    #[error("Sheet name already exists: {0}")]
    DuplicateSheetName(String),

    /// Invalid defined name
    #[error("Invalid defined name: {0}")]
    InvalidName(String),

    /// Defined name already present in the same scope
    #[error("Defined name '{0}' already exists in this scope")]
    DuplicateName(String),

    /// Table name already in use
    #[error("Table name already exists: {0}")]
    DuplicateTable(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// True for malformed address/range text
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Error::InvalidAddress(_) | Error::InvalidRange(_))
    }

    /// True for indices outside the grid limits
    pub fn is_bounds_error(&self) -> bool {
        matches!(
            self,
            Error::RowOutOfBounds(..) | Error::ColumnOutOfBounds(..)
        )
    }
}

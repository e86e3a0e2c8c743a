//! Reference error types

use thiserror::Error;

/// Result type for reference operations
pub type RefResult<T> = std::result::Result<T, RefError>;

/// Errors that can occur while parsing reference text
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RefError {
    /// Text is not a cell or range reference
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Malformed sheet qualifier
    #[error("Invalid sheet qualifier: {0}")]
    InvalidQualifier(String),

    /// Address codec failure
    #[error(transparent)]
    Address(#[from] gridshift_core::Error),
}

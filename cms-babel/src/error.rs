//! Error types for format and conversion operations

use thiserror::Error;

/// Errors that can occur during format operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// Format not found in registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),
    /// Error during parsing
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Error during serialization
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// Format does not support the requested operation
    #[error("Operation not supported: {0}")]
    NotSupported(String),
}

/// Contract violations found while converting between the rich tree and the
/// document AST.
///
/// Every node kind is registered in the mapping tables, so these only come up
/// when a tree has the wrong *shape*: phrasing content where blocks are
/// required, or the other way around.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("unexpected {found} node inside {parent}")]
    UnexpectedNode { parent: String, found: String },
    #[error("expected a root node, found {0}")]
    NotARoot(String),
    #[error("heading depth {0} is out of range")]
    InvalidHeadingDepth(u8),
}

impl From<ConversionError> for FormatError {
    fn from(err: ConversionError) -> Self {
        FormatError::SerializationError(err.to_string())
    }
}

//! Unified error types for docxtpl.
use thiserror::Error;

/// Main error type for docxtpl operations.
///
/// Every variant is a structural failure: the surrounding package could not be
/// read or written, or a part the engine needs is absent or unusable.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    XmlError(String),

    /// Stream or part not found
    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    /// A part exists but cannot be processed
    #[error("Invalid part {part}: {reason}")]
    InvalidPart { part: String, reason: String },

    /// Invalid content type
    #[error("Invalid content type: expected {expected}, got {got}")]
    InvalidContentType { expected: String, got: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type for docxtpl operations.
pub type Result<T> = std::result::Result<T, Error>;

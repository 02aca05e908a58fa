//! Error types for framesum

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for framesum operations
pub type Result<T> = std::result::Result<T, Error>;

/// framesum error type
#[derive(Error, Debug)]
pub enum Error {
    // Frame errors (reject the frame, session continues)
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Geometry mismatch: {0}")]
    GeometryMismatch(String),

    #[error("Failed to map frame: {0}")]
    MapFailure(String),

    // Resource errors (fatal to the session)
    #[error("Failed to allocate {size} byte scratch buffer")]
    AllocationFailure { size: usize },

    // Negotiation / configuration errors
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Unsupported checksum algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // Raw file errors
    #[error("Failed to create output file {}: {source}", path.display())]
    OpenFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to the file {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Session errors
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Truncated input: expected {expected} bytes, got {got}")]
    TruncatedInput { expected: usize, got: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this error only rejects the current frame
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::InvalidGeometry(_) | Error::GeometryMismatch(_) | Error::MapFailure(_)
        )
    }

    /// Check if this error tears down the session
    pub fn is_session_fatal(&self) -> bool {
        matches!(
            self,
            Error::AllocationFailure { .. } | Error::OpenFailure { .. } | Error::WriteFailure { .. }
        )
    }
}

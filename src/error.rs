//! Error types for mip-transfer

use thiserror::Error;

/// Main error type for IPM conversion and MIP transfer operations
#[derive(Error, Debug)]
pub enum MipError {
    /// Invalid command usage (bad mode, malformed Transmission ID, ...)
    #[error("Usage error: {0}")]
    Usage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error (filesystem)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error (connect refused, reset, short read/write)
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout error
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Protocol error (bad return code, unexpected record layout)
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Invalid VBS record framing
    #[error("Invalid record framing at offset {offset}: length {length}")]
    Framing { offset: usize, length: i32 },

    /// No matching transmission found on the MIP (receive-only)
    #[error("Transmission not found: {0}")]
    NotFound(String),
}

/// Result type alias for MipError
pub type Result<T> = std::result::Result<T, MipError>;

impl From<serde_yaml::Error> for MipError {
    fn from(err: serde_yaml::Error) -> Self {
        MipError::Config(err.to_string())
    }
}

//! Common error types for MPSS

use thiserror::Error;

/// Common result type for MPSS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the MPSS tools
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or incomplete structure tree
    #[error("Structure format error: {0}")]
    Structure(String),

    /// Malformed scene file
    #[error("Scene format error: {0}")]
    Scene(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

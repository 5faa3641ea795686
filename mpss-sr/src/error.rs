//! Error types for mpss-sr
//!
//! Defines module-specific error types using thiserror for clear error
//! propagation. Render errors carry the index of the offending segment.

use thiserror::Error;

/// Errors reading a span of samples from a source clip
#[derive(Error, Debug)]
pub enum ClipError {
    /// Clip file could not be opened or decoded
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    /// Clip ends more than one sample before the requested span
    #[error("{path} ends before the requested span ({available} of {requested} samples)")]
    Exhausted {
        path: String,
        requested: usize,
        available: usize,
    },
}

/// Main error type for scene rendering
#[derive(Error, Debug)]
pub enum RenderError {
    /// Segment resolves outside the allocated buffer — an invariant breach
    /// in the segment list, never corrected silently
    #[error("Render target error in segment {index}: {message}")]
    Target { index: usize, message: String },

    /// Source clip could not supply the segment's samples
    #[error("Source error in segment {index}: {source}")]
    Source {
        index: usize,
        #[source]
        source: ClipError,
    },

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using mpss-sr RenderError
pub type Result<T> = std::result::Result<T, RenderError>;

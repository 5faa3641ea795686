//! Error types for mpss-sg
//!
//! Defines module-specific error types using thiserror for clear error
//! propagation. Generation errors carry the offending node's path in the
//! structure tree for diagnosability.

use mpss_common::structure::SpeakerId;
use thiserror::Error;

/// Main error type for scene generation
#[derive(Error, Debug)]
pub enum GenerateError {
    /// Malformed or inconsistent structure tree
    #[error("Structure error at {path}: {message}")]
    Structure { path: String, message: String },

    /// Conversation duration too short to seat every listed speaker
    #[error(
        "Duration conflict at {path}: {requested:.3}s requested, \
         at least {required:.3}s required"
    )]
    DurationConflict {
        path: String,
        requested: f64,
        required: f64,
    },

    /// No source clip of adequate length available for a required turn
    #[error(
        "Insufficient source material at {path}: no clip of at least \
         {min_len:.3}s for speaker {speaker}"
    )]
    InsufficientSource {
        path: String,
        speaker: SpeakerId,
        min_len: f64,
    },
}

/// Convenience Result type using mpss-sg GenerateError
pub type Result<T> = std::result::Result<T, GenerateError>;

//! Error types for the rep_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for rep_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Exercise profile failed validation at creation time
    #[error("Invalid exercise profile: {0}")]
    InvalidProfile(String),

    /// No exercise with the requested id in the catalog
    #[error("Unknown exercise: {0}")]
    UnknownExercise(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed record in a frame replay file
    #[error("Frame error at line {line}: {message}")]
    Frame { line: usize, message: String },

    /// Feedback sink could not deliver a message
    #[error("Feedback error: {0}")]
    Feedback(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

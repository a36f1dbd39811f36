// src/error.rs

//! Unified error handling for the archiver.

use std::fmt;

use thiserror::Error;

/// Result type alias for archiver operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Listing or thread fetch failed for a target
    #[error("Fetch failed for {target}: {message}")]
    Fetch { target: String, message: String },

    /// Appending to a target's archive failed
    #[error("Archive write failed for {target}: {message}")]
    Archive { target: String, message: String },

    /// Persisting a target's checkpoint failed
    #[error("Checkpoint write failed for {target}: {message}")]
    CheckpointWrite { target: String, message: String },

    /// The checkpoint medium could not be read at all
    #[error("Checkpoint store unreadable: {0}")]
    CheckpointUnreadable(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a fetch error with target context.
    pub fn fetch(target: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            target: target.into(),
            message: message.to_string(),
        }
    }

    /// Create an archive write error with target context.
    pub fn archive(target: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Archive {
            target: target.into(),
            message: message.to_string(),
        }
    }

    /// Create a checkpoint write error with target context.
    pub fn checkpoint_write(target: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::CheckpointWrite {
            target: target.into(),
            message: message.to_string(),
        }
    }
}

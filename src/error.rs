// src/error.rs

//! Unified error handling for the rate planner.
//!
//! The resolution engine itself is total and never produces these; they come
//! from configuration loading, catalog transport and sheet output.

use std::fmt;

use thiserror::Error;

/// Result type alias for rate planner operations.
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

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catalog provider error
    #[error("Catalog error for {channel}: {message}")]
    Catalog { channel: String, message: String },
}

impl AppError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a catalog error for a channel.
    pub fn catalog(channel: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Catalog {
            channel: channel.into(),
            message: message.to_string(),
        }
    }
}

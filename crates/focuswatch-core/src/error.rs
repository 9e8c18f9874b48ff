//! Core error types for focuswatch-core.
//!
//! The engine itself never fails at runtime -- it only ever sees validated
//! inputs. Everything here is about getting a validated configuration
//! snapshot into the engine in the first place.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for focuswatch-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file does not exist
    #[error("Configuration file '{path}' not found")]
    NotFound { path: PathBuf },

    /// Failed to read the configuration file
    #[error("Failed to read configuration from {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid '{key}' value: {message}")]
    InvalidValue { key: &'static str, message: String },

    /// A window pattern regex does not compile
    #[error("Invalid regex in window pattern {index}: {message}")]
    InvalidPattern { index: usize, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

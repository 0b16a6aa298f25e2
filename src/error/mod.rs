//! Error handling module for MarkCut

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Main error type for MarkCut operations outside the domain core
#[derive(Error, Debug)]
pub enum MarkCutError {
    /// Domain rule violation or engine failure
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Invalid configuration value
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Output file write error
    #[error("Failed to write output file {path}: {message}")]
    OutputError { path: String, message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parse error
    #[error("Failed to parse TOML config: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Result type alias for MarkCut operations
pub type MarkCutResult<T> = std::result::Result<T, MarkCutError>;

//! Unified error types for ezjail-reconcile
//!
//! These are fatal errors that abort an invocation before a result exists.
//! Failures of individual jail commands are not errors; they are carried in
//! the reconciliation result (see [`crate::jail::reconcile::Failure`]).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for ezjail-reconcile operations
#[derive(Error, Debug)]
pub enum Error {
    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // Tool errors
    #[error("Failed to find required executable '{0}'")]
    ToolNotFound(String),

    #[error("Failed to execute '{command}': {source}")]
    CommandSpawn { command: String, source: io::Error },

    // Parameter errors
    #[error("Missing required parameter '{param}' for jail '{jail}'")]
    MissingParameter { param: String, jail: String },

    #[error("Invalid value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // Config errors
    #[error("Failed to read config file '{path}': {source}")]
    ConfigRead { path: PathBuf, source: io::Error },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config validation failed: {0}")]
    ConfigValidation(String),

    // Reporting errors
    #[error("Failed to serialize result: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for ezjail-reconcile operations
pub type Result<T> = std::result::Result<T, Error>;

//! Common error types for podplay

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for podplay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across podplay crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Config file exists but is not valid TOML for [`crate::config::TomlConfig`]
    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

//! Error types for podplay-player
//!
//! Playback failures never surface here: they are recorded in the session's
//! `error` field. These errors cover the service around the player.

use thiserror::Error;

/// Main error type for podplay-player
#[derive(Error, Debug)]
pub enum Error {
    /// Shared configuration or input validation errors
    #[error(transparent)]
    Common(#[from] podplay_common::Error),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// The player task has stopped and no longer accepts commands
    #[error("Player task is not running")]
    PlayerClosed,

    /// Invalid request
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience Result type using podplay-player Error
pub type Result<T> = std::result::Result<T, Error>;

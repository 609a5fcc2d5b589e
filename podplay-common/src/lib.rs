//! # Podplay Common Library
//!
//! Shared code for the podplay workspace including:
//! - Track references and playback state types
//! - Event types (PlayerEvent enum) and the EventBus
//! - Configuration loading
//! - Human-readable time formatting

pub mod config;
pub mod error;
pub mod events;
pub mod human_time;
pub mod playback;
pub mod track;

pub use error::{Error, Result};
pub use playback::{PlaybackState, SessionSnapshot, PLAYBACK_RATES};
pub use track::TrackRef;

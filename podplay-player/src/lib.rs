//! # Podplay Player Library (podplay-player)
//!
//! Podcast playback engine: one session, one audio resource, one facade.
//!
//! **Layers:**
//! - [`playback`]: session store, media engine adapter and playback facade
//! - [`audio`]: the headless audio resource and source probing
//! - [`player`]: the player task owning the facade, plus its async handle
//! - [`api`]: HTTP control endpoints and the SSE event stream

pub mod api;
pub mod audio;
pub mod error;
pub mod playback;
pub mod player;
pub mod state;

pub use error::{Error, Result};
pub use player::PlayerHandle;
pub use state::SharedState;

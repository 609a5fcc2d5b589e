//! Playback state and session snapshot types
//!
//! These are plain data. All mutation rules (clamping, mute interaction,
//! loading/error bookkeeping) live in the player's session store.

use crate::track::TrackRef;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Playback rates offered by rate pickers
pub const PLAYBACK_RATES: [f64; 7] = [0.5, 0.75, 1.0, 1.25, 1.5, 1.75, 2.0];

/// The single mutable playback record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Transport intent; not confirmation that audio is actually rendering
    pub is_playing: bool,
    /// Seconds, always within `[0, duration]`
    pub current_time: f64,
    /// Seconds
    pub duration: f64,
    /// 0.0-1.0, kept when muted
    pub volume: f64,
    pub is_muted: bool,
    /// Always > 0
    pub playback_rate: f64,
    /// True between a load request and the resource signalling readiness
    pub is_loading: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PlaybackState {
    /// Volume actually applied to the output: 0 while muted
    pub fn effective_volume(&self) -> f64 {
        if self.is_muted {
            0.0
        } else {
            self.volume
        }
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            volume: 1.0,
            is_muted: false,
            playback_rate: 1.0,
            is_loading: false,
            error: None,
        }
    }
}

/// Owned copy of the whole session
///
/// Observers and API clients only ever see snapshots, never the live session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub current: Option<Arc<TrackRef>>,
    pub playback: PlaybackState,
    pub queue: Vec<Arc<TrackRef>>,
    pub current_index: usize,
    pub is_minimized: bool,
    /// Load generation of `current`; advances on every track load
    pub generation: u64,
}

impl SessionSnapshot {
    /// Episode id of the current track, if any
    pub fn current_episode_id(&self) -> Option<&str> {
        self.current.as_ref().map(|track| track.episode_id())
    }

    /// Queue entry under the current index
    pub fn queued_at_index(&self) -> Option<&Arc<TrackRef>> {
        self.queue.get(self.current_index)
    }
}

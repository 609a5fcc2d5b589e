//! Event types for the podplay event system
//!
//! Every UI surface (full player, mini player, episode cards) renders a
//! projection of the same session. The player publishes one [`PlayerEvent`]
//! per observable change and surfaces subscribe through the [`EventBus`].

use crate::track::TrackRef;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Player event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// Current track replaced (or cleared by a reset)
    TrackChanged {
        track: Option<Arc<TrackRef>>,
        /// Load generation of the new track
        generation: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Transport intent flipped between playing and paused
    PlaybackStateChanged {
        is_playing: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Position moved (time update from the resource or a seek)
    PlaybackProgress {
        current_time: f64,
        duration: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Duration replaced, typically once the resource has probed the source
    DurationChanged {
        duration: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Buffering started or finished
    LoadingChanged {
        is_loading: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Stored volume or mute flag changed
    VolumeChanged {
        volume: f64,
        is_muted: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    PlaybackRateChanged {
        playback_rate: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Error set or cleared (`message` is None when cleared)
    PlaybackError {
        message: Option<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Queue contents or position changed
    QueueChanged {
        episode_ids: Vec<String>,
        current_index: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Mini player toggled
    MinimizedChanged {
        is_minimized: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl PlayerEvent {
    /// Variant name, used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            PlayerEvent::TrackChanged { .. } => "TrackChanged",
            PlayerEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            PlayerEvent::PlaybackProgress { .. } => "PlaybackProgress",
            PlayerEvent::DurationChanged { .. } => "DurationChanged",
            PlayerEvent::LoadingChanged { .. } => "LoadingChanged",
            PlayerEvent::VolumeChanged { .. } => "VolumeChanged",
            PlayerEvent::PlaybackRateChanged { .. } => "PlaybackRateChanged",
            PlayerEvent::PlaybackError { .. } => "PlaybackError",
            PlayerEvent::QueueChanged { .. } => "QueueChanged",
            PlayerEvent::MinimizedChanged { .. } => "MinimizedChanged",
        }
    }
}

/// Broadcast channel for [`PlayerEvent`]s
///
/// Slow subscribers lag and lose the oldest events rather than blocking the
/// player task.
///
/// # Examples
///
/// ```
/// use podplay_common::events::{EventBus, PlayerEvent};
///
/// let bus = EventBus::new(16);
/// let mut rx = bus.subscribe();
///
/// bus.emit_lossy(PlayerEvent::PlaybackStateChanged {
///     is_playing: true,
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(matches!(
///     rx.try_recv().unwrap(),
///     PlayerEvent::PlaybackStateChanged { is_playing: true, .. }
/// ));
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PlayerEvent>,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, returning the number of subscribers that received it
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: PlayerEvent) -> Result<usize, broadcast::error::SendError<PlayerEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring the case of no subscribers
    pub fn emit_lossy(&self, event: PlayerEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

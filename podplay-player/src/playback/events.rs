//! Projection of session transitions onto [`PlayerEvent`]s

use super::session::StateChange;
use chrono::Utc;
use podplay_common::events::PlayerEvent;

/// Events describing what `change` altered, in a stable order
///
/// A no-op transition produces no events.
pub fn events_for_change(change: &StateChange) -> Vec<PlayerEvent> {
    let mut events = Vec::new();
    let after = &change.after;
    let playback = &after.playback;
    let timestamp = Utc::now();

    if change.track_changed() {
        events.push(PlayerEvent::TrackChanged {
            track: after.current.clone(),
            generation: after.generation,
            timestamp,
        });
    }
    if change.duration_changed() {
        events.push(PlayerEvent::DurationChanged {
            duration: playback.duration,
            timestamp,
        });
    }
    if change.loading_changed() {
        events.push(PlayerEvent::LoadingChanged {
            is_loading: playback.is_loading,
            timestamp,
        });
    }
    if change.before.playback.is_playing != playback.is_playing {
        events.push(PlayerEvent::PlaybackStateChanged {
            is_playing: playback.is_playing,
            timestamp,
        });
    }
    if change.time_changed() {
        events.push(PlayerEvent::PlaybackProgress {
            current_time: playback.current_time,
            duration: playback.duration,
            timestamp,
        });
    }
    if change.volume_changed() {
        events.push(PlayerEvent::VolumeChanged {
            volume: playback.volume,
            is_muted: playback.is_muted,
            timestamp,
        });
    }
    if change.rate_changed() {
        events.push(PlayerEvent::PlaybackRateChanged {
            playback_rate: playback.playback_rate,
            timestamp,
        });
    }
    if change.error_changed() {
        events.push(PlayerEvent::PlaybackError {
            message: playback.error.clone(),
            timestamp,
        });
    }
    if change.queue_changed() {
        events.push(PlayerEvent::QueueChanged {
            episode_ids: after
                .queue
                .iter()
                .map(|track| track.episode_id().to_string())
                .collect(),
            current_index: after.current_index,
            timestamp,
        });
    }
    if change.minimized_changed() {
        events.push(PlayerEvent::MinimizedChanged {
            is_minimized: after.is_minimized,
            timestamp,
        });
    }

    events
}

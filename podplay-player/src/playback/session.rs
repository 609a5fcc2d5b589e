//! Session store
//!
//! Owns the single [`SessionSnapshot`] of the player and applies every
//! mutation through [`SessionStore::apply`]. Transitions are pure: the store
//! never touches the audio resource. After each transition all observers are
//! called synchronously, in subscription order, with a [`StateChange`]
//! carrying the state before and after.

use podplay_common::{PlaybackState, SessionSnapshot, TrackRef};
use std::sync::Arc;
use tracing::{debug, warn};

/// Handle returned by [`SessionStore::subscribe`]
pub type SubscriptionId = u64;

type Observer = Box<dyn FnMut(&StateChange) + Send>;

/// A requested state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Replace the current track; starts a new load generation
    LoadTrack(Arc<TrackRef>),
    RequestPlay,
    RequestPause,
    /// Position reported by the resource (or a seek)
    ReportTime(f64),
    /// Duration reported by the resource
    ReportDuration(f64),
    ReportError(String),
    ClearError,
    /// Natural end of the source
    ReportEnded,
    SetVolume(f64),
    SetPlaybackRate(f64),
    ToggleMute,
    SetLoading(bool),
    SetQueue(Vec<Arc<TrackRef>>),
    AddToQueue(Arc<TrackRef>),
    /// Remove every queue entry with this episode id
    RemoveFromQueue(String),
    SetCurrentIndex(usize),
    NextInQueue,
    PreviousInQueue,
    ToggleMinimized,
    /// Back to the initial session; observers stay subscribed
    Reset,
}

/// Result of one transition
#[derive(Debug, Clone)]
pub struct StateChange {
    pub intent: Intent,
    pub before: SessionSnapshot,
    pub after: SessionSnapshot,
}

impl StateChange {
    /// True when the transition left the session untouched
    pub fn is_noop(&self) -> bool {
        self.before == self.after
    }

    /// A new track was loaded, or the current one was cleared
    pub fn track_changed(&self) -> bool {
        self.before.generation != self.after.generation
    }

    pub fn started_playing(&self) -> bool {
        !self.before.playback.is_playing && self.after.playback.is_playing
    }

    pub fn stopped_playing(&self) -> bool {
        self.before.playback.is_playing && !self.after.playback.is_playing
    }

    /// Volume as heard changed (stored volume or mute flag)
    pub fn output_volume_changed(&self) -> bool {
        self.before.playback.effective_volume() != self.after.playback.effective_volume()
    }

    pub fn volume_changed(&self) -> bool {
        self.before.playback.volume != self.after.playback.volume
            || self.before.playback.is_muted != self.after.playback.is_muted
    }

    pub fn rate_changed(&self) -> bool {
        self.before.playback.playback_rate != self.after.playback.playback_rate
    }

    pub fn time_changed(&self) -> bool {
        self.before.playback.current_time != self.after.playback.current_time
    }

    pub fn duration_changed(&self) -> bool {
        self.before.playback.duration != self.after.playback.duration
    }

    pub fn loading_changed(&self) -> bool {
        self.before.playback.is_loading != self.after.playback.is_loading
    }

    pub fn error_changed(&self) -> bool {
        self.before.playback.error != self.after.playback.error
    }

    pub fn queue_changed(&self) -> bool {
        self.before.current_index != self.after.current_index
            || self.before.queue.len() != self.after.queue.len()
            || self
                .before
                .queue
                .iter()
                .zip(&self.after.queue)
                .any(|(a, b)| !Arc::ptr_eq(a, b))
    }

    pub fn minimized_changed(&self) -> bool {
        self.before.is_minimized != self.after.is_minimized
    }
}

/// Holder of the live session and its observers
pub struct SessionStore {
    session: SessionSnapshot,
    /// Playback record restored by [`Intent::Reset`]
    initial: PlaybackState,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: SubscriptionId,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(PlaybackState::default())
    }
}

impl SessionStore {
    /// Create a store whose playback starts from `initial`
    pub fn new(initial: PlaybackState) -> Self {
        Self {
            session: SessionSnapshot {
                playback: initial.clone(),
                ..Default::default()
            },
            initial,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Owned copy of the current session
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.clone()
    }

    /// Read-only view of the current session
    pub fn session(&self) -> &SessionSnapshot {
        &self.session
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.session.playback
    }

    /// Load generation of the current track
    pub fn generation(&self) -> u64 {
        self.session.generation
    }

    /// Register an observer, called after every subsequent transition
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&StateChange) + Send + 'static,
    {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer; returns false if it was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Apply one transition and notify observers
    pub fn apply(&mut self, intent: Intent) -> StateChange {
        let before = self.session.clone();
        self.reduce(&intent);
        let change = StateChange {
            intent,
            before,
            after: self.session.clone(),
        };

        for (_, observer) in self.observers.iter_mut() {
            observer(&change);
        }

        change
    }

    fn reduce(&mut self, intent: &Intent) {
        let session = &mut self.session;
        let playback = &mut session.playback;

        match intent {
            Intent::LoadTrack(track) => {
                session.generation += 1;
                session.current = Some(Arc::clone(track));
                playback.current_time = 0.0;
                playback.duration = track.nominal_duration();
                playback.is_loading = true;
                playback.error = None;
                debug!(
                    "Loaded episode {} (generation {})",
                    track.episode_id(),
                    session.generation
                );
            }
            Intent::RequestPlay => {
                playback.is_playing = true;
                playback.is_loading = false;
                playback.error = None;
            }
            Intent::RequestPause => {
                playback.is_playing = false;
            }
            Intent::ReportTime(time) => {
                if time.is_finite() {
                    playback.current_time = time.max(0.0).min(playback.duration);
                } else {
                    warn!("Ignoring non-finite time update: {}", time);
                }
            }
            Intent::ReportDuration(duration) => {
                if duration.is_finite() && *duration > 0.0 {
                    playback.duration = *duration;
                    playback.current_time = playback.current_time.min(*duration);
                } else {
                    debug!("Ignoring unusable duration: {}", duration);
                }
            }
            Intent::ReportError(message) => {
                playback.error = Some(message.clone());
                playback.is_loading = false;
            }
            Intent::ClearError => {
                playback.error = None;
            }
            Intent::ReportEnded => {
                playback.is_playing = false;
                playback.current_time = 0.0;
            }
            Intent::SetVolume(volume) => {
                if volume.is_finite() {
                    playback.volume = volume.clamp(0.0, 1.0);
                    if *volume > 0.0 {
                        playback.is_muted = false;
                    }
                } else {
                    warn!("Ignoring non-finite volume: {}", volume);
                }
            }
            Intent::SetPlaybackRate(rate) => {
                if rate.is_finite() && *rate > 0.0 {
                    playback.playback_rate = *rate;
                } else {
                    warn!("Ignoring invalid playback rate: {}", rate);
                }
            }
            Intent::ToggleMute => {
                playback.is_muted = !playback.is_muted;
            }
            Intent::SetLoading(loading) => {
                playback.is_loading = *loading;
            }
            Intent::SetQueue(queue) => {
                session.queue = queue.clone();
                session.current_index = 0;
            }
            Intent::AddToQueue(track) => {
                session.queue.push(Arc::clone(track));
            }
            Intent::RemoveFromQueue(episode_id) => {
                let removed_before = session
                    .queue
                    .iter()
                    .take(session.current_index)
                    .filter(|track| track.episode_id() == episode_id)
                    .count();
                session.queue.retain(|track| track.episode_id() != episode_id);
                session.current_index = session
                    .current_index
                    .saturating_sub(removed_before)
                    .min(session.queue.len().saturating_sub(1));
            }
            Intent::SetCurrentIndex(index) => {
                if *index < session.queue.len() {
                    session.current_index = *index;
                } else {
                    debug!(
                        "Ignoring queue index {} (queue length {})",
                        index,
                        session.queue.len()
                    );
                }
            }
            Intent::NextInQueue => {
                if session.current_index + 1 < session.queue.len() {
                    session.current_index += 1;
                }
            }
            Intent::PreviousInQueue => {
                session.current_index = session.current_index.saturating_sub(1);
            }
            Intent::ToggleMinimized => {
                session.is_minimized = !session.is_minimized;
            }
            Intent::Reset => {
                // Generation keeps counting so callbacks from the old source stay stale
                let generation = session.generation + 1;
                *session = SessionSnapshot {
                    playback: self.initial.clone(),
                    generation,
                    ..Default::default()
                };
            }
        }
    }
}

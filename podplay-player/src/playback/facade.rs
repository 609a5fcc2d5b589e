//! Playback facade
//!
//! The one entry point UI surfaces use. Every operation becomes one or more
//! [`Intent`]s applied through [`PlaybackFacade::dispatch`], which drains a
//! FIFO: each transition is applied to the store (notifying observers), then
//! reconciled against the resource, and any follow-up intents the adapter
//! returns are queued behind it. Observers therefore always see transitions
//! in the order they happened, even when a failed start immediately reverts
//! an optimistic play.

use super::adapter::MediaEngineAdapter;
use super::resource::ResourceEvent;
use super::session::{Intent, SessionStore, StateChange, SubscriptionId};
use podplay_common::config::PlayerConfig;
use podplay_common::{PlaybackState, SessionSnapshot, TrackRef};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default skip step in seconds
pub const DEFAULT_SKIP_SECONDS: f64 = 15.0;

pub struct PlaybackFacade {
    store: SessionStore,
    adapter: MediaEngineAdapter,
    skip_seconds: f64,
    autoplay: bool,
}

impl PlaybackFacade {
    pub fn new(store: SessionStore, adapter: MediaEngineAdapter) -> Self {
        Self {
            store,
            adapter,
            skip_seconds: DEFAULT_SKIP_SECONDS,
            autoplay: false,
        }
    }

    /// Facade whose initial volume, rate, skip step and autoplay come from `config`
    pub fn from_config(config: &PlayerConfig, adapter: MediaEngineAdapter) -> Self {
        let initial = PlaybackState {
            volume: config.initial_volume,
            playback_rate: config.initial_playback_rate,
            ..Default::default()
        };
        let mut facade = Self::new(SessionStore::new(initial), adapter);
        facade.skip_seconds = config.skip_seconds;
        facade.autoplay = config.autoplay;
        facade
    }

    pub fn set_autoplay(&mut self, autoplay: bool) {
        self.autoplay = autoplay;
    }

    pub fn autoplay(&self) -> bool {
        self.autoplay
    }

    /// Configured step for skip controls
    pub fn skip_seconds(&self) -> f64 {
        self.skip_seconds
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Owned copy of the session
    pub fn snapshot(&self) -> SessionSnapshot {
        self.store.snapshot()
    }

    pub fn session(&self) -> &SessionSnapshot {
        self.store.session()
    }

    pub fn playback(&self) -> &PlaybackState {
        self.store.playback()
    }

    /// Volume actually applied to the output
    pub fn effective_volume(&self) -> f64 {
        self.store.playback().effective_volume()
    }

    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&StateChange) + Send + 'static,
    {
        self.store.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    // ------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------

    /// Load `track` and start it
    pub fn play_track(&mut self, track: Arc<TrackRef>) {
        info!("Playing episode {}", track.episode_id());
        self.dispatch_all([Intent::LoadTrack(track), Intent::RequestPlay]);
    }

    /// Resume the current track; ignored when nothing is loaded
    pub fn play(&mut self) {
        if self.store.session().current.is_none() {
            debug!("Ignoring play: no track loaded");
            return;
        }
        self.dispatch(Intent::RequestPlay);
    }

    pub fn pause(&mut self) {
        self.dispatch(Intent::RequestPause);
    }

    pub fn toggle_play_pause(&mut self) {
        if self.store.playback().is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Move to `position`, clamped to `[0, duration]`
    ///
    /// Ignored when no track is loaded or the position is not finite.
    pub fn seek(&mut self, position: f64) {
        let session = self.store.snapshot();
        if session.current.is_none() {
            debug!("Ignoring seek: no track loaded");
            return;
        }
        if !position.is_finite() {
            warn!("Ignoring seek to non-finite position {}", position);
            return;
        }

        let clamped = position.max(0.0).min(session.playback.duration);
        self.adapter.seek(&session, clamped);
        self.dispatch(Intent::ReportTime(clamped));
    }

    /// Seek `seconds` ahead of the current position
    pub fn skip_forward(&mut self, seconds: f64) {
        let target = self.store.playback().current_time + seconds;
        self.seek(target);
    }

    /// Seek `seconds` behind the current position
    pub fn skip_backward(&mut self, seconds: f64) {
        let target = self.store.playback().current_time - seconds;
        self.seek(target);
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    pub fn set_volume(&mut self, volume: f64) {
        self.dispatch(Intent::SetVolume(volume));
    }

    pub fn set_playback_rate(&mut self, rate: f64) {
        self.dispatch(Intent::SetPlaybackRate(rate));
    }

    pub fn toggle_mute(&mut self) {
        self.dispatch(Intent::ToggleMute);
    }

    pub fn clear_error(&mut self) {
        self.dispatch(Intent::ClearError);
    }

    pub fn toggle_minimized(&mut self) {
        self.dispatch(Intent::ToggleMinimized);
    }

    /// Stop, drop the current track and queue, restore initial output settings
    pub fn reset(&mut self) {
        self.dispatch(Intent::Reset);
    }

    // ------------------------------------------------------------------
    // Queue
    // ------------------------------------------------------------------

    pub fn set_queue(&mut self, queue: Vec<Arc<TrackRef>>) {
        self.dispatch(Intent::SetQueue(queue));
    }

    pub fn enqueue(&mut self, track: Arc<TrackRef>) {
        self.dispatch(Intent::AddToQueue(track));
    }

    pub fn dequeue(&mut self, episode_id: &str) {
        self.dispatch(Intent::RemoveFromQueue(episode_id.to_string()));
    }

    /// Advance the queue and play the entry; false at the end of the queue
    pub fn play_next(&mut self) -> bool {
        let session = self.store.session();
        let Some(track) = session.queue.get(session.current_index + 1).cloned() else {
            debug!("No next queue entry");
            return false;
        };
        self.dispatch(Intent::NextInQueue);
        self.play_track(track);
        true
    }

    /// Step back in the queue and play the entry; false at the start
    pub fn play_previous(&mut self) -> bool {
        let session = self.store.session();
        let Some(track) = session
            .current_index
            .checked_sub(1)
            .and_then(|index| session.queue.get(index))
            .cloned()
        else {
            debug!("No previous queue entry");
            return false;
        };
        self.dispatch(Intent::PreviousInQueue);
        self.play_track(track);
        true
    }

    /// Jump to queue entry `index` and play it; false when out of range
    pub fn play_queue_index(&mut self, index: usize) -> bool {
        let Some(track) = self.store.session().queue.get(index).cloned() else {
            debug!("Queue index {} out of range", index);
            return false;
        };
        self.dispatch(Intent::SetCurrentIndex(index));
        self.play_track(track);
        true
    }

    // ------------------------------------------------------------------
    // Resource notifications
    // ------------------------------------------------------------------

    /// Feed one resource notification back into the session
    pub fn handle_resource_event(&mut self, event: ResourceEvent) {
        let intents = self.adapter.translate(event, self.store.session());
        let ended = intents.contains(&Intent::ReportEnded);
        self.dispatch_all(intents);

        if ended && self.autoplay {
            if self.play_next() {
                info!("Autoplay advanced to the next queue entry");
            } else {
                debug!("Autoplay: queue finished");
            }
        }
    }

    /// Pause and release the audio source
    pub fn shutdown(&mut self) {
        self.adapter.shutdown();
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Apply one intent plus any follow-ups it triggers
    pub fn dispatch(&mut self, intent: Intent) {
        self.dispatch_all([intent]);
    }

    fn dispatch_all(&mut self, intents: impl IntoIterator<Item = Intent>) {
        let mut pending: VecDeque<Intent> = intents.into_iter().collect();
        while let Some(intent) = pending.pop_front() {
            let change = self.store.apply(intent);
            pending.extend(self.adapter.reconcile(&change));
        }
    }
}

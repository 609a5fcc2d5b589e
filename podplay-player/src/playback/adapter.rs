//! Media engine adapter
//!
//! Keeps the audio resource in step with the session. Two directions:
//! - [`MediaEngineAdapter::reconcile`] drives the resource from a
//!   [`StateChange`] and returns follow-up intents (e.g. a failed start)
//! - [`MediaEngineAdapter::translate`] maps a [`ResourceEvent`] into intents,
//!   discarding events from a replaced source
//!
//! The adapter never mutates the session itself; the facade applies the
//! returned intents in order.

use super::resource::{AudioResource, LoadToken, ResourceEvent, ResourceEventKind};
use super::session::{Intent, StateChange};
use podplay_common::SessionSnapshot;
use tracing::{debug, info, warn};

/// Builds the resource on first use
pub type ResourceFactory = Box<dyn FnMut() -> Box<dyn AudioResource> + Send>;

pub struct MediaEngineAdapter {
    factory: ResourceFactory,
    resource: Option<Box<dyn AudioResource>>,
}

impl MediaEngineAdapter {
    pub fn new<F>(factory: F) -> Self
    where
        F: FnMut() -> Box<dyn AudioResource> + Send + 'static,
    {
        Self {
            factory: Box::new(factory),
            resource: None,
        }
    }

    /// True once the resource has been created
    pub fn is_initialized(&self) -> bool {
        self.resource.is_some()
    }

    /// Resource for `session`, created on first use with its volume and rate
    fn resource(&mut self, session: &SessionSnapshot) -> &mut dyn AudioResource {
        let factory = &mut self.factory;
        let resource = self.resource.get_or_insert_with(|| {
            debug!("Creating audio resource");
            let mut resource = factory();
            resource.set_volume(session.playback.effective_volume());
            resource.set_playback_rate(session.playback.playback_rate);
            resource
        });
        &mut **resource
    }

    /// Apply the side effects of one transition to the resource
    ///
    /// Returns intents to apply next, in order.
    pub fn reconcile(&mut self, change: &StateChange) -> Vec<Intent> {
        let mut follow_ups = Vec::new();
        let after = &change.after;
        let playback = &after.playback;

        let track_changed = change.track_changed();
        let wants_start = after.current.is_some()
            && (change.started_playing() || (track_changed && playback.is_playing));

        if !(track_changed
            || wants_start
            || change.stopped_playing()
            || change.output_volume_changed()
            || change.rate_changed())
        {
            return follow_ups;
        }

        let resource = self.resource(&change.before);

        if track_changed {
            match &after.current {
                Some(track) => {
                    info!(
                        "Loading episode {} from {}",
                        track.episode_id(),
                        track.audio_url()
                    );
                    resource.set_source(
                        track.audio_url(),
                        track.nominal_duration(),
                        LoadToken(after.generation),
                    );
                }
                None => {
                    debug!("Clearing audio source");
                    resource.clear_source();
                }
            }
        }

        if change.output_volume_changed() {
            resource.set_volume(playback.effective_volume());
        }
        if change.rate_changed() {
            resource.set_playback_rate(playback.playback_rate);
        }

        if wants_start {
            if let Err(e) = resource.play() {
                warn!("Failed to start playback: {}", e);
                // Pause first so no observed state is both playing and failed
                follow_ups.push(Intent::RequestPause);
                follow_ups.push(Intent::ReportError(e.to_string()));
            }
        } else if change.stopped_playing() {
            resource.pause();
        }

        follow_ups
    }

    /// Forward a seek to the resource
    pub fn seek(&mut self, session: &SessionSnapshot, position: f64) {
        self.resource(session).seek(position);
    }

    /// Map a resource notification onto intents
    ///
    /// Events whose token does not match the current load generation are
    /// dropped. A resource error also pauses, so the transport intent never
    /// claims playback of a failed source.
    pub fn translate(&self, event: ResourceEvent, session: &SessionSnapshot) -> Vec<Intent> {
        if session.current.is_none() || event.token.generation() != session.generation {
            debug!(
                "Discarding stale {} event from {} (current generation {})",
                event.kind.name(),
                event.token,
                session.generation
            );
            return Vec::new();
        }

        match event.kind {
            ResourceEventKind::LoadStart => vec![Intent::SetLoading(true)],
            ResourceEventKind::CanPlay => vec![Intent::SetLoading(false)],
            ResourceEventKind::TimeUpdate(time) => vec![Intent::ReportTime(time)],
            ResourceEventKind::DurationChange(duration) => vec![Intent::ReportDuration(duration)],
            ResourceEventKind::Ended => vec![Intent::ReportEnded],
            ResourceEventKind::Error(message) => {
                warn!("Audio resource error: {}", message);
                vec![Intent::RequestPause, Intent::ReportError(message)]
            }
        }
    }

    /// Release the current source, if a resource exists
    pub fn shutdown(&mut self) {
        if let Some(resource) = self.resource.as_mut() {
            resource.pause();
            resource.clear_source();
        }
    }
}

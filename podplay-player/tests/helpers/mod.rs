//! Test helpers for podplay-player integration tests
//!
//! Provides:
//! - RecordingResource: an AudioResource that records every call and can be
//!   told to refuse `play`
//! - ResourceProbe: shared handle onto what the resource recorded
//! - Track and facade builders

#![allow(dead_code)]

use podplay_common::TrackRef;
use podplay_player::playback::{
    AudioResource, LoadToken, MediaEngineAdapter, PlaybackFacade, ResourceError, ResourceEvent,
    ResourceEventKind, SessionStore,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One recorded resource call
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceOp {
    SetSource(String, LoadToken),
    ClearSource,
    Play,
    Pause,
    Seek(f64),
    SetVolume(f64),
    SetPlaybackRate(f64),
}

/// Shared view of every RecordingResource built from it
#[derive(Clone, Default)]
pub struct ResourceProbe {
    ops: Arc<Mutex<Vec<ResourceOp>>>,
    play_failure: Arc<Mutex<Option<ResourceError>>>,
    created: Arc<AtomicUsize>,
}

impl ResourceProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> Vec<ResourceOp> {
        self.ops.lock().unwrap().clone()
    }

    pub fn clear_ops(&self) {
        self.ops.lock().unwrap().clear();
    }

    /// Make subsequent `play` calls fail with `error` (None to succeed again)
    pub fn fail_play_with(&self, error: Option<ResourceError>) {
        *self.play_failure.lock().unwrap() = error;
    }

    /// Number of resources the factory has built
    pub fn creations(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn last_volume(&self) -> Option<f64> {
        self.ops().into_iter().rev().find_map(|op| match op {
            ResourceOp::SetVolume(volume) => Some(volume),
            _ => None,
        })
    }

    pub fn last_rate(&self) -> Option<f64> {
        self.ops().into_iter().rev().find_map(|op| match op {
            ResourceOp::SetPlaybackRate(rate) => Some(rate),
            _ => None,
        })
    }

    pub fn sources(&self) -> Vec<(String, LoadToken)> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                ResourceOp::SetSource(locator, token) => Some((locator, token)),
                _ => None,
            })
            .collect()
    }

    pub fn build(&self) -> Box<dyn AudioResource> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Box::new(RecordingResource {
            probe: self.clone(),
        })
    }

    fn record(&self, op: ResourceOp) {
        self.ops.lock().unwrap().push(op);
    }
}

pub struct RecordingResource {
    probe: ResourceProbe,
}

impl AudioResource for RecordingResource {
    fn set_source(&mut self, locator: &str, _nominal_duration: f64, token: LoadToken) {
        self.probe.record(ResourceOp::SetSource(locator.to_string(), token));
    }

    fn clear_source(&mut self) {
        self.probe.record(ResourceOp::ClearSource);
    }

    fn play(&mut self) -> Result<(), ResourceError> {
        self.probe.record(ResourceOp::Play);
        match self.probe.play_failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn pause(&mut self) {
        self.probe.record(ResourceOp::Pause);
    }

    fn seek(&mut self, position: f64) {
        self.probe.record(ResourceOp::Seek(position));
    }

    fn set_volume(&mut self, volume: f64) {
        self.probe.record(ResourceOp::SetVolume(volume));
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.probe.record(ResourceOp::SetPlaybackRate(rate));
    }
}

pub fn track(episode_id: &str, duration: f64) -> Arc<TrackRef> {
    Arc::new(
        TrackRef::new(
            episode_id,
            "podcast-1",
            format!("https://cdn.example/{}.mp3", episode_id),
            duration,
        )
        .with_titles(format!("Episode {}", episode_id), "Test Podcast"),
    )
}

/// Facade backed by a RecordingResource
pub fn facade_with(probe: &ResourceProbe) -> PlaybackFacade {
    let probe = probe.clone();
    PlaybackFacade::new(
        SessionStore::default(),
        MediaEngineAdapter::new(move || probe.build()),
    )
}

/// Deliver a synthetic resource notification for the given load generation
pub fn emit(facade: &mut PlaybackFacade, generation: u64, kind: ResourceEventKind) {
    facade.handle_resource_event(ResourceEvent::new(LoadToken(generation), kind));
}

//! Headless audio resource
//!
//! An [`AudioResource`] with no output device. It validates each source with
//! [`probe_source`] and runs a playback clock that raises the same
//! notifications a real media element would: `TimeUpdate` while playing and
//! `Ended` once the clock reaches the end of the source. The end is the
//! probed duration, or the episode's nominal duration when the source does not
//! report one (remote sources, containers without a frame count).
//!
//! Background work runs on tokio tasks, so the resource must be used from
//! inside a tokio runtime. Every notification is stamped with the token of
//! the source that produced it and sent on an unbounded channel.

use super::probe::probe_source;
use crate::playback::{AudioResource, LoadToken, ResourceError, ResourceEvent, ResourceEventKind};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
enum SourceStatus {
    Probing,
    Ready,
    Failed(String),
}

/// State shared between the resource and its background tasks
#[derive(Debug)]
struct Clock {
    token: Option<LoadToken>,
    status: SourceStatus,
    position: f64,
    /// Reported by the probe
    duration: Option<f64>,
    /// Recorded for the episode; used when the probe reports nothing
    nominal: Option<f64>,
    rate: f64,
    volume: f64,
    playing: bool,
}

impl Default for Clock {
    fn default() -> Self {
        Self {
            token: None,
            status: SourceStatus::Probing,
            position: 0.0,
            duration: None,
            nominal: None,
            rate: 1.0,
            volume: 1.0,
            playing: false,
        }
    }
}

impl Clock {
    /// Position at which playback ends, if known
    fn end(&self) -> Option<f64> {
        self.duration.or(self.nominal)
    }

    /// Advance by `elapsed` wall time; returns the notifications to raise
    fn advance(&mut self, elapsed: Duration) -> Vec<ResourceEventKind> {
        if !self.playing || self.status != SourceStatus::Ready {
            return Vec::new();
        }

        self.position += elapsed.as_secs_f64() * self.rate;
        match self.end() {
            Some(end) if self.position >= end => {
                self.position = end;
                self.playing = false;
                vec![ResourceEventKind::TimeUpdate(end), ResourceEventKind::Ended]
            }
            _ => vec![ResourceEventKind::TimeUpdate(self.position)],
        }
    }
}

pub struct HeadlessResource {
    clock: Arc<Mutex<Clock>>,
    events: mpsc::UnboundedSender<ResourceEvent>,
    http: reqwest::Client,
    progress_interval: Duration,
    probe_task: Option<JoinHandle<()>>,
    tick_task: Option<JoinHandle<()>>,
}

impl HeadlessResource {
    pub fn new(events: mpsc::UnboundedSender<ResourceEvent>, progress_interval: Duration) -> Self {
        Self {
            clock: Arc::new(Mutex::new(Clock::default())),
            events,
            http: reqwest::Client::new(),
            progress_interval,
            probe_task: None,
            tick_task: None,
        }
    }

    /// Current clock position in seconds
    pub fn position(&self) -> f64 {
        lock(&self.clock).position
    }

    /// Last volume applied
    pub fn volume(&self) -> f64 {
        lock(&self.clock).volume
    }

    pub fn is_playing(&self) -> bool {
        lock(&self.clock).playing
    }

    fn stop_tasks(&mut self) {
        if let Some(task) = self.probe_task.take() {
            task.abort();
        }
        self.stop_ticking();
    }

    fn stop_ticking(&mut self) {
        if let Some(task) = self.tick_task.take() {
            task.abort();
        }
    }

    fn start_ticking(&mut self) {
        if self.tick_task.as_ref().is_some_and(|task| !task.is_finished()) {
            return;
        }

        let clock = Arc::clone(&self.clock);
        let events = self.events.clone();
        let period = self.progress_interval;

        self.tick_task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last = Instant::now();

            loop {
                ticker.tick().await;
                let now = Instant::now();
                let elapsed = now - last;
                last = now;

                let (token, kinds, playing) = {
                    let mut clock = lock(&clock);
                    let kinds = clock.advance(elapsed);
                    (clock.token, kinds, clock.playing)
                };

                if let Some(token) = token {
                    for kind in kinds {
                        if events.send(ResourceEvent::new(token, kind)).is_err() {
                            return;
                        }
                    }
                }
                if !playing {
                    return;
                }
            }
        }));
    }
}

impl AudioResource for HeadlessResource {
    fn set_source(&mut self, locator: &str, nominal_duration: f64, token: LoadToken) {
        self.stop_tasks();
        {
            let mut clock = lock(&self.clock);
            clock.token = Some(token);
            clock.status = SourceStatus::Probing;
            clock.position = 0.0;
            clock.duration = None;
            clock.nominal = (nominal_duration.is_finite() && nominal_duration > 0.0)
                .then_some(nominal_duration);
            clock.playing = false;
        }
        let _ = self
            .events
            .send(ResourceEvent::new(token, ResourceEventKind::LoadStart));

        let clock = Arc::clone(&self.clock);
        let events = self.events.clone();
        let http = self.http.clone();
        let locator = locator.to_string();

        self.probe_task = Some(tokio::spawn(async move {
            let outcome = probe_source(&http, &locator).await;

            let kinds = {
                let mut clock = lock(&clock);
                if clock.token != Some(token) {
                    debug!("Probe of {} superseded", locator);
                    return;
                }
                match outcome {
                    Ok(duration) => {
                        clock.status = SourceStatus::Ready;
                        clock.duration = duration;
                        let mut kinds = Vec::new();
                        if let Some(duration) = duration {
                            kinds.push(ResourceEventKind::DurationChange(duration));
                        }
                        kinds.push(ResourceEventKind::CanPlay);
                        kinds
                    }
                    Err(e) => {
                        warn!("Source {} failed: {}", locator, e);
                        let message = e.to_string();
                        clock.status = SourceStatus::Failed(message.clone());
                        clock.playing = false;
                        vec![ResourceEventKind::Error(message)]
                    }
                }
            };

            for kind in kinds {
                let _ = events.send(ResourceEvent::new(token, kind));
            }
        }));
    }

    fn clear_source(&mut self) {
        self.stop_tasks();
        let mut clock = lock(&self.clock);
        clock.token = None;
        clock.status = SourceStatus::Probing;
        clock.position = 0.0;
        clock.duration = None;
        clock.nominal = None;
        clock.playing = false;
    }

    fn play(&mut self) -> Result<(), ResourceError> {
        {
            let mut clock = lock(&self.clock);
            if clock.token.is_none() {
                return Err(ResourceError::NoSource);
            }
            if let SourceStatus::Failed(message) = &clock.status {
                return Err(ResourceError::SourceFailed(message.clone()));
            }
            // A finished source starts over
            if clock.end().is_some_and(|end| clock.position >= end) {
                clock.position = 0.0;
            }
            clock.playing = true;
        }
        self.start_ticking();
        Ok(())
    }

    fn pause(&mut self) {
        self.stop_ticking();
        lock(&self.clock).playing = false;
    }

    fn seek(&mut self, position: f64) {
        let mut clock = lock(&self.clock);
        clock.position = match clock.end() {
            Some(end) => position.clamp(0.0, end),
            None => position.max(0.0),
        };
    }

    fn set_volume(&mut self, volume: f64) {
        debug!("Headless output volume {:.2}", volume);
        lock(&self.clock).volume = volume;
    }

    fn set_playback_rate(&mut self, rate: f64) {
        lock(&self.clock).rate = rate;
    }
}

impl Drop for HeadlessResource {
    fn drop(&mut self) {
        self.stop_tasks();
    }
}

fn lock(clock: &Mutex<Clock>) -> MutexGuard<'_, Clock> {
    clock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

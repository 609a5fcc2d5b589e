//! Audio resource abstraction
//!
//! The [`AudioResource`] trait is the seam between playback orchestration and
//! whatever actually renders sound. Commands flow into the resource through
//! the trait; notifications flow back as [`ResourceEvent`]s tagged with the
//! [`LoadToken`] of the source that produced them.

use std::fmt;
use thiserror::Error;

/// Identifies one `set_source` call
///
/// Wraps the session's load generation. Events carrying a token other than
/// the current generation belong to a replaced source and are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadToken(pub u64);

impl LoadToken {
    pub fn generation(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LoadToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "load#{}", self.0)
    }
}

/// Notification kinds a resource can raise
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceEventKind {
    LoadStart,
    CanPlay,
    /// Position in seconds
    TimeUpdate(f64),
    /// Duration in seconds
    DurationChange(f64),
    Error(String),
    Ended,
}

impl ResourceEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            ResourceEventKind::LoadStart => "loadstart",
            ResourceEventKind::CanPlay => "canplay",
            ResourceEventKind::TimeUpdate(_) => "timeupdate",
            ResourceEventKind::DurationChange(_) => "durationchange",
            ResourceEventKind::Error(_) => "error",
            ResourceEventKind::Ended => "ended",
        }
    }
}

/// A notification from the resource
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceEvent {
    pub token: LoadToken,
    pub kind: ResourceEventKind,
}

impl ResourceEvent {
    pub fn new(token: LoadToken, kind: ResourceEventKind) -> Self {
        Self { token, kind }
    }
}

/// Failures raised by resource operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// Playback start refused (e.g. output not permitted to start)
    #[error("Playback start denied: {0}")]
    StartDenied(String),

    /// `play` called before any source was set
    #[error("No audio source loaded")]
    NoSource,

    /// The current source failed to load earlier
    #[error("Audio source failed: {0}")]
    SourceFailed(String),

    /// Container or codec not supported
    #[error("Unsupported audio format: {0}")]
    Decode(String),

    /// Remote source unreachable
    #[error("Network error: {0}")]
    Network(String),
}

/// Control surface of the single media resource
///
/// Volume and playback rate persist across `set_source` calls. Notifications
/// are delivered asynchronously on a channel supplied at construction, never
/// from inside these calls.
pub trait AudioResource: Send {
    /// Start loading `locator`; later events carry `token`
    ///
    /// `nominal_duration` is the length recorded for the episode. It bounds
    /// playback when the source itself never reports a duration.
    fn set_source(&mut self, locator: &str, nominal_duration: f64, token: LoadToken);

    /// Drop the current source and stop any pending notifications
    fn clear_source(&mut self);

    /// Begin or resume rendering
    fn play(&mut self) -> Result<(), ResourceError>;

    fn pause(&mut self);

    /// Move the position; `position` is already clamped to the duration
    fn seek(&mut self, position: f64);

    /// Effective output volume, 0.0-1.0
    fn set_volume(&mut self, volume: f64);

    fn set_playback_rate(&mut self, rate: f64);
}

impl<R: AudioResource + ?Sized> AudioResource for Box<R> {
    fn set_source(&mut self, locator: &str, nominal_duration: f64, token: LoadToken) {
        (**self).set_source(locator, nominal_duration, token)
    }

    fn clear_source(&mut self) {
        (**self).clear_source()
    }

    fn play(&mut self) -> Result<(), ResourceError> {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn seek(&mut self, position: f64) {
        (**self).seek(position)
    }

    fn set_volume(&mut self, volume: f64) {
        (**self).set_volume(volume)
    }

    fn set_playback_rate(&mut self, rate: f64) {
        (**self).set_playback_rate(rate)
    }
}

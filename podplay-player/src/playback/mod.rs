//! Playback orchestration
//!
//! - [`session`]: the session store and its pure transitions
//! - [`resource`]: the audio resource seam
//! - [`adapter`]: keeps the resource in step with the session
//! - [`facade`]: public operations used by UI surfaces and the HTTP API
//! - [`events`]: projection of transitions onto broadcast events

pub mod adapter;
pub mod events;
pub mod facade;
pub mod resource;
pub mod session;

pub use adapter::{MediaEngineAdapter, ResourceFactory};
pub use facade::PlaybackFacade;
pub use resource::{AudioResource, LoadToken, ResourceError, ResourceEvent, ResourceEventKind};
pub use session::{Intent, SessionStore, StateChange, SubscriptionId};

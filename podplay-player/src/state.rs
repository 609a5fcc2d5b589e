//! Shared player state
//!
//! Read-only view of the session for components outside the player task.
//! The player task is the only writer: an observer on the session store
//! mirrors every transition here and broadcasts the matching events.

use crate::playback::events::events_for_change;
use crate::playback::StateChange;
use podplay_common::events::{EventBus, PlayerEvent};
use podplay_common::SessionSnapshot;
use std::sync::{PoisonError, RwLock};
use tokio::sync::broadcast;
use tracing::trace;

/// Shared state accessible by all components
///
/// Uses a std RwLock: writes happen inside synchronous observers on the
/// player task, reads are short copies from API handlers.
pub struct SharedState {
    snapshot: RwLock<SessionSnapshot>,
    events: EventBus,
}

impl SharedState {
    pub fn new(initial: SessionSnapshot, event_capacity: usize) -> Self {
        Self {
            snapshot: RwLock::new(initial),
            events: EventBus::new(event_capacity),
        }
    }

    /// Latest session snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Record a transition and broadcast its events
    pub fn publish(&self, change: &StateChange) {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = change.after.clone();

        for event in events_for_change(change) {
            trace!("Broadcasting {}", event.event_type());
            self.events.emit_lossy(event);
        }
    }

    /// Subscribe to event stream for SSE
    pub fn subscribe_events(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.subscriber_count()
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(SessionSnapshot::default(), 100)
    }
}

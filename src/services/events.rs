//! Coordinator events for the view layer.
//!
//! Published when a bug's submit control changes state or its cached
//! timeline is replaced, so every view of the bug can react.

use serde::Serialize;
use tokio::sync::broadcast;

/// Event: submit-state-changed
/// Emitted when a submission for a bug starts or finishes.
pub const SUBMIT_STATE_CHANGED_EVENT: &str = "submit-state-changed";

/// Event: timeline-replaced
/// Emitted when the cached projection of a bug is replaced by a refresh.
pub const TIMELINE_REPLACED_EVENT: &str = "timeline-replaced";

/// Capacity of the broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Event published by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum CoordinatorEvent {
    SubmitStateChanged(SubmitStatePayload),
    TimelineReplaced(TimelineReplacedPayload),
}

impl CoordinatorEvent {
    /// Event name for the view layer.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SubmitStateChanged(_) => SUBMIT_STATE_CHANGED_EVENT,
            Self::TimelineReplaced(_) => TIMELINE_REPLACED_EVENT,
        }
    }
}

/// Payload for submit-state-changed events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitStatePayload {
    /// The bug whose submit control changed.
    pub bug_id: String,

    /// Whether a submission is outstanding (control disabled).
    pub in_flight: bool,
}

/// Payload for timeline-replaced events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineReplacedPayload {
    /// The bug that was refreshed.
    pub bug_id: String,

    /// Number of entries in the new timeline.
    pub entry_count: usize,
}

/// Broadcast channel for coordinator events.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoordinatorEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create an event bus with no subscribers.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Subscribe to future events.
    pub fn subscribe(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.sender.subscribe()
    }

    /// Publish an event; having no subscribers is not an error.
    pub fn emit(&self, event: CoordinatorEvent) {
        log::trace!("[events] {}", event.name());
        let _ = self.sender.send(event);
    }

    pub(crate) fn submit_state(&self, bug_id: &str, in_flight: bool) {
        self.emit(CoordinatorEvent::SubmitStateChanged(SubmitStatePayload {
            bug_id: bug_id.to_string(),
            in_flight,
        }));
    }

    pub(crate) fn timeline_replaced(&self, bug_id: &str, entry_count: usize) {
        self.emit(CoordinatorEvent::TimelineReplaced(TimelineReplacedPayload {
            bug_id: bug_id.to_string(),
            entry_count,
        }));
    }
}

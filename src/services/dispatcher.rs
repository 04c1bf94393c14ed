//! Mutation dispatcher for the bug page.
//!
//! Runs one mutation against the backend, then refreshes the bug's timeline,
//! and only reports success once both steps are done. At most one submission
//! per bug is outstanding; a second one is rejected, not queued.

use crate::error::AppError;
use crate::models::{Bug, TransitionAction};
use crate::services::backend::BugBackend;
use crate::services::events::{CoordinatorEvent, EventBus};
use crate::services::timeline_sync::{TimelineSync, TimelineSyncConfig};
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use tokio::sync::broadcast;

/// A mutation the dispatcher can issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Status change, optionally with a comment.
    Transition(TransitionAction),

    /// Comment without a status change.
    AddComment(String),

    /// New message for an existing timeline entry.
    EditComment { target: String, message: String },
}

impl Mutation {
    /// Operation name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Transition(TransitionAction::Close) => "closeBug",
            Self::Transition(TransitionAction::Reopen) => "reopenBug",
            Self::Transition(TransitionAction::CloseWithComment(_)) => "closeBugWithComment",
            Self::Transition(TransitionAction::ReopenWithComment(_)) => "reopenBugWithComment",
            Self::AddComment(_) => "addComment",
            Self::EditComment { .. } => "editComment",
        }
    }

    /// Message text carried by the mutation, if any.
    fn message(&self) -> Option<&str> {
        match self {
            Self::Transition(action) => action.comment(),
            Self::AddComment(message) | Self::EditComment { message, .. } => Some(message),
        }
    }
}

/// Marks a bug as busy until dropped.
struct InFlightGuard<'a> {
    in_flight: &'a Mutex<HashSet<String>>,
    events: &'a EventBus,
    bug_id: String,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(
        in_flight: &'a Mutex<HashSet<String>>,
        events: &'a EventBus,
        bug_id: &str,
    ) -> Option<Self> {
        let inserted = in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(bug_id.to_string());

        if !inserted {
            return None;
        }

        events.submit_state(bug_id, true);
        Some(Self {
            in_flight,
            events,
            bug_id: bug_id.to_string(),
        })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.bug_id);
        self.events.submit_state(&self.bug_id, false);
    }
}

/// Issues mutations and keeps the cached timelines in step with the backend.
#[derive(Debug)]
pub struct MutationDispatcher<B> {
    backend: B,
    sync: TimelineSync,
    events: EventBus,
    in_flight: Mutex<HashSet<String>>,
}

impl<B: BugBackend> MutationDispatcher<B> {
    /// Create a dispatcher over a backend.
    pub fn new(backend: B, config: TimelineSyncConfig) -> Self {
        let events = EventBus::new();
        Self {
            backend,
            sync: TimelineSync::new(config, events.clone()),
            events,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// The backend mutations are sent to.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Timeline sync and its cache.
    pub fn timeline_sync(&self) -> &TimelineSync {
        &self.sync
    }

    /// Subscribe to submit-state and timeline events.
    pub fn subscribe(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.events.subscribe()
    }

    /// Whether a submission for the bug is outstanding (submit control disabled).
    pub fn is_in_flight(&self, bug_id: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(bug_id)
    }

    /// Load the bug for display.
    ///
    /// Not guarded by single-flight; a load overtaken by a submission's
    /// refresh returns the newer projection.
    pub async fn load(&self, bug_id: &str) -> Result<Bug, AppError> {
        self.sync.resync(&self.backend, bug_id).await
    }

    /// Apply a status transition.
    pub async fn submit(&self, bug_id: &str, action: &TransitionAction) -> Result<Bug, AppError> {
        self.dispatch(bug_id, Mutation::Transition(action.clone()))
            .await
    }

    /// Add a comment without changing the status.
    pub async fn submit_comment(&self, bug_id: &str, message: &str) -> Result<Bug, AppError> {
        self.dispatch(bug_id, Mutation::AddComment(message.to_string()))
            .await
    }

    /// Replace the message of a timeline entry.
    pub async fn submit_edit(
        &self,
        bug_id: &str,
        target: &str,
        message: &str,
    ) -> Result<Bug, AppError> {
        self.dispatch(
            bug_id,
            Mutation::EditComment {
                target: target.to_string(),
                message: message.to_string(),
            },
        )
        .await
    }

    /// Mutation, then refresh, as one step.
    ///
    /// A mutation failure leaves the cache untouched. A refresh failure is
    /// reported as [`AppError::Resync`] since the backend already has the change.
    pub async fn dispatch(&self, bug_id: &str, mutation: Mutation) -> Result<Bug, AppError> {
        if mutation.message().is_some_and(|m| m.trim().is_empty()) {
            return Err(AppError::invalid_input_field(
                "Message cannot be empty",
                "message",
            ));
        }

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight, &self.events, bug_id) else {
            log::debug!(
                "[dispatch] Ignoring {} for {}: submission already in flight",
                mutation.name(),
                bug_id
            );
            return Err(AppError::submission_in_flight(bug_id));
        };

        log::info!("[dispatch] {} on {}", mutation.name(), bug_id);

        if let Err(e) = self.apply(bug_id, &mutation).await {
            log::warn!("[dispatch] {} on {} failed: {}", mutation.name(), bug_id, e);
            return Err(e);
        }

        self.sync
            .resync(&self.backend, bug_id)
            .await
            .map_err(|e| {
                log::warn!(
                    "[dispatch] {} on {} applied but refresh failed: {}",
                    mutation.name(),
                    bug_id,
                    e
                );
                AppError::resync(bug_id, &e)
            })
    }

    async fn apply(&self, bug_id: &str, mutation: &Mutation) -> Result<(), AppError> {
        match mutation {
            Mutation::Transition(TransitionAction::Close) => self.backend.close_bug(bug_id).await,
            Mutation::Transition(TransitionAction::Reopen) => {
                self.backend.reopen_bug(bug_id).await
            }
            Mutation::Transition(TransitionAction::CloseWithComment(message)) => {
                self.backend.close_bug_with_comment(bug_id, message).await
            }
            Mutation::Transition(TransitionAction::ReopenWithComment(message)) => {
                self.backend.reopen_bug_with_comment(bug_id, message).await
            }
            Mutation::AddComment(message) => self.backend.add_comment(bug_id, message).await,
            Mutation::EditComment { target, message } => {
                self.backend.edit_comment(bug_id, target, message).await
            }
        }
    }
}

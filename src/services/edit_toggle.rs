//! Read/edit view toggle for timeline entries.
//!
//! Each entry has its own state, so several entries can be in edit view at
//! once. Entering edit view requires a logged-in session.

use crate::error::AppError;
use crate::models::Bug;
use crate::services::backend::BugBackend;
use crate::services::dispatcher::MutationDispatcher;
use crate::services::session::SessionGate;
use serde::Serialize;
use std::collections::HashMap;

/// View state of one timeline entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditState {
    #[default]
    Reading,
    Editing,
}

/// Per-entry view states, keyed by entry identifier.
#[derive(Debug, Clone, Default)]
pub struct EntryEditToggle {
    states: HashMap<String, EditState>,
}

impl EntryEditToggle {
    /// Create a toggle with every entry in read view.
    pub fn new() -> Self {
        Self::default()
    }

    /// State of an entry; unknown entries are in read view.
    pub fn state(&self, entry_id: &str) -> EditState {
        self.states.get(entry_id).copied().unwrap_or_default()
    }

    /// Check if the entry is in edit view.
    pub fn is_editing(&self, entry_id: &str) -> bool {
        self.state(entry_id) == EditState::Editing
    }

    /// Whether the edit button is shown at all.
    pub fn can_edit(gate: &impl SessionGate) -> bool {
        gate.is_logged_in()
    }

    /// Entries currently in edit view, sorted by identifier.
    pub fn editing_entries(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .states
            .iter()
            .filter(|(_, state)| **state == EditState::Editing)
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Switch an entry to edit view.
    ///
    /// Refused without a logged-in session; the entry then stays in read view.
    pub fn request_edit(
        &mut self,
        entry_id: &str,
        gate: &impl SessionGate,
    ) -> Result<EditState, AppError> {
        if !gate.is_logged_in() {
            log::warn!("[edit] Edit of {} refused: not logged in", entry_id);
            return Err(AppError::authentication("Log in to edit comments"));
        }

        self.states.insert(entry_id.to_string(), EditState::Editing);
        Ok(EditState::Editing)
    }

    /// Leave edit view without saving.
    pub fn cancel(&mut self, entry_id: &str) -> EditState {
        self.states.insert(entry_id.to_string(), EditState::Reading);
        EditState::Reading
    }

    /// Save the new message and return the entry to read view.
    ///
    /// Any failure keeps the entry in edit view so the text is not lost.
    pub async fn submit_edit<B: BugBackend>(
        &mut self,
        dispatcher: &MutationDispatcher<B>,
        bug_id: &str,
        entry_id: &str,
        message: &str,
    ) -> Result<Bug, AppError> {
        if !self.is_editing(entry_id) {
            return Err(AppError::invalid_input(format!(
                "Entry {} is not being edited",
                entry_id
            )));
        }

        let bug = dispatcher.submit_edit(bug_id, entry_id, message).await?;
        self.states.insert(entry_id.to_string(), EditState::Reading);
        Ok(bug)
    }
}

//! Comment form for one bug.
//!
//! Holds the draft, offers the status transition that matches it, and hands
//! submissions to the dispatcher. The draft is cleared only after a submission
//! and its timeline refresh have both succeeded.

use crate::error::AppError;
use crate::models::{select, Bug, BugStatus, TransitionAction};
use crate::services::backend::BugBackend;
use crate::services::dispatcher::MutationDispatcher;
use crate::services::draft::Draft;
use crate::services::session::SessionGate;
use std::sync::Arc;

/// Comment form state for a single bug.
#[derive(Debug)]
pub struct CommentComposer<B> {
    dispatcher: Arc<MutationDispatcher<B>>,
    bug_id: String,
    draft: Draft,
}

impl<B: BugBackend> CommentComposer<B> {
    /// Mount the form for a bug; nothing is mounted unless the user is logged in.
    pub fn mount(
        dispatcher: Arc<MutationDispatcher<B>>,
        bug_id: impl Into<String>,
        gate: &impl SessionGate,
    ) -> Option<Self> {
        if !gate.is_logged_in() {
            return None;
        }

        Some(Self {
            dispatcher,
            bug_id: bug_id.into(),
            draft: Draft::new(),
        })
    }

    /// The bug this form belongs to.
    pub fn bug_id(&self) -> &str {
        &self.bug_id
    }

    /// Current draft.
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Update the draft with what the user typed.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.draft.set_text(text);
    }

    /// The transition offered for the given status and the current draft.
    pub fn selected_action(&self, status: BugStatus) -> TransitionAction {
        TransitionAction::new(select(status, !self.draft.is_empty()), self.draft.text())
    }

    /// Whether a submission for this bug is outstanding.
    pub fn is_submitting(&self) -> bool {
        self.dispatcher.is_in_flight(&self.bug_id)
    }

    /// Whether the plain "Comment" control is enabled.
    pub fn can_comment(&self) -> bool {
        !self.draft.is_empty() && !self.is_submitting()
    }

    /// Post the draft as a comment.
    pub async fn submit_comment(&mut self) -> Result<Bug, AppError> {
        if self.draft.is_empty() {
            return Err(AppError::invalid_input_field(
                "Comment cannot be empty",
                "message",
            ));
        }

        let bug = self
            .dispatcher
            .submit_comment(&self.bug_id, self.draft.text())
            .await?;
        self.draft.clear();
        Ok(bug)
    }

    /// Apply the transition selected for the bug's status, posting the draft
    /// with it if non-empty.
    ///
    /// The cached status wins; `fallback` is used only when the bug has not
    /// been loaded yet.
    pub async fn submit_transition(&mut self, fallback: BugStatus) -> Result<Bug, AppError> {
        let status = self
            .dispatcher
            .timeline_sync()
            .cache()
            .status(&self.bug_id)
            .await
            .unwrap_or(fallback);
        let action = self.selected_action(status);
        let bug = self.dispatcher.submit(&self.bug_id, &action).await?;
        self.draft.clear();
        Ok(bug)
    }
}

//! Status transitions offered next to the comment form.

use serde::Serialize;

use super::bug::BugStatus;

/// Which transition control is offered, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Close,
    CloseWithComment,
    Reopen,
    ReopenWithComment,
}

impl TransitionKind {
    /// Caption of the control.
    pub fn label(self) -> &'static str {
        match self {
            Self::Close => "Close bug",
            Self::CloseWithComment => "Close bug with comment",
            Self::Reopen => "Reopen bug",
            Self::ReopenWithComment => "Reopen bug with comment",
        }
    }

    /// Whether the transition also posts the draft as a comment.
    pub fn carries_comment(self) -> bool {
        matches!(self, Self::CloseWithComment | Self::ReopenWithComment)
    }

    /// Status the bug ends up in once the transition is applied.
    pub fn target_status(self) -> BugStatus {
        match self {
            Self::Close | Self::CloseWithComment => BugStatus::Closed,
            Self::Reopen | Self::ReopenWithComment => BugStatus::Open,
        }
    }
}

/// Pick the single transition valid for the current status and draft.
///
/// Total and free of state: the same inputs always give the same kind.
pub fn select(status: BugStatus, draft_non_empty: bool) -> TransitionKind {
    match (status, draft_non_empty) {
        (BugStatus::Open, true) => TransitionKind::CloseWithComment,
        (BugStatus::Open, false) => TransitionKind::Close,
        (BugStatus::Closed, true) => TransitionKind::ReopenWithComment,
        (BugStatus::Closed, false) => TransitionKind::Reopen,
    }
}

/// A transition ready to be dispatched, with the comment text when it has one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum TransitionAction {
    Close,
    CloseWithComment(String),
    Reopen,
    ReopenWithComment(String),
}

impl TransitionAction {
    /// Attach the raw comment text to a selected kind.
    ///
    /// The text is only kept for the comment-bearing kinds and is not trimmed.
    pub fn new(kind: TransitionKind, text: &str) -> Self {
        match kind {
            TransitionKind::Close => Self::Close,
            TransitionKind::CloseWithComment => Self::CloseWithComment(text.to_string()),
            TransitionKind::Reopen => Self::Reopen,
            TransitionKind::ReopenWithComment => Self::ReopenWithComment(text.to_string()),
        }
    }

    /// The kind of this action.
    pub fn kind(&self) -> TransitionKind {
        match self {
            Self::Close => TransitionKind::Close,
            Self::CloseWithComment(_) => TransitionKind::CloseWithComment,
            Self::Reopen => TransitionKind::Reopen,
            Self::ReopenWithComment(_) => TransitionKind::ReopenWithComment,
        }
    }

    /// Comment text carried by the action, if any.
    pub fn comment(&self) -> Option<&str> {
        match self {
            Self::CloseWithComment(text) | Self::ReopenWithComment(text) => Some(text),
            Self::Close | Self::Reopen => None,
        }
    }

    /// Caption of the control.
    pub fn label(&self) -> &'static str {
        self.kind().label()
    }
}

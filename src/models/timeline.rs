//! Timeline entry model for bug history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of message-bearing timeline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// The bug's opening message.
    Create,
    /// A comment added after creation.
    AddComment,
}

/// Author of a timeline entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    #[serde(default)]
    pub human_id: String,
    #[serde(default)]
    pub display_name: String,
}

/// One synced entry of a bug's timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    /// Entry identifier, also the target of an edit.
    pub id: String,

    /// Whether this is the creation message or a later comment.
    pub kind: EntryKind,

    /// Entry author.
    pub author: Author,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Message content (Markdown).
    pub message: String,

    /// Whether the message was edited after creation.
    pub edited: bool,
}

impl TimelineEntry {
    /// Check if this entry carries the bug's opening message.
    pub fn is_create(&self) -> bool {
        self.kind == EntryKind::Create
    }

    /// Check if the "Edited" tag should be shown in the header.
    pub fn show_edited_tag(&self) -> bool {
        self.edited
    }
}

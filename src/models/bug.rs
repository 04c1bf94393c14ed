//! Bug model.

use serde::{Deserialize, Serialize};

use super::timeline::TimelineEntry;

/// Status of a bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BugStatus {
    Open,
    Closed,
}

impl std::fmt::Display for BugStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Closed => write!(f, "CLOSED"),
        }
    }
}

/// RGB color of a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelColor {
    #[serde(rename = "R")]
    pub r: u8,
    #[serde(rename = "G")]
    pub g: u8,
    #[serde(rename = "B")]
    pub b: u8,
}

/// Label attached to a bug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    #[serde(default)]
    pub color: Option<LabelColor>,
}

/// Client-side projection of a bug.
///
/// The backend owns the bug; this copy is only ever replaced wholesale
/// by a timeline refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bug {
    /// Full bug identifier.
    pub id: String,

    /// Short identifier shown in the UI.
    #[serde(default)]
    pub human_id: String,

    /// Bug title.
    #[serde(default)]
    pub title: String,

    /// Current status.
    pub status: BugStatus,

    /// Labels, in backend order.
    #[serde(default)]
    pub labels: Vec<Label>,

    /// Timeline entries, oldest first.
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
}

impl Bug {
    /// Check if the bug is open.
    pub fn is_open(&self) -> bool {
        self.status == BugStatus::Open
    }

    /// Look up a timeline entry by identifier.
    pub fn entry(&self, entry_id: &str) -> Option<&TimelineEntry> {
        self.timeline.iter().find(|e| e.id == entry_id)
    }
}

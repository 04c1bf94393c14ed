//! Data models for the bug page.
//!
//! These models are read-only projections of what the git-bug backend owns,
//! plus the transition actions derived from them.
//!
//! All models derive Serialize so the view layer can render them directly.

pub mod bug;
pub mod identity;
pub mod timeline;
pub mod transition;

// Re-exports for convenient access
pub use bug::{Bug, BugStatus, Label, LabelColor};
pub use identity::Identity;
pub use timeline::{Author, EntryKind, TimelineEntry};
pub use transition::{select, TransitionAction, TransitionKind};

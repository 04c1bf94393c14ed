//! Ultra GitBug - bug page coordinator for the git-bug web client.
//!
//! This library decides which status transition the comment form offers,
//! dispatches mutations to the git-bug GraphQL API, refreshes the bug's
//! timeline afterwards, and tracks which timeline entries are being edited.

pub mod error;
pub mod models;
pub mod services;

pub use error::AppError;
pub use models::{Bug, BugStatus, TimelineEntry, TransitionAction, TransitionKind};
pub use services::{
    BugBackend, CommentComposer, EntryEditToggle, GitBugClient, IdentitySession,
    MutationDispatcher, SessionGate,
};

//! Coordinator services.
//!
//! This module contains the interaction logic of the bug page: the draft,
//! the mutation dispatcher with its timeline refresh, the per-entry edit
//! toggle, and the git-bug GraphQL client they run against.
//!
//! Services are designed to be testable and independent of any view framework.

pub mod backend;
pub mod composer;
pub mod dispatcher;
pub mod draft;
pub mod edit_toggle;
pub mod events;
pub mod graphql_client;
pub mod session;
pub mod timeline_sync;

pub use backend::BugBackend;
pub use composer::CommentComposer;
pub use dispatcher::{Mutation, MutationDispatcher};
pub use draft::Draft;
pub use edit_toggle::{EditState, EntryEditToggle};
pub use events::{CoordinatorEvent, EventBus};
pub use graphql_client::{GitBugClient, GitBugClientConfig};
pub use session::{IdentitySession, SessionGate};
pub use timeline_sync::{TimelineCache, TimelineSync, TimelineSyncConfig};

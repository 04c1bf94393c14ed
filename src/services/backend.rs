//! Boundary to the query/mutation execution layer.
//!
//! The coordinator only sees these calls; transport and schema live in
//! the implementation (see `graphql_client`).

use std::future::Future;

use crate::error::AppError;
use crate::models::{Bug, Identity};

/// Asynchronous operations offered by the git-bug backend.
///
/// Every mutation is acknowledged or rejected as a whole; the coordinator never
/// learns the new state from a mutation and always refetches through
/// [`BugBackend::timeline`].
pub trait BugBackend {
    /// Close the bug.
    fn close_bug(&self, bug_id: &str) -> impl Future<Output = Result<(), AppError>>;

    /// Reopen the bug.
    fn reopen_bug(&self, bug_id: &str) -> impl Future<Output = Result<(), AppError>>;

    /// Add a comment and close the bug in one call.
    fn close_bug_with_comment(
        &self,
        bug_id: &str,
        message: &str,
    ) -> impl Future<Output = Result<(), AppError>>;

    /// Add a comment and reopen the bug in one call.
    fn reopen_bug_with_comment(
        &self,
        bug_id: &str,
        message: &str,
    ) -> impl Future<Output = Result<(), AppError>>;

    /// Add a comment without touching the status.
    fn add_comment(&self, bug_id: &str, message: &str)
        -> impl Future<Output = Result<(), AppError>>;

    /// Replace the message of an existing timeline entry.
    fn edit_comment(
        &self,
        bug_id: &str,
        target: &str,
        message: &str,
    ) -> impl Future<Output = Result<(), AppError>>;

    /// Fetch the bug with its first `first` timeline entries.
    fn timeline(&self, bug_id: &str, first: u32) -> impl Future<Output = Result<Bug, AppError>>;

    /// Identity of the logged-in user, `None` when there is none.
    fn current_identity(&self) -> impl Future<Output = Result<Option<Identity>, AppError>>;
}

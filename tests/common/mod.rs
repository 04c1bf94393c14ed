//! Scripted in-memory backend shared by the integration tests.
//!
//! Behaves like the git-bug server for one repository: mutations change the
//! stored bugs, the timeline query returns them. Every call is recorded.

#![allow(dead_code)]

use chrono::DateTime;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use ultra_gitbug_lib::error::AppError;
use ultra_gitbug_lib::models::{Author, Bug, BugStatus, EntryKind, Identity, TimelineEntry};
use ultra_gitbug_lib::services::{BugBackend, MutationDispatcher, TimelineSyncConfig};

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CloseBug(String),
    ReopenBug(String),
    CloseBugWithComment(String, String),
    ReopenBugWithComment(String, String),
    AddComment(String, String),
    EditComment(String, String, String),
    Timeline(String, u32),
    CurrentIdentity,
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::Timeline(..) | Self::CurrentIdentity)
    }
}

#[derive(Debug, Default)]
struct FakeState {
    bugs: HashMap<String, Bug>,
    calls: Vec<Call>,
    identity: Option<Identity>,
    fail_identity: bool,
    fail_next_mutation: Option<String>,
    fail_next_timeline: Option<String>,
    hold_mutations: bool,
    hold_next_timeline: bool,
    next_op: i64,
}

/// Cloneable handle; clones share state.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
    release: Arc<Notify>,
    release_timeline: Arc<Notify>,
}

pub fn author() -> Author {
    Author {
        id: "user-1".to_string(),
        human_id: "user-1".to_string(),
        display_name: "Rene Descartes".to_string(),
    }
}

pub fn entry(id: &str, kind: EntryKind, message: &str) -> TimelineEntry {
    TimelineEntry {
        id: id.to_string(),
        kind,
        author: author(),
        created_at: DateTime::from_timestamp(1_600_000_000, 0).unwrap(),
        message: message.to_string(),
        edited: false,
    }
}

pub fn bug(id: &str, status: BugStatus) -> Bug {
    Bug {
        id: id.to_string(),
        human_id: id.chars().take(7).collect(),
        title: "Crash when opening settings".to_string(),
        status,
        labels: Vec::new(),
        timeline: vec![entry("op-create", EntryKind::Create, "The app crashes")],
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend holding a single bug.
    pub fn with_bug(bug: Bug) -> Self {
        let backend = Self::new();
        backend.insert_bug(bug);
        backend
    }

    pub fn insert_bug(&self, bug: Bug) {
        self.state.lock().unwrap().bugs.insert(bug.id.clone(), bug);
    }

    pub fn stored_bug(&self, bug_id: &str) -> Bug {
        self.state.lock().unwrap().bugs[bug_id].clone()
    }

    pub fn set_identity(&self, identity: Option<Identity>) {
        self.state.lock().unwrap().identity = identity;
    }

    pub fn fail_identity(&self) {
        self.state.lock().unwrap().fail_identity = true;
    }

    pub fn fail_next_mutation(&self, message: &str) {
        self.state.lock().unwrap().fail_next_mutation = Some(message.to_string());
    }

    pub fn fail_next_timeline(&self, message: &str) {
        self.state.lock().unwrap().fail_next_timeline = Some(message.to_string());
    }

    /// Keep every mutation pending until [`FakeBackend::release`] is called.
    pub fn hold_mutations(&self) {
        self.state.lock().unwrap().hold_mutations = true;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }

    /// Answer the next timeline query with the bug as it is now, but only
    /// after [`FakeBackend::release_timeline`] is called.
    pub fn hold_next_timeline(&self) {
        self.state.lock().unwrap().hold_next_timeline = true;
    }

    pub fn release_timeline(&self) {
        self.release_timeline.notify_one();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn mutation_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn timeline_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Timeline(..)))
            .count()
    }

    /// Record the call, optionally wait, then apply it to the stored bug.
    async fn mutation(
        &self,
        call: Call,
        bug_id: &str,
        apply: impl FnOnce(&mut Bug, i64),
    ) -> Result<(), AppError> {
        let hold = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(call);
            state.hold_mutations
        };

        if hold {
            self.release.notified().await;
        }

        let mut state = self.state.lock().unwrap();
        if let Some(message) = state.fail_next_mutation.take() {
            return Err(AppError::network(message));
        }

        state.next_op += 1;
        let op = state.next_op;
        let bug = state
            .bugs
            .get_mut(bug_id)
            .ok_or_else(|| AppError::not_found_with_id("Bug", bug_id))?;
        apply(bug, op);
        Ok(())
    }
}

fn push_comment(bug: &mut Bug, op: i64, message: &str) {
    let mut comment = entry(&format!("op-{op}"), EntryKind::AddComment, message);
    comment.created_at = DateTime::from_timestamp(1_600_000_000 + op, 0).unwrap();
    bug.timeline.push(comment);
}

impl BugBackend for FakeBackend {
    async fn close_bug(&self, bug_id: &str) -> Result<(), AppError> {
        self.mutation(Call::CloseBug(bug_id.into()), bug_id, |bug, _| {
            bug.status = BugStatus::Closed;
        })
        .await
    }

    async fn reopen_bug(&self, bug_id: &str) -> Result<(), AppError> {
        self.mutation(Call::ReopenBug(bug_id.into()), bug_id, |bug, _| {
            bug.status = BugStatus::Open;
        })
        .await
    }

    async fn close_bug_with_comment(&self, bug_id: &str, message: &str) -> Result<(), AppError> {
        let call = Call::CloseBugWithComment(bug_id.into(), message.into());
        self.mutation(call, bug_id, |bug, op| {
            push_comment(bug, op, message);
            bug.status = BugStatus::Closed;
        })
        .await
    }

    async fn reopen_bug_with_comment(&self, bug_id: &str, message: &str) -> Result<(), AppError> {
        let call = Call::ReopenBugWithComment(bug_id.into(), message.into());
        self.mutation(call, bug_id, |bug, op| {
            push_comment(bug, op, message);
            bug.status = BugStatus::Open;
        })
        .await
    }

    async fn add_comment(&self, bug_id: &str, message: &str) -> Result<(), AppError> {
        let call = Call::AddComment(bug_id.into(), message.into());
        self.mutation(call, bug_id, |bug, op| push_comment(bug, op, message))
            .await
    }

    async fn edit_comment(&self, bug_id: &str, target: &str, message: &str) -> Result<(), AppError> {
        let call = Call::EditComment(bug_id.into(), target.into(), message.into());
        self.mutation(call, bug_id, |bug, _| {
            if let Some(entry) = bug.timeline.iter_mut().find(|e| e.id == target) {
                entry.message = message.to_string();
                entry.edited = true;
            }
        })
        .await
    }

    async fn timeline(&self, bug_id: &str, first: u32) -> Result<Bug, AppError> {
        let result = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::Timeline(bug_id.into(), first));

            match state.fail_next_timeline.take() {
                Some(message) => Err(AppError::network(message)),
                None => state
                    .bugs
                    .get(bug_id)
                    .cloned()
                    .ok_or_else(|| AppError::not_found_with_id("Bug", bug_id)),
            }
        };

        let hold = std::mem::take(&mut self.state.lock().unwrap().hold_next_timeline);
        if hold {
            self.release_timeline.notified().await;
        }

        let mut bug = result?;
        bug.timeline.truncate(first as usize);
        Ok(bug)
    }

    async fn current_identity(&self) -> Result<Option<Identity>, AppError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CurrentIdentity);

        if state.fail_identity {
            return Err(AppError::network("identity query failed"));
        }
        Ok(state.identity.clone())
    }
}

/// Dispatcher over a clone of the backend, so the test keeps a handle.
pub fn dispatcher(backend: &FakeBackend) -> Arc<MutationDispatcher<FakeBackend>> {
    Arc::new(MutationDispatcher::new(
        backend.clone(),
        TimelineSyncConfig::default(),
    ))
}

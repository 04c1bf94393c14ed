//! Entry edit toggle and session gate tests.
//!
//! Editing is only offered to logged-in users. A cancelled edit leaves the
//! message as it was; a saved edit shows up after the timeline refresh.

mod common;

use common::{bug, dispatcher, entry, Call, FakeBackend};
use ultra_gitbug_lib::error::AppError;
use ultra_gitbug_lib::models::{BugStatus, EntryKind, Identity};
use ultra_gitbug_lib::services::{EditState, EntryEditToggle, IdentitySession, SessionGate};

const BUG_ID: &str = "5f2a9c1e";

fn bug_with_comment() -> ultra_gitbug_lib::models::Bug {
    let mut b = bug(BUG_ID, BugStatus::Open);
    b.timeline
        .push(entry("op-comment", EntryKind::AddComment, "first version"));
    b
}

fn identity() -> Identity {
    Identity {
        id: "user-1".to_string(),
        human_id: "user-1".to_string(),
        display_name: "Rene Descartes".to_string(),
    }
}

/// Test: Reading -> Editing -> Reading via cancel
#[tokio::test]
async fn test_cancel_leaves_message_unchanged() {
    let backend = FakeBackend::with_bug(bug_with_comment());
    let dispatcher = dispatcher(&backend);
    dispatcher.load(BUG_ID).await.unwrap();
    let mut toggle = EntryEditToggle::new();

    toggle.request_edit("op-comment", &true).unwrap();
    assert_eq!(toggle.cancel("op-comment"), EditState::Reading);

    let cached = dispatcher.timeline_sync().cache().get(BUG_ID).await.unwrap();
    let shown = cached.entry("op-comment").unwrap();
    assert_eq!(shown.message, "first version");
    assert!(!shown.show_edited_tag());
    assert!(backend.mutation_calls().is_empty());
}

/// Test: Reading -> Editing -> Reading via successful edit
#[tokio::test]
async fn test_successful_edit_shows_new_text() {
    let backend = FakeBackend::with_bug(bug_with_comment());
    let dispatcher = dispatcher(&backend);
    let mut toggle = EntryEditToggle::new();

    toggle.request_edit("op-comment", &true).unwrap();
    let refreshed = toggle
        .submit_edit(dispatcher.as_ref(), BUG_ID, "op-comment", "second version")
        .await
        .unwrap();

    assert_eq!(toggle.state("op-comment"), EditState::Reading);
    let shown = refreshed.entry("op-comment").unwrap();
    assert_eq!(shown.message, "second version");
    assert!(shown.show_edited_tag());
    assert_eq!(
        backend.mutation_calls(),
        vec![Call::EditComment(
            BUG_ID.into(),
            "op-comment".into(),
            "second version".into()
        )]
    );
}

/// Test: a failed edit stays in edit view
#[tokio::test]
async fn test_failed_edit_stays_editing() {
    let backend = FakeBackend::with_bug(bug_with_comment());
    let dispatcher = dispatcher(&backend);
    let mut toggle = EntryEditToggle::new();

    toggle.request_edit("op-comment", &true).unwrap();
    backend.fail_next_mutation("offline");

    let result = toggle
        .submit_edit(dispatcher.as_ref(), BUG_ID, "op-comment", "second version")
        .await;

    assert!(result.is_err());
    assert!(toggle.is_editing("op-comment"));
}

/// Test: saving an entry that is not in edit view is refused
#[tokio::test]
async fn test_submit_edit_requires_editing_state() {
    let backend = FakeBackend::with_bug(bug_with_comment());
    let dispatcher = dispatcher(&backend);
    let mut toggle = EntryEditToggle::new();

    let err = toggle
        .submit_edit(dispatcher.as_ref(), BUG_ID, "op-comment", "text")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidInput { .. }));
    assert!(backend.calls().is_empty());
}

/// Test: blank edit text is refused before any call
#[tokio::test]
async fn test_blank_edit_is_refused() {
    let backend = FakeBackend::with_bug(bug_with_comment());
    let dispatcher = dispatcher(&backend);
    let mut toggle = EntryEditToggle::new();

    toggle.request_edit("op-comment", &true).unwrap();
    let err = toggle
        .submit_edit(dispatcher.as_ref(), BUG_ID, "op-comment", "  ")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidInput { .. }));
    assert!(toggle.is_editing("op-comment"));
    assert!(backend.calls().is_empty());
}

/// Test: identity query drives the session gate
#[tokio::test]
async fn test_session_refresh() {
    let backend = FakeBackend::new();
    let mut session = IdentitySession::new();

    assert!(!session.refresh(&backend).await);

    backend.set_identity(Some(identity()));
    assert!(session.refresh(&backend).await);
    assert_eq!(session.identity().unwrap().display_name, "Rene Descartes");

    let mut toggle = EntryEditToggle::new();
    assert!(EntryEditToggle::can_edit(&session));
    assert!(toggle.request_edit("op-comment", &session).is_ok());
}

/// Test: a failing identity query closes the gate
#[tokio::test]
async fn test_session_fails_closed() {
    let backend = FakeBackend::new();
    backend.set_identity(Some(identity()));
    let mut session = IdentitySession::new();
    assert!(session.refresh(&backend).await);

    backend.fail_identity();
    assert!(!session.refresh(&backend).await);
    assert!(!session.is_logged_in());

    let mut toggle = EntryEditToggle::new();
    assert!(toggle.request_edit("op-comment", &session).is_err());
    assert_eq!(toggle.state("op-comment"), EditState::Reading);
}

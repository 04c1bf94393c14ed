//! Session gate: is a user identity available?
//!
//! Privileged controls (comment form, edit button) are only offered while the
//! gate is open. Anything other than a known identity closes it.

use crate::models::Identity;
use crate::services::backend::BugBackend;

/// Answers whether commenting and editing may be offered.
pub trait SessionGate {
    /// Whether a user identity is currently available.
    fn is_logged_in(&self) -> bool;
}

impl SessionGate for bool {
    fn is_logged_in(&self) -> bool {
        *self
    }
}

/// Session backed by the backend's current-identity query.
///
/// Starts closed and stays closed until a refresh returns an identity.
#[derive(Debug, Clone, Default)]
pub struct IdentitySession {
    identity: Option<Identity>,
}

impl IdentitySession {
    /// Create a session with no identity loaded yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-run the identity query.
    ///
    /// A failed query is logged and treated as logged out.
    pub async fn refresh<B: BugBackend>(&mut self, backend: &B) -> bool {
        self.identity = match backend.current_identity().await {
            Ok(identity) => identity,
            Err(e) => {
                log::warn!("[session] Failed to load current identity: {}", e);
                None
            }
        };
        self.is_logged_in()
    }

    /// The identity, when logged in.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}

impl SessionGate for IdentitySession {
    fn is_logged_in(&self) -> bool {
        self.identity.is_some()
    }
}

//! Identity of the logged-in user.

use serde::{Deserialize, Serialize};

/// User identity as reported by the backend for the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub human_id: String,
    #[serde(default)]
    pub display_name: String,
}

//! Application error types for the bug page.
//!
//! These errors are serializable and can be handed to the view layer
//! to provide meaningful error messages next to the failed control.

use serde::Serialize;
use thiserror::Error;

/// Application-level errors returned by the coordinator.
///
/// All variants serialize to a structured JSON object for frontend consumption.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum AppError {
    /// The GraphQL endpoint answered with an `errors` array or a non-success status.
    #[error("GraphQL error: {message}")]
    GraphQl {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        status_code: Option<u16>,
        #[serde(skip_serializing_if = "Option::is_none")]
        operation: Option<String>,
    },

    /// Network request failed.
    #[error("Network error: {message}")]
    Network { message: String },

    /// No user identity is available.
    #[error("Authentication error: {message}")]
    Authentication { message: String },

    /// Requested resource not found.
    #[error("Not found: {resource}")]
    NotFound {
        resource: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },

    /// Invalid input provided.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },

    /// Another submission for the same bug is still outstanding.
    #[error("A submission for bug {bug_id} is already in progress")]
    SubmissionInFlight { bug_id: String },

    /// The mutation was acknowledged but the timeline could not be refreshed.
    #[error("Timeline refresh failed for bug {bug_id}: {message}")]
    Resync { bug_id: String, message: String },

    /// Internal application error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Create a GraphQL error.
    pub fn graphql(message: impl Into<String>) -> Self {
        Self::GraphQl {
            message: message.into(),
            status_code: None,
            operation: None,
        }
    }

    /// Create a GraphQL error with HTTP status code and operation name.
    pub fn graphql_full(
        message: impl Into<String>,
        status_code: u16,
        operation: impl Into<String>,
    ) -> Self {
        Self::GraphQl {
            message: message.into(),
            status_code: Some(status_code),
            operation: Some(operation.into()),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create a not found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: None,
        }
    }

    /// Create a not found error with ID.
    pub fn not_found_with_id(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: Some(id.into()),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: None,
        }
    }

    /// Create an invalid input error with field name.
    pub fn invalid_input_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a single-flight rejection for a bug.
    pub fn submission_in_flight(bug_id: impl Into<String>) -> Self {
        Self::SubmissionInFlight {
            bug_id: bug_id.into(),
        }
    }

    /// Wrap the failure of a post-mutation refresh.
    pub fn resync(bug_id: impl Into<String>, source: &AppError) -> Self {
        Self::Resync {
            bug_id: bug_id.into(),
            message: source.to_string(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this error came from the refresh step after an acknowledged mutation.
    pub fn is_resync_failure(&self) -> bool {
        matches!(self, Self::Resync { .. })
    }

    /// Whether the backend may already hold the submitted change.
    ///
    /// Only a failed refresh implies the mutation went through; every other
    /// failure happened before or instead of the mutation.
    pub fn mutation_may_have_applied(&self) -> bool {
        self.is_resync_failure()
    }

    /// Message to show the user next to the submit control.
    pub fn user_message(&self) -> String {
        match self {
            Self::Resync { .. } => format!(
                "{}. Your change may already be saved; reload the page before submitting it again to avoid a duplicate.",
                self
            ),
            Self::SubmissionInFlight { .. } => {
                "Please wait for the current submission to finish.".to_string()
            }
            other => other.to_string(),
        }
    }
}

// Conversions from common error types

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network("Request timed out")
        } else if err.is_connect() {
            Self::network("Failed to connect to server")
        } else if err.is_status() {
            Self::graphql(format!("HTTP error: {}", err))
        } else {
            Self::network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("JSON error: {}", err))
    }
}

//! git-bug GraphQL API client.
//!
//! Provides the HTTP client for the `/graphql` endpoint served by `git bug webui`
//! and implements [`BugBackend`] on top of it.

use crate::error::AppError;
use crate::models::{Author, Bug, BugStatus, EntryKind, Identity, Label, TimelineEntry};
use crate::services::backend::BugBackend;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const ADD_COMMENT_MUTATION: &str = r#"
mutation AddComment($input: AddCommentInput!) {
  addComment(input: $input) { operation { id } }
}"#;

const CLOSE_BUG_MUTATION: &str = r#"
mutation CloseBug($input: CloseBugInput!) {
  closeBug(input: $input) { operation { id } }
}"#;

const OPEN_BUG_MUTATION: &str = r#"
mutation OpenBug($input: OpenBugInput!) {
  openBug(input: $input) { operation { id } }
}"#;

const ADD_COMMENT_AND_CLOSE_MUTATION: &str = r#"
mutation AddCommentAndCloseBug($input: AddCommentAndCloseBugInput!) {
  addCommentAndClose(input: $input) { statusOperation { id } }
}"#;

const ADD_COMMENT_AND_REOPEN_MUTATION: &str = r#"
mutation AddCommentAndReopenBug($input: AddCommentAndReopenBugInput!) {
  addCommentAndReopen(input: $input) { statusOperation { id } }
}"#;

const EDIT_COMMENT_MUTATION: &str = r#"
mutation EditComment($input: EditCommentInput!) {
  editComment(input: $input) { operation { id } }
}"#;

const TIMELINE_QUERY: &str = r#"
query Timeline($ref: String, $prefix: String!, $first: Int!) {
  repository(ref: $ref) {
    bug(prefix: $prefix) {
      id
      humanId
      title
      status
      labels { name color { R G B } }
      timeline(first: $first) {
        nodes {
          __typename
          ... on CreateTimelineItem {
            id
            author { id humanId displayName }
            createdAt
            message
            edited
          }
          ... on AddCommentTimelineItem {
            id
            author { id humanId displayName }
            createdAt
            message
            edited
          }
        }
      }
    }
  }
}"#;

const CURRENT_IDENTITY_QUERY: &str = r#"
query CurrentIdentity($ref: String) {
  repository(ref: $ref) {
    userIdentity { id humanId displayName }
  }
}"#;

/// git-bug API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitBugClientConfig {
    /// Base URL of the web UI server (e.g., `http://127.0.0.1:3000`).
    pub base_url: String,

    /// Repository reference; `None` targets the default repository.
    pub repo_ref: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GitBugClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            repo_ref: None,
            timeout_secs: 30,
        }
    }
}

/// git-bug GraphQL client.
#[derive(Debug, Clone)]
pub struct GitBugClient {
    client: Client,
    config: GitBugClientConfig,
}

/// Request body of a GraphQL call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlRequest<'a, V> {
    operation_name: &'a str,
    query: &'a str,
    variables: V,
}

/// Response envelope of a GraphQL call.
#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlErrorEntry>,
}

/// One entry of the `errors` array.
#[derive(Debug, Deserialize)]
struct GraphQlErrorEntry {
    message: String,
}

/// Variables of every mutation: `{ "input": ... }`.
#[derive(Debug, Serialize)]
struct InputVariables<T> {
    input: T,
}

/// Shared shape of the mutation inputs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MutationInput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    repo_ref: Option<&'a str>,
    prefix: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct TimelineVariables<'a> {
    #[serde(rename = "ref")]
    repo_ref: Option<&'a str>,
    prefix: &'a str,
    first: u32,
}

#[derive(Debug, Serialize)]
struct IdentityVariables<'a> {
    #[serde(rename = "ref")]
    repo_ref: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct RepositoryData<T> {
    repository: Option<T>,
}

#[derive(Debug, Deserialize)]
struct BugField {
    bug: Option<GitBugBug>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserIdentityField {
    user_identity: Option<Identity>,
}

/// Bug as returned by the timeline query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GitBugBug {
    id: String,
    human_id: String,
    title: String,
    status: BugStatus,
    labels: Vec<Label>,
    timeline: GitBugTimeline,
}

#[derive(Debug, Deserialize)]
struct GitBugTimeline {
    nodes: Vec<GitBugTimelineItem>,
}

/// Timeline node, discriminated by `__typename`.
///
/// Status, title and label changes also show up in the timeline; only the
/// message-bearing items are kept.
#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
enum GitBugTimelineItem {
    #[serde(rename = "CreateTimelineItem")]
    Create(GitBugMessageItem),
    #[serde(rename = "AddCommentTimelineItem")]
    AddComment(GitBugMessageItem),
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GitBugMessageItem {
    id: String,
    author: Author,
    created_at: DateTime<Utc>,
    message: String,
    edited: bool,
}

impl GitBugMessageItem {
    fn into_entry(self, kind: EntryKind) -> TimelineEntry {
        TimelineEntry {
            id: self.id,
            kind,
            author: self.author,
            created_at: self.created_at,
            message: self.message,
            edited: self.edited,
        }
    }
}

impl From<GitBugBug> for Bug {
    fn from(bug: GitBugBug) -> Self {
        let timeline = bug
            .timeline
            .nodes
            .into_iter()
            .filter_map(|item| match item {
                GitBugTimelineItem::Create(m) => Some(m.into_entry(EntryKind::Create)),
                GitBugTimelineItem::AddComment(m) => Some(m.into_entry(EntryKind::AddComment)),
                GitBugTimelineItem::Other => None,
            })
            .collect();

        Self {
            id: bug.id,
            human_id: bug.human_id,
            title: bug.title,
            status: bug.status,
            labels: bug.labels,
            timeline,
        }
    }
}

/// Turn a response envelope into its data, surfacing the `errors` array.
fn into_data<T>(response: GraphQlResponse<T>, operation: &str) -> Result<T, AppError> {
    if !response.errors.is_empty() {
        let message = response
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(AppError::GraphQl {
            message,
            status_code: None,
            operation: Some(operation.to_string()),
        });
    }

    response
        .data
        .ok_or_else(|| AppError::graphql(format!("{} returned no data", operation)))
}

impl GitBugClient {
    /// Create a new git-bug client.
    pub fn new(config: GitBugClientConfig) -> Result<Self, AppError> {
        if config.base_url.trim().is_empty() {
            return Err(AppError::invalid_input_field(
                "Server URL is required",
                "base_url",
            ));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Get the GraphQL endpoint URL.
    fn endpoint(&self) -> String {
        format!("{}/graphql", self.config.base_url.trim_end_matches('/'))
    }

    fn repo_ref(&self) -> Option<&str> {
        self.config.repo_ref.as_deref()
    }

    /// Handle HTTP-level errors, then decode the GraphQL envelope.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        operation: &str,
    ) -> Result<T, AppError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AppError::authentication(format!(
                "{} was rejected: not logged in",
                operation
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GraphQlResponse<serde_json::Value>>(&body)
                .ok()
                .and_then(|r| r.errors.into_iter().next())
                .map(|e| e.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
            return Err(AppError::graphql_full(message, status.as_u16(), operation));
        }

        let envelope = response
            .json::<GraphQlResponse<T>>()
            .await
            .map_err(|e| AppError::internal(format!("Failed to parse response: {}", e)))?;

        into_data(envelope, operation)
    }

    /// Execute a GraphQL document.
    async fn execute<T: DeserializeOwned, V: Serialize>(
        &self,
        operation: &str,
        query: &str,
        variables: V,
    ) -> Result<T, AppError> {
        let body = GraphQlRequest {
            operation_name: operation,
            query,
            variables,
        };

        log::debug!("[graphql] {}", operation);
        let response = self.client.post(self.endpoint()).json(&body).send().await?;
        self.handle_response(response, operation).await
    }

    /// Execute a mutation whose payload is not needed.
    async fn mutate(
        &self,
        operation: &str,
        query: &str,
        input: MutationInput<'_>,
    ) -> Result<(), AppError> {
        self.execute::<serde_json::Value, _>(operation, query, InputVariables { input })
            .await
            .map(|_| ())
    }

    fn input<'a>(
        &'a self,
        bug_id: &'a str,
        message: Option<&'a str>,
        target: Option<&'a str>,
    ) -> MutationInput<'a> {
        MutationInput {
            repo_ref: self.repo_ref(),
            prefix: bug_id,
            message,
            target,
        }
    }
}

impl BugBackend for GitBugClient {
    async fn close_bug(&self, bug_id: &str) -> Result<(), AppError> {
        let input = self.input(bug_id, None, None);
        self.mutate("CloseBug", CLOSE_BUG_MUTATION, input).await
    }

    async fn reopen_bug(&self, bug_id: &str) -> Result<(), AppError> {
        let input = self.input(bug_id, None, None);
        self.mutate("OpenBug", OPEN_BUG_MUTATION, input).await
    }

    async fn close_bug_with_comment(&self, bug_id: &str, message: &str) -> Result<(), AppError> {
        let input = self.input(bug_id, Some(message), None);
        self.mutate("AddCommentAndCloseBug", ADD_COMMENT_AND_CLOSE_MUTATION, input)
            .await
    }

    async fn reopen_bug_with_comment(&self, bug_id: &str, message: &str) -> Result<(), AppError> {
        let input = self.input(bug_id, Some(message), None);
        self.mutate(
            "AddCommentAndReopenBug",
            ADD_COMMENT_AND_REOPEN_MUTATION,
            input,
        )
        .await
    }

    async fn add_comment(&self, bug_id: &str, message: &str) -> Result<(), AppError> {
        let input = self.input(bug_id, Some(message), None);
        self.mutate("AddComment", ADD_COMMENT_MUTATION, input).await
    }

    async fn edit_comment(&self, bug_id: &str, target: &str, message: &str) -> Result<(), AppError> {
        let input = self.input(bug_id, Some(message), Some(target));
        self.mutate("EditComment", EDIT_COMMENT_MUTATION, input).await
    }

    async fn timeline(&self, bug_id: &str, first: u32) -> Result<Bug, AppError> {
        let variables = TimelineVariables {
            repo_ref: self.repo_ref(),
            prefix: bug_id,
            first,
        };

        let data: RepositoryData<BugField> =
            self.execute("Timeline", TIMELINE_QUERY, variables).await?;

        data.repository
            .ok_or_else(|| AppError::not_found("Repository"))?
            .bug
            .map(Bug::from)
            .ok_or_else(|| AppError::not_found_with_id("Bug", bug_id))
    }

    async fn current_identity(&self) -> Result<Option<Identity>, AppError> {
        let variables = IdentityVariables {
            repo_ref: self.repo_ref(),
        };

        let data: RepositoryData<UserIdentityField> = self
            .execute("CurrentIdentity", CURRENT_IDENTITY_QUERY, variables)
            .await?;

        Ok(data.repository.and_then(|r| r.user_identity))
    }
}

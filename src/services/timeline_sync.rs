//! Timeline refresh after mutations.
//!
//! The cached projection of a bug is only ever replaced here, with whatever
//! the backend returns. Nothing is merged locally.

use crate::error::AppError;
use crate::models::{Bug, BugStatus, TimelineEntry};
use crate::services::backend::BugBackend;
use crate::services::events::EventBus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Default number of timeline entries fetched per refresh.
pub const DEFAULT_TIMELINE_PAGE_SIZE: u32 = 100;

/// Timeline refresh configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSyncConfig {
    /// Number of entries requested from the backend.
    pub page_size: u32,
}

impl Default for TimelineSyncConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_TIMELINE_PAGE_SIZE,
        }
    }
}

/// Cached projection with the generation of the fetch that produced it.
#[derive(Debug)]
struct CachedBug {
    generation: u64,
    bug: Bug,
}

#[derive(Debug, Default)]
struct CacheState {
    bugs: HashMap<String, CachedBug>,
    /// Last generation handed out per bug.
    generations: HashMap<String, u64>,
}

/// Cached bug projections, keyed by the identifier the bug was loaded with.
///
/// Every fetch takes a generation before it starts. A result is only stored
/// if no later-started fetch has been stored already, so a slow response can
/// never replace a newer one.
#[derive(Debug, Default)]
pub struct TimelineCache {
    state: RwLock<CacheState>,
}

impl TimelineCache {
    /// Snapshot of the cached bug.
    pub async fn get(&self, bug_id: &str) -> Option<Bug> {
        self.state
            .read()
            .await
            .bugs
            .get(bug_id)
            .map(|cached| cached.bug.clone())
    }

    /// Cached timeline entries, empty when the bug was never loaded.
    pub async fn timeline(&self, bug_id: &str) -> Vec<TimelineEntry> {
        self.state
            .read()
            .await
            .bugs
            .get(bug_id)
            .map(|cached| cached.bug.timeline.clone())
            .unwrap_or_default()
    }

    /// Cached status of the bug.
    pub async fn status(&self, bug_id: &str) -> Option<BugStatus> {
        self.state
            .read()
            .await
            .bugs
            .get(bug_id)
            .map(|cached| cached.bug.status)
    }

    /// Reserve the generation for a fetch about to start.
    async fn begin(&self, bug_id: &str) -> u64 {
        let mut state = self.state.write().await;
        let generation = state.generations.entry(bug_id.to_string()).or_insert(0);
        *generation += 1;
        *generation
    }

    /// Store a fetched projection unless a later fetch is already stored.
    ///
    /// Returns the projection now in the cache and whether it was replaced.
    async fn replace(&self, bug_id: &str, generation: u64, bug: Bug) -> (Bug, bool) {
        let mut state = self.state.write().await;

        if let Some(current) = state.bugs.get(bug_id) {
            if current.generation > generation {
                return (current.bug.clone(), false);
            }
        }

        state.bugs.insert(
            bug_id.to_string(),
            CachedBug {
                generation,
                bug: bug.clone(),
            },
        );
        (bug, true)
    }
}

/// Fetches the authoritative timeline and swaps it into the cache.
#[derive(Debug)]
pub struct TimelineSync {
    config: TimelineSyncConfig,
    cache: TimelineCache,
    events: EventBus,
}

impl TimelineSync {
    /// Create a timeline sync with an empty cache.
    pub fn new(config: TimelineSyncConfig, events: EventBus) -> Self {
        Self {
            config,
            cache: TimelineCache::default(),
            events,
        }
    }

    /// Read access to the cached projections.
    pub fn cache(&self) -> &TimelineCache {
        &self.cache
    }

    /// Configured page size.
    pub fn page_size(&self) -> u32 {
        self.config.page_size
    }

    /// Fetch the first page of the bug's timeline and replace the cached copy.
    ///
    /// On failure the previous projection is left as it was. A response that
    /// arrives after a later-started refresh was stored is dropped, and the
    /// newer cached projection is returned instead.
    pub async fn resync<B: BugBackend>(&self, backend: &B, bug_id: &str) -> Result<Bug, AppError> {
        let generation = self.cache.begin(bug_id).await;
        let fetched = backend.timeline(bug_id, self.config.page_size).await?;

        let (bug, replaced) = self.cache.replace(bug_id, generation, fetched).await;
        if !replaced {
            log::debug!(
                "[timeline] Dropping out-of-date response for {} (generation {})",
                bug_id,
                generation
            );
            return Ok(bug);
        }

        log::debug!(
            "[timeline] Replacing {} with {} entries ({})",
            bug_id,
            bug.timeline.len(),
            bug.status
        );
        self.events.timeline_replaced(bug_id, bug.timeline.len());

        Ok(bug)
    }
}

//! In-process page cache for public catalog responses.
//!
//! Serialized JSON payloads are cached per request path so repeated catalog
//! reads skip the database. The revalidation endpoint evicts individual
//! paths; admin mutations flush the whole cache.

use std::time::Duration;

use moka::future::Cache;

/// Entries expire after this TTL even without explicit revalidation.
const PAGE_TTL: Duration = Duration::from_secs(300);

/// Maximum number of cached payloads.
const MAX_PAGES: u64 = 1024;

/// Cache of rendered JSON payloads keyed by request path.
#[derive(Clone)]
pub struct PageCache {
    inner: Cache<String, serde_json::Value>,
}

impl PageCache {
    pub fn new() -> Self {
        Self {
            inner: Cache::builder()
                .time_to_live(PAGE_TTL)
                .max_capacity(MAX_PAGES)
                .build(),
        }
    }

    /// Look up a cached payload.
    pub async fn get(&self, path: &str) -> Option<serde_json::Value> {
        self.inner.get(path).await
    }

    /// Store a payload for a path.
    pub async fn insert(&self, path: String, payload: serde_json::Value) {
        self.inner.insert(path, payload).await;
    }

    /// Evict a single path.
    pub async fn invalidate(&self, path: &str) {
        self.inner.invalidate(path).await;
    }

    /// Evict everything. Used after admin mutations, where computing the
    /// affected path set is not worth the bookkeeping.
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageCache")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}

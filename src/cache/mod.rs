//! The HTTP cache engine (spec §4.5): four cache policies, directive
//! parsing, and an in-memory/disk/hybrid `CacheStorage` implementation.

mod directives;
mod disk;
mod entry;
mod hybrid;
mod memory;
mod storage;

pub use directives::CacheControlDirectives;
pub use disk::DiskCacheStorage;
pub use entry::CacheEntry;
pub use hybrid::HybridCacheStorage;
pub use memory::MemoryCacheStorage;
pub use storage::{cache_key, CacheStorage};

use std::sync::Arc;
use std::time::Duration;

use crate::error::ClientError;
use crate::model::{Request, Response};

/// Per-request cache policy (spec §4.5 table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// If a fresh entry exists, return it with no network call; else fetch
    /// and cache 2xx responses.
    #[default]
    UseCache,
    /// Always fetch; cache 2xx responses for future use (subject to `no-store`).
    IgnoreCache,
    /// Issue a conditional request against any existing entry.
    Revalidate,
    /// Follow HTTP cache semantics end to end.
    RespectHeaders,
}

/// Owns a [`CacheStorage`] and the default TTL used when a response has no
/// `max-age`. The policy decision tree itself lives in the cache
/// interceptor, which is the thing that actually has a `Chain` to call
/// `proceed` on; this engine is the storage-facing half of that split.
#[derive(Clone)]
pub struct CacheEngine {
    storage: Arc<dyn CacheStorage>,
    default_ttl: Duration,
}

impl CacheEngine {
    pub fn new(storage: Arc<dyn CacheStorage>) -> Self {
        Self {
            storage,
            default_ttl: Duration::from_secs(5 * 60),
        }
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }

    pub async fn fresh_response(&self, request: &Request) -> Option<Response> {
        self.storage.lookup(request).await
    }

    pub async fn entry(&self, request: &Request) -> Option<CacheEntry> {
        self.storage.entry(request).await
    }

    /// Store `response` for `request` if it is a cacheable 2xx GET and does
    /// not carry `no-store` (invariant I3).
    pub async fn store_if_cacheable(&self, request: &Request, response: &Response) -> Result<(), ClientError> {
        if !response.is_successful() {
            return Ok(());
        }
        let entry = CacheEntry::from_response(response.clone(), std::time::SystemTime::now(), self.default_ttl);
        self.storage.store(request, entry).await
    }

    pub async fn remove(&self, request: &Request) {
        self.storage.remove(request).await
    }
}

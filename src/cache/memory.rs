//! In-memory LRU-backed [`CacheStorage`] (spec §4.5).

use std::num::NonZeroUsize;
use std::time::SystemTime;

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::Mutex;

use super::entry::CacheEntry;
use super::storage::{cache_key, is_cacheable_request, CacheStorage};
use crate::error::ClientError;
use crate::model::{Request, Response};

/// Evicts the least-recently-used entry on capacity overflow.
pub struct MemoryCacheStorage {
    entries: Mutex<LruCache<String, CacheEntry>>,
}

impl MemoryCacheStorage {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn lookup(&self, request: &Request) -> Option<Response> {
        if !is_cacheable_request(request) {
            return None;
        }
        let mut entries = self.entries.lock().await;
        let entry = entries.get(&cache_key(request))?;
        if entry.is_expired(SystemTime::now()) {
            return None;
        }
        Some(entry.response.clone())
    }

    async fn entry(&self, request: &Request) -> Option<CacheEntry> {
        let mut entries = self.entries.lock().await;
        entries.get(&cache_key(request)).cloned()
    }

    async fn store(&self, request: &Request, entry: CacheEntry) -> Result<(), ClientError> {
        if !is_cacheable_request(request) || entry.should_not_store() {
            return Ok(());
        }
        self.entries.lock().await.put(cache_key(request), entry);
        Ok(())
    }

    async fn remove(&self, request: &Request) {
        self.entries.lock().await.pop(&cache_key(request));
    }

    async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

//! An in-memory LRU in front of a disk-backed store: disk hits are
//! promoted into memory on read (spec §4.5).

use async_trait::async_trait;
use std::sync::Arc;

use super::entry::CacheEntry;
use super::storage::CacheStorage;
use crate::error::ClientError;
use crate::model::{Request, Response};

pub struct HybridCacheStorage {
    memory: Arc<dyn CacheStorage>,
    disk: Arc<dyn CacheStorage>,
}

impl HybridCacheStorage {
    pub fn new(memory: Arc<dyn CacheStorage>, disk: Arc<dyn CacheStorage>) -> Self {
        Self { memory, disk }
    }
}

#[async_trait]
impl CacheStorage for HybridCacheStorage {
    async fn lookup(&self, request: &Request) -> Option<Response> {
        if let Some(response) = self.memory.lookup(request).await {
            return Some(response);
        }

        let entry = self.disk.entry(request).await?;
        if entry.is_expired(std::time::SystemTime::now()) {
            return None;
        }
        let response = entry.response.clone();
        let _ = self.memory.store(request, entry).await;
        Some(response)
    }

    async fn entry(&self, request: &Request) -> Option<CacheEntry> {
        if let Some(entry) = self.memory.entry(request).await {
            return Some(entry);
        }
        self.disk.entry(request).await
    }

    async fn store(&self, request: &Request, entry: CacheEntry) -> Result<(), ClientError> {
        self.disk.store(request, entry.clone()).await?;
        self.memory.store(request, entry).await
    }

    async fn remove(&self, request: &Request) {
        self.memory.remove(request).await;
        self.disk.remove(request).await;
    }

    async fn clear(&self) {
        self.memory.clear().await;
        self.disk.clear().await;
    }
}

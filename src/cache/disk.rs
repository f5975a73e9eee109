//! File-per-entry disk [`CacheStorage`] with a sidecar index (spec §6,
//! "Persisted disk-cache layout").
//!
//! Each entry is serialized to its own file under `dir`, named by the
//! SHA-256 of its cache key (reusing the `sha2` dependency pulled in for
//! certificate pinning). A JSON sidecar, `index.json`, maps cache keys to
//! their file names so `entry`/`lookup` don't need to list the directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::sync::Mutex;

use super::directives::CacheControlDirectives;
use super::entry::CacheEntry;
use super::storage::{cache_key, is_cacheable_request, CacheStorage};
use crate::error::ClientError;
use crate::model::{Headers, Request, Response};

#[derive(Debug, Serialize, Deserialize)]
struct PersistedDirectives {
    max_age: Option<u64>,
    no_cache: bool,
    no_store: bool,
    must_revalidate: bool,
    public: bool,
    private: bool,
}

impl From<&CacheControlDirectives> for PersistedDirectives {
    fn from(d: &CacheControlDirectives) -> Self {
        Self {
            max_age: d.max_age,
            no_cache: d.no_cache,
            no_store: d.no_store,
            must_revalidate: d.must_revalidate,
            public: d.public,
            private: d.private,
        }
    }
}

impl From<PersistedDirectives> for CacheControlDirectives {
    fn from(d: PersistedDirectives) -> Self {
        Self {
            max_age: d.max_age,
            no_cache: d.no_cache,
            no_store: d.no_store,
            must_revalidate: d.must_revalidate,
            public: d.public,
            private: d.private,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedEntry {
    status: u16,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    created_at_unix: u64,
    expires_at_unix: Option<u64>,
    etag: Option<String>,
    last_modified: Option<String>,
    directives: PersistedDirectives,
}

fn to_unix(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO).as_secs()
}

fn from_unix(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub struct DiskCacheStorage {
    dir: PathBuf,
    index: Mutex<HashMap<String, String>>,
}

impl DiskCacheStorage {
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, ClientError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await.map_err(ClientError::from)?;

        let index_path = dir.join("index.json");
        let index = match fs::read(&index_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(_) => HashMap::new(),
        };

        Ok(Self {
            dir,
            index: Mutex::new(index),
        })
    }

    fn file_name_for(key: &str) -> String {
        format!("{}.cache", hex_encode(&Sha256::digest(key.as_bytes())))
    }

    async fn persist_index(&self, index: &HashMap<String, String>) -> Result<(), ClientError> {
        let bytes = serde_json::to_vec(index).map_err(ClientError::encoding)?;
        fs::write(self.dir.join("index.json"), bytes)
            .await
            .map_err(ClientError::from)
    }

    async fn read_persisted(&self, key: &str) -> Option<PersistedEntry> {
        let file_name = {
            let index = self.index.lock().await;
            index.get(key)?.clone()
        };
        let bytes = fs::read(self.dir.join(file_name)).await.ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    fn to_entry(&self, request: &Request, persisted: PersistedEntry) -> CacheEntry {
        let mut headers = Headers::new();
        for (name, value) in &persisted.headers {
            let _ = headers.append(name, value);
        }
        let response = Response::new(
            std::sync::Arc::new(request.clone()),
            persisted.status,
            headers,
            persisted.body,
        );
        CacheEntry {
            response,
            created_at: from_unix(persisted.created_at_unix),
            etag: persisted.etag,
            last_modified: persisted.last_modified,
            expires_at: persisted.expires_at_unix.map(from_unix),
            directives: persisted.directives.into(),
        }
    }
}

#[async_trait]
impl CacheStorage for DiskCacheStorage {
    async fn lookup(&self, request: &Request) -> Option<Response> {
        if !is_cacheable_request(request) {
            return None;
        }
        let entry = self.entry(request).await?;
        if entry.is_expired(SystemTime::now()) {
            return None;
        }
        Some(entry.response)
    }

    async fn entry(&self, request: &Request) -> Option<CacheEntry> {
        let key = cache_key(request);
        let persisted = self.read_persisted(&key).await?;
        Some(self.to_entry(request, persisted))
    }

    async fn store(&self, request: &Request, entry: CacheEntry) -> Result<(), ClientError> {
        if !is_cacheable_request(request) || entry.should_not_store() {
            return Ok(());
        }

        let key = cache_key(request);
        let file_name = Self::file_name_for(&key);
        let persisted = PersistedEntry {
            status: entry.response.status,
            headers: entry
                .response
                .headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: entry.response.body.clone(),
            created_at_unix: to_unix(entry.created_at),
            expires_at_unix: entry.expires_at.map(to_unix),
            etag: entry.etag,
            last_modified: entry.last_modified,
            directives: (&entry.directives).into(),
        };

        let bytes = serde_json::to_vec(&persisted).map_err(ClientError::encoding)?;
        fs::write(self.dir.join(&file_name), bytes)
            .await
            .map_err(ClientError::from)?;

        let mut index = self.index.lock().await;
        index.insert(key, file_name);
        self.persist_index(&index).await
    }

    async fn remove(&self, request: &Request) {
        let key = cache_key(request);
        let file_name = {
            let mut index = self.index.lock().await;
            let file_name = index.remove(&key);
            let _ = self.persist_index(&index).await;
            file_name
        };
        if let Some(file_name) = file_name {
            let _ = fs::remove_file(self.dir.join(file_name)).await;
        }
    }

    async fn clear(&self) {
        let mut index = self.index.lock().await;
        for file_name in index.values() {
            let _ = fs::remove_file(self.dir.join(file_name)).await;
        }
        index.clear();
        let _ = self.persist_index(&index).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn store_with(dir: &Path, url: &str, body: &str) -> (DiskCacheStorage, Request) {
        let storage = DiskCacheStorage::open(dir).await.unwrap();
        let request = Request::get(url).build();
        let response = Response::new(
            std::sync::Arc::new(request.clone()),
            200,
            Headers::new(),
            Some(body.as_bytes().to_vec()),
        );
        let entry = CacheEntry::from_response(response, SystemTime::now(), Duration::from_secs(300));
        storage.store(&request, entry).await.unwrap();
        (storage, request)
    }

    #[tokio::test]
    async fn store_then_lookup_round_trips_across_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let (_, request) = store_with(tmp.path(), "https://example.com/a", "A").await;

        let reopened = DiskCacheStorage::open(tmp.path()).await.unwrap();
        let response = reopened.lookup(&request).await.unwrap();
        assert_eq!(response.body_bytes(), b"A");
    }

    #[tokio::test]
    async fn remove_deletes_the_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let (storage, request) = store_with(tmp.path(), "https://example.com/a", "A").await;

        storage.remove(&request).await;
        assert!(storage.lookup(&request).await.is_none());
    }

    #[tokio::test]
    async fn no_store_directive_is_never_persisted() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = DiskCacheStorage::open(tmp.path()).await.unwrap();
        let request = Request::get("https://example.com/a").build();
        let mut headers = Headers::new();
        headers.insert("Cache-Control", "no-store").unwrap();
        let response = Response::new(std::sync::Arc::new(request.clone()), 200, headers, Some(b"A".to_vec()));
        let entry = CacheEntry::from_response(response, SystemTime::now(), Duration::from_secs(300));

        storage.store(&request, entry).await.unwrap();
        assert!(storage.lookup(&request).await.is_none());
    }
}

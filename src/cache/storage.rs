//! The [`CacheStorage`] seam (spec §4.5), grounded on the `CacheManager`
//! trait in `aleasims-http-cache`'s `get`/`put`/`delete` shape, adapted to
//! this crate's `CacheEntry` and expiration semantics.

use async_trait::async_trait;

use crate::cache::entry::CacheEntry;
use crate::error::ClientError;
use crate::model::{Method, Request, Response};

/// Key requests by method + URL only (spec.md §9, open question (a)): two
/// requests to the same URL with differing `Accept` headers collide. This
/// mirrors the source behavior as-is; callers who need header-sensitive
/// keys vary the URL (e.g. a query parameter) instead.
pub fn cache_key(request: &Request) -> String {
    format!("{}:{}", request.method.as_str(), request.url)
}

#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// The cached response for `request`, or `None` if absent or expired.
    /// Only ever returns something for GET requests.
    async fn lookup(&self, request: &Request) -> Option<Response>;

    /// The full entry for `request`, including expired ones — needed by
    /// the revalidation path, which must see a stale entry's `ETag`.
    async fn entry(&self, request: &Request) -> Option<CacheEntry>;

    /// Persist `entry` for `request`. Implementations MUST refuse entries
    /// with `should_not_store()` (invariant I3) and MUST ignore non-GET
    /// requests.
    async fn store(&self, request: &Request, entry: CacheEntry) -> Result<(), ClientError>;

    async fn remove(&self, request: &Request);

    async fn clear(&self);
}

pub(crate) fn is_cacheable_request(request: &Request) -> bool {
    matches!(request.method, Method::Get)
}

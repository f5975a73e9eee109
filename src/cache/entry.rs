//! [`CacheEntry`] (spec §3) — a stored response plus the metadata needed
//! to decide freshness and revalidation without re-reading the body.

use std::time::{Duration, SystemTime};

use crate::cache::directives::CacheControlDirectives;
use crate::model::Response;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub response: Response,
    pub created_at: SystemTime,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub expires_at: Option<SystemTime>,
    pub directives: CacheControlDirectives,
}

impl CacheEntry {
    /// Build an entry from a freshly received response, extracting `ETag`
    /// and `Last-Modified`, parsing `Cache-Control`, and computing
    /// expiration from `max-age` or falling back to `default_ttl`.
    pub fn from_response(response: Response, now: SystemTime, default_ttl: Duration) -> Self {
        let directives = response
            .headers
            .get("cache-control")
            .map(CacheControlDirectives::parse)
            .unwrap_or_default();

        let expires_at = Some(match directives.max_age {
            Some(secs) => now + Duration::from_secs(secs),
            None => now + default_ttl,
        });

        Self {
            etag: response.headers.get("etag").map(str::to_string),
            last_modified: response.headers.get("last-modified").map(str::to_string),
            response,
            created_at: now,
            expires_at,
            directives,
        }
    }

    pub fn is_expired(&self, now: SystemTime) -> bool {
        match self.expires_at {
            Some(expires_at) => now >= expires_at,
            None => false,
        }
    }

    /// `true` iff `no-cache` is set, or the entry is expired and
    /// `must-revalidate` is set.
    pub fn must_revalidate(&self, now: SystemTime) -> bool {
        self.directives.no_cache || (self.is_expired(now) && self.directives.must_revalidate)
    }

    pub fn should_not_store(&self) -> bool {
        self.directives.no_store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Headers, Request};
    use std::sync::Arc;

    fn response_with_cache_control(value: &str) -> Response {
        let mut headers = Headers::new();
        headers.insert("Cache-Control", value).unwrap();
        Response::new(
            Arc::new(Request::get("https://example.com").build()),
            200,
            headers,
            Some(b"A".to_vec()),
        )
    }

    #[test]
    fn max_age_zero_is_always_expired() {
        let now = SystemTime::now();
        let entry = CacheEntry::from_response(
            response_with_cache_control("max-age=0"),
            now,
            Duration::from_secs(300),
        );
        assert!(entry.is_expired(now));
        assert!(entry.is_expired(now + Duration::from_secs(1)));
    }

    #[test]
    fn must_revalidate_true_when_no_cache_present() {
        let now = SystemTime::now();
        let entry = CacheEntry::from_response(
            response_with_cache_control("no-cache, max-age=600"),
            now,
            Duration::from_secs(300),
        );
        assert!(!entry.is_expired(now));
        assert!(entry.must_revalidate(now));
    }

    #[test]
    fn should_not_store_reflects_no_store() {
        let now = SystemTime::now();
        let entry = CacheEntry::from_response(response_with_cache_control("no-store"), now, Duration::from_secs(300));
        assert!(entry.should_not_store());
    }

    #[test]
    fn missing_header_falls_back_to_default_ttl() {
        let now = SystemTime::now();
        let response = Response::new(
            Arc::new(Request::get("https://example.com").build()),
            200,
            Headers::new(),
            None,
        );
        let entry = CacheEntry::from_response(response, now, Duration::from_secs(300));
        assert!(!entry.is_expired(now));
        assert!(entry.is_expired(now + Duration::from_secs(301)));
    }
}

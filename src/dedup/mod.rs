//! Request deduplication (spec §4.7): coalesces concurrent identical
//! in-flight calls by fingerprint.
//!
//! Grounded on the same single-flight pattern as
//! [`crate::auth::RefreshCoordinator`] — a `Mutex`-protected map of
//! `fingerprint -> Shared<BoxFuture<..>>`, cleared on every completion path
//! via a scoped guard — generalized from a single refresh slot to a map
//! keyed per request.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::error::ClientError;
use crate::model::Request;

type SharedResponse = Shared<BoxFuture<'static, Result<Arc<crate::model::Response>, ClientError>>>;

/// Canonical fingerprint for deduplication: method + canonical URL + sorted
/// headers + body hash (spec §4.7). Differs for differing methods and for
/// differing header values (spec §8).
pub fn fingerprint(request: &Request) -> String {
    let mut hasher = Sha256::new();
    hasher.update(request.method.as_str().as_bytes());
    hasher.update(b"\n");
    hasher.update(request.url.as_bytes());
    hasher.update(b"\n");
    hasher.update(request.headers.canonical_sorted().as_bytes());
    hasher.update(b"\n");
    if let Some(body) = &request.body {
        // Best-effort: a body that fails to encode (e.g. a json encoder
        // error) simply contributes no bytes, so the fingerprint still
        // reflects method/url/headers.
        if let Ok(encoded) = body.encode() {
            hasher.update(&encoded.bytes);
        }
    }
    format!("{:x}", hasher.finalize())
}

struct ClearSlotGuard {
    map: Arc<Mutex<HashMap<String, SharedResponse>>>,
    key: String,
}

impl Drop for ClearSlotGuard {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.map.try_lock() {
            guard.remove(&self.key);
        } else {
            let map = self.map.clone();
            let key = self.key.clone();
            tokio::spawn(async move {
                map.lock().await.remove(&key);
            });
        }
    }
}

/// Coalesces concurrent calls with the same [`fingerprint`] into a single
/// in-flight execution.
#[derive(Default)]
pub struct Deduplicator {
    in_flight: Arc<Mutex<HashMap<String, SharedResponse>>>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `exec` at most once per distinct fingerprint among concurrent
    /// callers; every caller observes the same result.
    pub async fn deduplicate<F, Fut>(&self, request: &Request, exec: F) -> Result<Arc<crate::model::Response>, ClientError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Result<crate::model::Response, ClientError>> + Send + 'static,
    {
        let key = fingerprint(request);

        // Check-and-insert under one lock hold: otherwise two racing callers
        // with the same fingerprint could both see no in-flight entry and
        // each spawn their own `exec`, defeating deduplication.
        let shared = {
            let mut guard = self.in_flight.lock().await;
            if let Some(existing) = guard.get(&key) {
                existing.clone()
            } else {
                let map = self.in_flight.clone();
                let key_for_guard = key.clone();
                let fut: BoxFuture<'static, Result<Arc<crate::model::Response>, ClientError>> = async move {
                    let _guard = ClearSlotGuard {
                        map,
                        key: key_for_guard,
                    };
                    exec().await.map(Arc::new)
                }
                .boxed();
                let shared = fut.shared();
                guard.insert(key, shared.clone());
                shared
            }
        };

        shared.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Headers, Method, RequestBuilder};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[test]
    fn fingerprint_differs_for_differing_methods() {
        let get = RequestBuilder::new(Method::Get, "https://example.com/x").build();
        let post = RequestBuilder::new(Method::Post, "https://example.com/x").build();
        assert_ne!(fingerprint(&get), fingerprint(&post));
    }

    #[test]
    fn fingerprint_differs_for_differing_header_values() {
        let a = RequestBuilder::new(Method::Get, "https://example.com/x")
            .header("Accept", "application/json")
            .unwrap()
            .build();
        let b = RequestBuilder::new(Method::Get, "https://example.com/x")
            .header("Accept", "text/html")
            .unwrap()
            .build();
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[tokio::test]
    async fn five_concurrent_identical_requests_invoke_exec_once() {
        let dedup = Arc::new(Deduplicator::new());
        let calls = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..5 {
            let dedup = dedup.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                let request = RequestBuilder::new(Method::Get, "https://example.com/x").build();
                dedup
                    .deduplicate(&request, move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(crate::model::Response::new(
                            Arc::new(RequestBuilder::new(Method::Get, "https://example.com/x").build()),
                            200,
                            Headers::new(),
                            Some(b"A".to_vec()),
                        ))
                    })
                    .await
            }));
        }

        for handle in handles {
            let response = handle.await.unwrap().unwrap();
            assert_eq!(response.body_bytes(), b"A");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn a_new_call_can_start_after_the_in_flight_entry_clears() {
        let dedup = Deduplicator::new();
        let calls = Arc::new(AtomicU32::new(0));
        let request = RequestBuilder::new(Method::Get, "https://example.com/x").build();

        for _ in 0..2 {
            let calls = calls.clone();
            dedup
                .deduplicate(&request, move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(crate::model::Response::new(
                        Arc::new(RequestBuilder::new(Method::Get, "https://example.com/x").build()),
                        200,
                        Headers::new(),
                        None,
                    ))
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}

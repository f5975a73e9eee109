//! [`CacheInterceptor`] — wires the four cache policies (spec §4.5) into
//! the interceptor chain.

use async_trait::async_trait;
use std::sync::Arc;

use super::chain::{Chain, Interceptor};
use crate::cache::{CacheEngine, CachePolicy};
use crate::error::ClientError;
use crate::metrics::{CacheEventKind, MetricsSink};
use crate::model::{Method, Request, Response};

pub struct CacheInterceptor {
    engine: CacheEngine,
    metrics: Option<Arc<dyn MetricsSink>>,
}

impl CacheInterceptor {
    pub fn new(engine: CacheEngine) -> Self {
        Self { engine, metrics: None }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn record(&self, kind: CacheEventKind, request: &Request) {
        if let Some(metrics) = &self.metrics {
            metrics.record_cache(kind, request);
        }
    }

    fn conditional_request(request: &Request, etag: &Option<String>, last_modified: &Option<String>) -> Request {
        let mut next = request.clone();
        if let Some(etag) = etag {
            let _ = next.headers.insert("If-None-Match", etag);
        }
        if let Some(last_modified) = last_modified {
            let _ = next.headers.insert("If-Modified-Since", last_modified);
        }
        next
    }

    async fn revalidate(&self, chain: &mut Chain<'_>, request: Request) -> Result<Response, ClientError> {
        let Some(entry) = self.engine.entry(&request).await else {
            return self.fetch_and_cache(chain, request).await;
        };

        let conditional = Self::conditional_request(&request, &entry.etag, &entry.last_modified);
        let response = chain.proceed(conditional).await?;

        if response.status == 304 {
            self.record(CacheEventKind::Revalidated, &request);
            return Ok(entry.response);
        }

        if response.is_successful() {
            self.engine.store_if_cacheable(&request, &response).await?;
            self.record(CacheEventKind::Stored, &request);
        }
        Ok(response)
    }

    async fn fetch_and_cache(&self, chain: &mut Chain<'_>, request: Request) -> Result<Response, ClientError> {
        self.record(CacheEventKind::Miss, &request);
        let response = chain.proceed(request.clone()).await?;
        if response.is_successful() {
            self.engine.store_if_cacheable(&request, &response).await?;
            self.record(CacheEventKind::Stored, &request);
        }
        Ok(response)
    }
}

#[async_trait]
impl Interceptor for CacheInterceptor {
    async fn intercept(&self, chain: &mut Chain<'_>) -> Result<Response, ClientError> {
        let request = chain.request().clone();

        if request.method != Method::Get {
            return chain.proceed(request).await;
        }

        match request.cache_policy {
            CachePolicy::UseCache => {
                if let Some(cached) = self.engine.fresh_response(&request).await {
                    self.record(CacheEventKind::Hit, &request);
                    return Ok(cached);
                }
                self.fetch_and_cache(chain, request).await
            }
            CachePolicy::IgnoreCache => self.fetch_and_cache(chain, request).await,
            CachePolicy::Revalidate => self.revalidate(chain, request).await,
            CachePolicy::RespectHeaders => {
                if let Some(entry) = self.engine.entry(&request).await {
                    let now = std::time::SystemTime::now();
                    if entry.should_not_store() {
                        self.engine.remove(&request).await;
                        return self.fetch_and_cache(chain, request).await;
                    }
                    if entry.must_revalidate(now) {
                        return self.revalidate(chain, request).await;
                    }
                    if !entry.is_expired(now) {
                        self.record(CacheEventKind::Hit, &request);
                        return Ok(entry.response);
                    }
                    return self.revalidate(chain, request).await;
                }
                self.fetch_and_cache(chain, request).await
            }
        }
    }

    fn name(&self) -> &'static str {
        "CacheInterceptor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheStorage;
    use crate::model::{Headers, Priority, RequestBuilder};
    use crate::transport::Transport;
    use std::num::NonZeroUsize;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingTransport {
        calls: Arc<AtomicU32>,
        status: u16,
        body: &'static str,
        etag: Option<&'static str>,
    }

    #[async_trait]
    impl Transport for CountingTransport {
        async fn execute(&self, request: Request) -> Result<Response, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut headers = Headers::new();
            let mut status = self.status;
            if let Some(etag) = self.etag {
                if request.headers.get("if-none-match") == Some(etag) {
                    status = 304;
                } else {
                    headers.insert("ETag", etag).unwrap();
                }
            }
            Ok(Response::new(
                Arc::new(request),
                status,
                headers,
                Some(self.body.as_bytes().to_vec()),
            ))
        }
    }

    fn engine() -> CacheEngine {
        CacheEngine::new(Arc::new(MemoryCacheStorage::new(NonZeroUsize::new(8).unwrap())))
    }

    fn request_with_policy(policy: CachePolicy) -> Request {
        RequestBuilder::new(Method::Get, "https://example.com/y")
            .cache_policy(policy)
            .priority(Priority::Normal)
            .build()
    }

    #[tokio::test]
    async fn use_cache_avoids_transport_on_second_call() {
        let calls = Arc::new(AtomicU32::new(0));
        let transport = CountingTransport {
            calls: calls.clone(),
            status: 200,
            body: "A",
            etag: None,
        };
        let interceptors: Vec<Arc<dyn Interceptor>> = vec![Arc::new(CacheInterceptor::new(engine()))];

        let first = Chain::execute(request_with_policy(CachePolicy::UseCache), &interceptors, &transport)
            .await
            .unwrap();
        assert_eq!(first.body_bytes(), b"A");

        let second = Chain::execute(request_with_policy(CachePolicy::UseCache), &interceptors, &transport)
            .await
            .unwrap();
        assert_eq!(second.body_bytes(), b"A");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn revalidate_sends_if_none_match_and_returns_cached_body_on_304() {
        let calls = Arc::new(AtomicU32::new(0));
        let transport = CountingTransport {
            calls: calls.clone(),
            status: 200,
            body: "A",
            etag: Some("\"v1\""),
        };
        let interceptors: Vec<Arc<dyn Interceptor>> = vec![Arc::new(CacheInterceptor::new(engine()))];

        let first = Chain::execute(request_with_policy(CachePolicy::Revalidate), &interceptors, &transport)
            .await
            .unwrap();
        assert_eq!(first.body_bytes(), b"A");

        let second = Chain::execute(request_with_policy(CachePolicy::Revalidate), &interceptors, &transport)
            .await
            .unwrap();
        assert_eq!(second.body_bytes(), b"A");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}

//! Ordering policy: assembles the effective interceptor list (spec §4.1).
//!
//! `sort_by_priority(prioritized)` ++ `adapt(request_only)` ++ `general` ++
//! `adapt(response_only)`. The priority sort is stable and descending; ties
//! preserve insertion order (guaranteed by `sort_by_key`'s stability).

use std::cmp::Reverse;
use std::sync::Arc;

use super::adapters::{RequestInterceptor, RequestOnlyAdapter, ResponseInterceptor, ResponseOnlyAdapter};
use super::chain::Interceptor;

struct Prioritized {
    priority: i32,
    interceptor: Arc<dyn Interceptor>,
}

/// Builds the concatenated, ordered interceptor list consumed by
/// [`Chain::execute`](super::Chain::execute).
#[derive(Default)]
pub struct InterceptorChainBuilder {
    prioritized: Vec<Prioritized>,
    request_only: Vec<Arc<dyn RequestInterceptor>>,
    general: Vec<Arc<dyn Interceptor>>,
    response_only: Vec<Arc<dyn ResponseInterceptor>>,
}

impl InterceptorChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fully general interceptor with an explicit priority. Higher
    /// values run first; among equal priorities, insertion order is kept.
    pub fn with_prioritized(mut self, priority: i32, interceptor: Arc<dyn Interceptor>) -> Self {
        self.prioritized.push(Prioritized {
            priority,
            interceptor,
        });
        self
    }

    pub fn with_request_only(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.request_only.push(interceptor);
        self
    }

    /// Add a general interceptor, run after prioritized and request-only
    /// interceptors, in insertion order.
    pub fn with_general(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.general.push(interceptor);
        self
    }

    pub fn with_response_only(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        self.response_only.push(interceptor);
        self
    }

    pub fn build(self) -> Vec<Arc<dyn Interceptor>> {
        let mut prioritized = self.prioritized;
        prioritized.sort_by_key(|p| Reverse(p.priority));

        let mut effective: Vec<Arc<dyn Interceptor>> =
            prioritized.into_iter().map(|p| p.interceptor).collect();
        effective.extend(
            self.request_only
                .into_iter()
                .map(|r| Arc::new(RequestOnlyAdapter(r)) as Arc<dyn Interceptor>),
        );
        effective.extend(self.general);
        effective.extend(
            self.response_only
                .into_iter()
                .map(|r| Arc::new(ResponseOnlyAdapter(r)) as Arc<dyn Interceptor>),
        );
        effective
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::interceptor::Chain;
    use crate::model::{Method, Response};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct TagInterceptor {
        tag: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Interceptor for TagInterceptor {
        async fn intercept(&self, chain: &mut Chain<'_>) -> Result<Response, ClientError> {
            self.log.lock().unwrap().push(self.tag);
            chain.proceed(chain.request().clone()).await
        }
    }

    struct EchoTransport;
    #[async_trait]
    impl crate::transport::Transport for EchoTransport {
        async fn execute(&self, request: crate::model::Request) -> Result<Response, ClientError> {
            Ok(Response::new(
                std::sync::Arc::new(request),
                200,
                crate::model::Headers::new(),
                None,
            ))
        }
    }

    #[tokio::test]
    async fn priority_ties_preserve_insertion_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let builder = InterceptorChainBuilder::new()
            .with_prioritized(
                1,
                Arc::new(TagInterceptor {
                    tag: "low-first",
                    log: log.clone(),
                }),
            )
            .with_prioritized(
                5,
                Arc::new(TagInterceptor {
                    tag: "high",
                    log: log.clone(),
                }),
            )
            .with_prioritized(
                1,
                Arc::new(TagInterceptor {
                    tag: "low-second",
                    log: log.clone(),
                }),
            );
        let interceptors = builder.build();
        let transport = EchoTransport;
        let request = crate::model::Request::builder(Method::Get, "https://example.com").build();
        Chain::execute(request, &interceptors, &transport)
            .await
            .unwrap();

        assert_eq!(
            log.lock().unwrap().clone(),
            vec!["high", "low-first", "low-second"]
        );
    }
}

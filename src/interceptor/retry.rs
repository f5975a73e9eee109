//! [`RetryInterceptor`] — wires [`RetryExecutor`] into the interceptor chain
//! (spec §4.6). Retries only classified transport-level failures with a
//! fixed delay, and reports each retry through [`MetricsSink`].

use std::sync::Arc;

use async_trait::async_trait;

use super::chain::{Chain, Interceptor};
use crate::error::ClientError;
use crate::metrics::MetricsSink;
use crate::model::{Request, Response};
use crate::retry::RetryExecutor;

pub struct RetryInterceptor {
    executor: RetryExecutor,
    metrics: Option<Arc<dyn MetricsSink>>,
}

impl RetryInterceptor {
    pub fn new(executor: RetryExecutor) -> Self {
        Self { executor, metrics: None }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

#[async_trait]
impl Interceptor for RetryInterceptor {
    async fn intercept(&self, chain: &mut Chain<'_>) -> Result<Response, ClientError> {
        let request = chain.request().clone();
        let mut retries: Vec<(u32, String)> = Vec::new();

        // `retry_chain` takes `chain` as an explicit parameter on each
        // attempt rather than through a captured closure: a closure that
        // captures `&mut Chain` can't return a future reborrowing it without
        // tying every attempt to one umbrella lifetime.
        let result = self
            .executor
            .retry_chain(chain, &request, |attempt, error| {
                retries.push((attempt, error.to_string()))
            })
            .await;

        if let Some(metrics) = &self.metrics {
            for (attempt, reason) in &retries {
                metrics.record_retry(request.method, &request.url, *attempt, reason);
            }
        }

        result
    }

    fn name(&self) -> &'static str {
        "RetryInterceptor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Headers, Method};
    use crate::retry::RetryPolicy;
    use crate::transport::Transport;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct FlakyTransport {
        failures_remaining: AtomicU32,
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl Transport for FlakyTransport {
        async fn execute(&self, request: Request) -> Result<Response, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failures_remaining.load(Ordering::SeqCst) > 0 {
                self.failures_remaining.fetch_sub(1, Ordering::SeqCst);
                return Err(ClientError::transport("connection reset"));
            }
            Ok(Response::new(Arc::new(request), 200, Headers::new(), None))
        }
    }

    #[tokio::test]
    async fn retries_until_success_and_records_retry_count() {
        let calls = Arc::new(AtomicU32::new(0));
        let transport = FlakyTransport {
            failures_remaining: AtomicU32::new(2),
            calls: calls.clone(),
        };
        let executor = RetryExecutor::new(RetryPolicy::new().with_max_retries(3).with_delay(Duration::ZERO));
        let interceptors: Vec<Arc<dyn Interceptor>> = vec![Arc::new(RetryInterceptor::new(executor))];
        let request = Request::builder(Method::Get, "https://example.com").build();

        let response = Chain::execute(request, &interceptors, &transport).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn cancellation_is_attempted_exactly_once() {
        struct CancellingTransport {
            calls: Arc<AtomicU32>,
        }

        #[async_trait]
        impl Transport for CancellingTransport {
            async fn execute(&self, _request: Request) -> Result<Response, ClientError> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Err(ClientError::Cancelled)
            }
        }

        let calls = Arc::new(AtomicU32::new(0));
        let transport = CancellingTransport { calls: calls.clone() };
        let executor = RetryExecutor::new(RetryPolicy::new().with_max_retries(3).with_delay(Duration::ZERO));
        let interceptors: Vec<Arc<dyn Interceptor>> = vec![Arc::new(RetryInterceptor::new(executor))];
        let request = Request::builder(Method::Get, "https://example.com").build();

        let err = Chain::execute(request, &interceptors, &transport).await.unwrap_err();
        assert!(matches!(err, ClientError::Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

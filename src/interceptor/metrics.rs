//! [`MetricsInterceptor`] — wraps chain invocation to record `RequestEvent`
//! and `ErrorEvent`s with start/end timestamps and tag injection (spec §4.8).

use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;

use super::chain::{Chain, Interceptor};
use crate::error::ClientError;
use crate::metrics::{ErrorEvent, MetricsSink, RequestEvent};
use crate::model::Response;

pub struct MetricsInterceptor {
    metrics: Arc<dyn MetricsSink>,
    tags: Vec<(String, String)>,
}

impl MetricsInterceptor {
    pub fn new(metrics: Arc<dyn MetricsSink>) -> Self {
        Self { metrics, tags: Vec::new() }
    }

    /// Tags injected into every `RequestEvent` this interceptor records.
    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((name.into(), value.into()));
        self
    }
}

#[async_trait]
impl Interceptor for MetricsInterceptor {
    async fn intercept(&self, chain: &mut Chain<'_>) -> Result<Response, ClientError> {
        let request = chain.request().clone();
        let start = SystemTime::now();

        let result = chain.proceed(request.clone()).await;
        let end = SystemTime::now();

        match &result {
            Ok(response) => {
                self.metrics.record_request(RequestEvent {
                    method: request.method,
                    url: request.url.clone(),
                    status: response.status,
                    start,
                    end,
                    response_bytes: response.body_bytes().len(),
                    tags: self.tags.clone(),
                });
            }
            Err(error) => {
                self.metrics.record_error(ErrorEvent {
                    method: request.method,
                    url: request.url.clone(),
                    error_kind: error.to_string(),
                    start,
                    end,
                });
            }
        }

        result
    }

    fn name(&self) -> &'static str {
        "MetricsInterceptor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{CollectorMetricsSink, Event, RecordingCollector};
    use crate::model::{Headers, Method, Request};
    use crate::transport::Transport;
    use std::time::Duration;

    struct EchoTransport;

    #[async_trait]
    impl Transport for EchoTransport {
        async fn execute(&self, request: Request) -> Result<Response, ClientError> {
            Ok(Response::new(Arc::new(request), 200, Headers::new(), Some(b"ok".to_vec())))
        }
    }

    #[tokio::test]
    async fn records_a_request_event_with_status_and_size() {
        let collector = Arc::new(RecordingCollector::new());
        let sink: Arc<dyn MetricsSink> = Arc::new(CollectorMetricsSink::new(collector.clone()));
        let interceptors: Vec<Arc<dyn Interceptor>> =
            vec![Arc::new(MetricsInterceptor::new(sink).with_tag("provider", "test"))];
        let transport = EchoTransport;
        let request = Request::builder(Method::Get, "https://example.com").build();

        Chain::execute(request, &interceptors, &transport).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let events = collector.events().await;
        assert_eq!(events.len(), 1);
        match &events[0] {
            Event::Request(e) => {
                assert_eq!(e.status, 200);
                assert_eq!(e.response_bytes, 2);
                assert_eq!(e.tags, vec![("provider".to_string(), "test".to_string())]);
            }
            other => panic!("expected a request event, got {other:?}"),
        }
    }
}

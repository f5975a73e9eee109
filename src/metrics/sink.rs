//! Synchronous recording façade over the async [`MetricsCollector`] seam.
//!
//! Interceptors (cache, retry, request) record events inline with their
//! control flow and cannot always `.await` a write without threading it
//! through call sites that don't otherwise need to be async. `MetricsSink`
//! is the sync seam they hold instead; [`CollectorMetricsSink`] spawns each
//! recording onto the runtime, mirroring the teacher's fire-and-forget
//! telemetry dispatch in `siumai/src/streaming/telemetry_wrapper.rs`.

use std::sync::Arc;

use super::{CacheEvent, CacheEventKind, ErrorEvent, Event, MetricsCollector, RequestEvent, RetryEvent};
use crate::model::{Method, Request};

pub trait MetricsSink: Send + Sync {
    fn record_cache(&self, kind: CacheEventKind, request: &Request);
    fn record_request(&self, event: RequestEvent);
    fn record_error(&self, event: ErrorEvent);
    fn record_retry(&self, method: Method, url: &str, attempt: u32, reason: &str);
}

/// Adapts an `Arc<dyn MetricsCollector>` to the synchronous [`MetricsSink`]
/// seam.
pub struct CollectorMetricsSink {
    collector: Arc<dyn MetricsCollector>,
}

impl CollectorMetricsSink {
    pub fn new(collector: Arc<dyn MetricsCollector>) -> Self {
        Self { collector }
    }

    fn spawn_record(&self, event: Event) {
        let collector = self.collector.clone();
        tokio::spawn(async move {
            collector.record(event).await;
        });
    }
}

impl MetricsSink for CollectorMetricsSink {
    fn record_cache(&self, kind: CacheEventKind, request: &Request) {
        self.spawn_record(Event::Cache(CacheEvent {
            kind,
            method: request.method,
            url: request.url.clone(),
        }));
    }

    fn record_request(&self, event: RequestEvent) {
        self.spawn_record(Event::Request(event));
    }

    fn record_error(&self, event: ErrorEvent) {
        self.spawn_record(Event::Error(event));
    }

    fn record_retry(&self, method: Method, url: &str, attempt: u32, reason: &str) {
        self.spawn_record(Event::Retry(RetryEvent {
            method,
            url: url.to_string(),
            attempt,
            reason: reason.to_string(),
        }));
    }
}

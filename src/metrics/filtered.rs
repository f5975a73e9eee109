//! Forwards only events satisfying a predicate (spec §4.8).

use async_trait::async_trait;
use std::sync::Arc;

use super::{Event, MetricsCollector};

pub type EventFilter = Arc<dyn Fn(&Event) -> bool + Send + Sync>;

pub struct FilteredCollector {
    inner: Arc<dyn MetricsCollector>,
    filter: EventFilter,
}

impl FilteredCollector {
    pub fn new(inner: Arc<dyn MetricsCollector>, filter: EventFilter) -> Self {
        Self { inner, filter }
    }

    /// Forward only events whose method is in `methods`.
    pub fn methods(inner: Arc<dyn MetricsCollector>, methods: Vec<crate::model::Method>) -> Self {
        Self::new(inner, Arc::new(move |event: &Event| methods.contains(&event.method())))
    }

    /// Forward only `ErrorEvent`s.
    pub fn errors_only(inner: Arc<dyn MetricsCollector>) -> Self {
        Self::new(inner, Arc::new(|event: &Event| event.is_error()))
    }

    /// Forward only events whose URL matches `pattern` (a substring match;
    /// callers wanting regex semantics supply their own predicate via `new`).
    pub fn url_contains(inner: Arc<dyn MetricsCollector>, pattern: String) -> Self {
        Self::new(inner, Arc::new(move |event: &Event| event.url().contains(&pattern)))
    }

    /// Forward only events tagged with `(key, value)`.
    pub fn tag(inner: Arc<dyn MetricsCollector>, key: String, value: String) -> Self {
        Self::new(inner, Arc::new(move |event: &Event| event.tags().iter().any(|(k, v)| *k == key && *v == value)))
    }
}

#[async_trait]
impl MetricsCollector for FilteredCollector {
    async fn record(&self, event: Event) {
        if (self.filter)(&event) {
            self.inner.record(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::events::{ErrorEvent, RequestEvent};
    use crate::metrics::RecordingCollector;
    use crate::model::Method;
    use std::time::SystemTime;

    #[tokio::test]
    async fn only_forwards_error_events() {
        let recording = Arc::new(RecordingCollector::new());
        let filtered = FilteredCollector::errors_only(recording.clone());

        filtered
            .record(Event::Request(RequestEvent {
                method: Method::Get,
                url: "https://example.com".to_string(),
                status: 200,
                start: SystemTime::now(),
                end: SystemTime::now(),
                response_bytes: 0,
                tags: vec![],
            }))
            .await;
        filtered
            .record(Event::Error(ErrorEvent {
                method: Method::Get,
                url: "https://example.com".to_string(),
                error_kind: "TransportError".to_string(),
                start: SystemTime::now(),
                end: SystemTime::now(),
            }))
            .await;

        assert_eq!(recording.events().await.len(), 1);
    }
}

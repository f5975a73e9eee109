//! Rolling-window aggregation: counts, latency percentiles, cache
//! hit-rate, bytes transferred, retry count (spec §4.8).

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::events::CacheEventKind;
use super::{Event, MetricsCollector};

#[derive(Debug, Clone, Default)]
pub struct AggregateSnapshot {
    pub request_count: usize,
    pub error_count: usize,
    pub mean_latency: Duration,
    pub median_latency: Duration,
    pub p95_latency: Duration,
    pub cache_hit_rate: f64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub retry_count: usize,
}

/// Aggregates the most recent `window` events (by insertion order, not
/// wall-clock time — callers wanting a time-bounded window evict old
/// entries themselves by capping `window` to their expected event rate).
pub struct AggregateCollector {
    window: usize,
    events: Mutex<VecDeque<Event>>,
}

impl AggregateCollector {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            events: Mutex::new(VecDeque::with_capacity(window)),
        }
    }

    pub async fn snapshot(&self) -> AggregateSnapshot {
        let events = self.events.lock().await;

        let mut latencies: Vec<Duration> = Vec::new();
        let mut request_count = 0usize;
        let mut error_count = 0usize;
        let mut bytes_in = 0u64;
        let mut cache_hits = 0usize;
        let mut cache_total = 0usize;
        let mut retry_count = 0usize;

        for event in events.iter() {
            match event {
                Event::Request(e) => {
                    request_count += 1;
                    latencies.push(e.end.duration_since(e.start).unwrap_or_default());
                    bytes_in += e.response_bytes as u64;
                }
                Event::Error(_) => error_count += 1,
                Event::Retry(_) => retry_count += 1,
                Event::Cache(e) => {
                    cache_total += 1;
                    if matches!(e.kind, CacheEventKind::Hit | CacheEventKind::Revalidated) {
                        cache_hits += 1;
                    }
                }
            }
        }

        latencies.sort();
        let mean_latency = if latencies.is_empty() {
            Duration::ZERO
        } else {
            latencies.iter().sum::<Duration>() / latencies.len() as u32
        };
        let median_latency = percentile(&latencies, 0.5);
        let p95_latency = percentile(&latencies, 0.95);
        let cache_hit_rate = if cache_total == 0 {
            0.0
        } else {
            cache_hits as f64 / cache_total as f64
        };

        AggregateSnapshot {
            request_count,
            error_count,
            mean_latency,
            median_latency,
            p95_latency,
            cache_hit_rate,
            bytes_in,
            // bytes_out is not observable from events recorded at the response
            // boundary; left for a request-body-aware collector to populate.
            bytes_out: 0,
            retry_count,
        }
    }
}

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let rank = ((sorted.len() - 1) as f64 * p).round() as usize;
    sorted[rank.min(sorted.len() - 1)]
}

#[async_trait]
impl MetricsCollector for AggregateCollector {
    async fn record(&self, event: Event) {
        let mut events = self.events.lock().await;
        if events.len() == self.window {
            events.pop_front();
        }
        events.push_back(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::events::{CacheEvent, RequestEvent};
    use crate::model::Method;
    use std::time::SystemTime;

    #[tokio::test]
    async fn computes_cache_hit_rate() {
        let collector = AggregateCollector::new(10);
        collector
            .record(Event::Cache(CacheEvent {
                kind: CacheEventKind::Hit,
                method: Method::Get,
                url: "https://example.com".to_string(),
            }))
            .await;
        collector
            .record(Event::Cache(CacheEvent {
                kind: CacheEventKind::Miss,
                method: Method::Get,
                url: "https://example.com".to_string(),
            }))
            .await;

        let snapshot = collector.snapshot().await;
        assert_eq!(snapshot.cache_hit_rate, 0.5);
    }

    #[tokio::test]
    async fn window_evicts_oldest_events() {
        let collector = AggregateCollector::new(1);
        let start = SystemTime::now();
        for _ in 0..3 {
            collector
                .record(Event::Request(RequestEvent {
                    method: Method::Get,
                    url: "https://example.com".to_string(),
                    status: 200,
                    start,
                    end: start,
                    response_bytes: 10,
                    tags: vec![],
                }))
                .await;
        }
        let snapshot = collector.snapshot().await;
        assert_eq!(snapshot.request_count, 1);
    }
}

//! Metrics pipeline: event kinds plus four collector compositions
//! (spec §4.8).

mod aggregate;
mod composite;
mod events;
mod filtered;
mod recording;
mod sink;

pub use aggregate::{AggregateCollector, AggregateSnapshot};
pub use composite::CompositeCollector;
pub use events::{CacheEvent, CacheEventKind, ErrorEvent, Event, RequestEvent, RetryEvent};
pub use filtered::{EventFilter, FilteredCollector};
pub use recording::RecordingCollector;
pub use sink::{CollectorMetricsSink, MetricsSink};

use async_trait::async_trait;

#[async_trait]
pub trait MetricsCollector: Send + Sync {
    async fn record(&self, event: Event);
}

//! Collects events verbatim; used in tests (spec §4.8).

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Event, MetricsCollector};

#[derive(Default)]
pub struct RecordingCollector {
    events: Mutex<Vec<Event>>,
}

impl RecordingCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<Event> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl MetricsCollector for RecordingCollector {
    async fn record(&self, event: Event) {
        self.events.lock().await.push(event);
    }
}

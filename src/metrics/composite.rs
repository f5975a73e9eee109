//! Fans out every event to a list of collectors (spec §4.8).

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;

use super::{Event, MetricsCollector};

#[derive(Default, Clone)]
pub struct CompositeCollector {
    collectors: Vec<Arc<dyn MetricsCollector>>,
}

impl CompositeCollector {
    pub fn new(collectors: Vec<Arc<dyn MetricsCollector>>) -> Self {
        Self { collectors }
    }

    pub fn with_collector(mut self, collector: Arc<dyn MetricsCollector>) -> Self {
        self.collectors.push(collector);
        self
    }
}

#[async_trait]
impl MetricsCollector for CompositeCollector {
    async fn record(&self, event: Event) {
        join_all(self.collectors.iter().map(|c| c.record(event.clone()))).await;
    }
}

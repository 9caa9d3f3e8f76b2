//! Council event port
//!
//! Defines where [`CouncilEvent`]s go while a run progresses. Implementations
//! live in the presentation layer (progress bars, JSON lines) or in an
//! excluded transport layer (SSE).

use council_domain::CouncilEvent;
use std::sync::Arc;

/// Receiver of council events
///
/// `emit` is synchronous and infallible: a slow or broken consumer must never
/// stall or abort the pipeline. Events may arrive from background tasks, so
/// implementations must be `Send + Sync`.
pub trait CouncilEventSink: Send + Sync {
    fn emit(&self, event: &CouncilEvent);
}

/// No-op sink for when nobody is listening
pub struct NoEvents;

impl CouncilEventSink for NoEvents {
    fn emit(&self, _event: &CouncilEvent) {}
}

/// Fans every event out to several sinks, in registration order.
#[derive(Default, Clone)]
pub struct CompositeEventSink {
    sinks: Vec<Arc<dyn CouncilEventSink>>,
}

impl CompositeEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn CouncilEventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl CouncilEventSink for CompositeEventSink {
    fn emit(&self, event: &CouncilEvent) {
        for sink in &self.sinks {
            sink.emit(event);
        }
    }
}

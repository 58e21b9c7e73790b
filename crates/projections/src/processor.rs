//! Projection processor for feeding events to projections.

use std::sync::Arc;

use event_store::{EventEnvelope, EventStore};

use crate::Result;
use crate::projection::Projection;

/// Processes events from an event store and delivers them to projections.
///
/// The processor supports:
/// - Drain: reads every event past each projection's watermark and applies
///   it in commit order
/// - Single event delivery for fast-path updates
/// - Rebuild: resets all projections and drains from scratch
pub struct ProjectionProcessor<S> {
    store: Arc<S>,
    projections: Vec<Arc<dyn Projection>>,
}

impl<S: EventStore> ProjectionProcessor<S> {
    /// Creates a new processor with the given event store.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            projections: Vec::new(),
        }
    }

    /// Registers a projection with this processor.
    ///
    /// The caller usually keeps its own handle to the view for queries.
    pub fn register(&mut self, projection: Arc<dyn Projection>) {
        self.projections.push(projection);
    }

    /// Returns the number of registered projections.
    pub fn projection_count(&self) -> usize {
        self.projections.len()
    }

    /// Brings every registered projection up to date with the store.
    ///
    /// For each projection, reads the events committed past its watermark
    /// and applies them in commit order. A failing handler is logged and
    /// skipped; the watermark still advances so one poisoned event cannot
    /// stall the projection forever. Safe to call repeatedly and
    /// concurrently; it is a no-op when nothing new exists.
    ///
    /// Returns the number of events delivered across all projections.
    #[tracing::instrument(skip(self))]
    pub async fn drain(&self) -> Result<u64> {
        let mut delivered: u64 = 0;

        for projection in &self.projections {
            let position = projection.position().await;
            let events = self.store.events_after(position).await?;

            for event in &events {
                match projection.handle(event).await {
                    Ok(()) => {
                        delivered += 1;
                        metrics::counter!("projections_events_processed").increment(1);
                    }
                    Err(err) => {
                        tracing::warn!(
                            projection = projection.name(),
                            event_type = %event.event_type,
                            global_sequence = %event.global_sequence,
                            error = %err,
                            "projection handler failed, skipping event"
                        );
                        metrics::counter!("projections_handler_failures").increment(1);
                    }
                }
                projection.set_position(event.global_sequence).await;
            }
        }

        if delivered > 0 {
            tracing::debug!(delivered, "drain complete");
        }
        Ok(delivered)
    }

    /// Delivers a single event to all registered projections.
    ///
    /// Does not advance watermarks, so a later drain may redeliver the
    /// event; handlers are idempotent and converge on the same record.
    #[tracing::instrument(skip(self, event), fields(event_type = %event.event_type))]
    pub async fn process_event(&self, event: &EventEnvelope) -> Result<()> {
        for projection in &self.projections {
            projection.handle(event).await?;
        }
        Ok(())
    }

    /// Resets all projections and replays the full log.
    #[tracing::instrument(skip(self))]
    pub async fn rebuild_all(&self) -> Result<()> {
        for projection in &self.projections {
            projection.reset().await?;
        }
        self.drain().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use event_store::{
        AppendOptions, EventStoreExt, GlobalSequence, InMemoryEventStore, StreamId, Version,
    };
    use tokio::sync::RwLock;

    struct CountingProjection {
        count: RwLock<u64>,
        position: RwLock<GlobalSequence>,
        fail_on: Option<&'static str>,
    }

    impl CountingProjection {
        fn new() -> Self {
            Self {
                count: RwLock::new(0),
                position: RwLock::new(GlobalSequence::start()),
                fail_on: None,
            }
        }

        fn failing_on(event_type: &'static str) -> Self {
            Self {
                fail_on: Some(event_type),
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl Projection for CountingProjection {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn handle(&self, event: &EventEnvelope) -> Result<()> {
            if self.fail_on == Some(event.event_type.as_str()) {
                return Err(crate::ProjectionError::Projection("boom".to_string()));
            }
            *self.count.write().await += 1;
            Ok(())
        }

        async fn position(&self) -> GlobalSequence {
            *self.position.read().await
        }

        async fn set_position(&self, position: GlobalSequence) {
            *self.position.write().await = position;
        }

        async fn reset(&self) -> Result<()> {
            *self.count.write().await = 0;
            *self.position.write().await = GlobalSequence::start();
            Ok(())
        }
    }

    async fn append_one(store: &InMemoryEventStore, event_type: &str) {
        let stream_id = StreamId::new();
        store
            .append_event(
                event_store::EventEnvelope::builder()
                    .stream_id(stream_id)
                    .event_type(event_type)
                    .version(Version::first())
                    .payload_raw(serde_json::json!({}))
                    .build(),
                AppendOptions::expect_new(),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn drain_delivers_new_events_once() {
        let store = Arc::new(InMemoryEventStore::new());
        let projection = Arc::new(CountingProjection::new());
        let mut processor = ProjectionProcessor::new(Arc::clone(&store));
        processor.register(Arc::clone(&projection) as Arc<dyn Projection>);

        append_one(&store, "A").await;
        append_one(&store, "B").await;

        assert_eq!(processor.drain().await.unwrap(), 2);
        assert_eq!(*projection.count.read().await, 2);

        // Nothing new: no-op.
        assert_eq!(processor.drain().await.unwrap(), 0);

        append_one(&store, "C").await;
        assert_eq!(processor.drain().await.unwrap(), 1);
        assert_eq!(*projection.count.read().await, 3);
    }

    #[tokio::test]
    async fn handler_failure_is_skipped_and_watermark_advances() {
        let store = Arc::new(InMemoryEventStore::new());
        let projection = Arc::new(CountingProjection::failing_on("Bad"));
        let mut processor = ProjectionProcessor::new(Arc::clone(&store));
        processor.register(Arc::clone(&projection) as Arc<dyn Projection>);

        append_one(&store, "A").await;
        append_one(&store, "Bad").await;
        append_one(&store, "B").await;

        assert_eq!(processor.drain().await.unwrap(), 2);
        assert_eq!(*projection.count.read().await, 2);

        // The poisoned event is not redelivered.
        assert_eq!(processor.drain().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn rebuild_resets_and_replays() {
        let store = Arc::new(InMemoryEventStore::new());
        let projection = Arc::new(CountingProjection::new());
        let mut processor = ProjectionProcessor::new(Arc::clone(&store));
        processor.register(Arc::clone(&projection) as Arc<dyn Projection>);

        append_one(&store, "A").await;
        append_one(&store, "B").await;
        processor.drain().await.unwrap();

        processor.rebuild_all().await.unwrap();
        assert_eq!(*projection.count.read().await, 2);
    }
}

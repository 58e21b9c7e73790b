//! Correlation engine: cursor-based scan over committed events.

use std::sync::Arc;

use event_store::{EventStore, GlobalSequence};
use tokio::sync::Mutex;

use crate::Result;
use crate::trigger::CorrelationTrigger;

/// Scans recently committed events and runs registered triggers.
///
/// The engine keeps a cursor over the global sequence. Each `correlate`
/// call reads at most one batch past the cursor and runs every trigger on
/// every event, in commit order. The cursor advances only past events all
/// triggers handled; a failing trigger leaves the cursor on the event so
/// the next tick retries it. That gives at-least-once delivery, which the
/// triggers are built to tolerate.
pub struct CorrelationEngine<S> {
    store: Arc<S>,
    triggers: Vec<Arc<dyn CorrelationTrigger>>,
    cursor: Mutex<GlobalSequence>,
    batch_limit: usize,
}

impl<S: EventStore> CorrelationEngine<S> {
    pub fn new(store: Arc<S>, batch_limit: usize) -> Self {
        Self {
            store,
            triggers: Vec::new(),
            cursor: Mutex::new(GlobalSequence::start()),
            batch_limit,
        }
    }

    /// Registers a trigger with this engine.
    pub fn register(&mut self, trigger: Arc<dyn CorrelationTrigger>) {
        self.triggers.push(trigger);
    }

    /// Runs one correlation scan.
    ///
    /// Holding the cursor lock for the whole scan keeps concurrent calls
    /// from reacting to the same batch twice. Returns the number of events
    /// fully processed.
    #[tracing::instrument(skip(self))]
    pub async fn correlate(&self) -> Result<u64> {
        let mut cursor = self.cursor.lock().await;

        let mut events = self.store.events_after(*cursor).await?;
        events.truncate(self.batch_limit);

        let mut processed: u64 = 0;
        for event in &events {
            for trigger in &self.triggers {
                if let Err(err) = trigger.react(event).await {
                    tracing::warn!(
                        trigger = trigger.name(),
                        event_type = %event.event_type,
                        global_sequence = %event.global_sequence,
                        error = %err,
                        "correlation trigger failed, will retry next tick"
                    );
                    metrics::counter!("correlation_trigger_failures").increment(1);
                    return Ok(processed);
                }
            }
            *cursor = event.global_sequence;
            processed += 1;
        }

        Ok(processed)
    }
}

//! Core projection trait.

use async_trait::async_trait;
use event_store::{EventEnvelope, GlobalSequence};

use crate::Result;

/// A projection that processes events and updates a read model.
///
/// Each projection tracks its own watermark: the global sequence of the
/// last event it has processed. The processor reads past the watermark,
/// applies events in commit order, and advances it. Handlers must be
/// idempotent, since an event can be redelivered after a fast-path write
/// or an interrupted drain.
#[async_trait]
pub trait Projection: Send + Sync {
    /// Returns the name of this projection.
    fn name(&self) -> &'static str;

    /// Handles a single event, updating the projection's read model.
    async fn handle(&self, event: &EventEnvelope) -> Result<()>;

    /// The global sequence of the last processed event.
    async fn position(&self) -> GlobalSequence;

    /// Advances the watermark. Positions only ever move forward.
    async fn set_position(&self, position: GlobalSequence);

    /// Resets the projection to its initial state, including the watermark.
    async fn reset(&self) -> Result<()>;
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::{EventEnvelope, EventQuery, GlobalSequence, QueryPage, Result, StreamId, Version};

/// Options for appending events to the store.
#[derive(Debug, Clone, Default)]
pub struct AppendOptions {
    /// Expected version of the stream for optimistic concurrency control.
    /// If None, no version check is performed (use with caution).
    pub expected_version: Option<Version>,
}

impl AppendOptions {
    /// Creates options with no version check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options expecting the stream to be at a specific version.
    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }

    /// Creates options expecting the stream to have no events yet.
    pub fn expect_new() -> Self {
        Self {
            expected_version: Some(Version::initial()),
        }
    }
}

/// Notification fired after a batch commits.
///
/// Carries only the commit timestamp; consumers re-query the store for the
/// events themselves. Delivery is at-most-once: a lagged or disconnected
/// subscriber loses intervening notices and must catch up by querying.
#[derive(Debug, Clone, Copy)]
pub struct CommitNotice {
    /// When the batch committed.
    pub timestamp: DateTime<Utc>,
}

/// Core trait for event store implementations.
///
/// An event store is responsible for persisting and retrieving events.
/// All implementations must be thread-safe (Send + Sync). The reference
/// implementation is in-memory, but the contract makes no assumption
/// about the backing storage.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends events to the store.
    ///
    /// Events are appended atomically - either all succeed or none do.
    /// The store assigns each event its global sequence number and commit
    /// timestamp. If `options.expected_version` is set, the operation fails
    /// with `ConcurrencyConflict` if the current version doesn't match.
    /// Fires a commit notification after success.
    ///
    /// Returns the new version of the stream after appending.
    async fn append(&self, events: Vec<EventEnvelope>, options: AppendOptions) -> Result<Version>;

    /// Retrieves all events for a specific stream.
    ///
    /// Events are returned in version order (oldest first).
    async fn events_for_stream(&self, stream_id: StreamId) -> Result<Vec<EventEnvelope>>;

    /// Retrieves one page of events matching a query, in ascending commit order.
    async fn query_events(&self, query: EventQuery) -> Result<QueryPage>;

    /// Retrieves all events committed strictly after a global position,
    /// in ascending commit order. This is the catch-up read used by
    /// projections and the correlation scan.
    async fn events_after(&self, position: GlobalSequence) -> Result<Vec<EventEnvelope>>;

    /// Gets the current version of a stream.
    ///
    /// Returns None if the stream has no events.
    async fn stream_version(&self, stream_id: StreamId) -> Result<Option<Version>>;

    /// Returns the global position of the most recently committed event.
    async fn last_global_sequence(&self) -> Result<GlobalSequence>;

    /// Subscribes to commit notifications.
    ///
    /// Dropping the receiver releases the registration.
    fn subscribe_commits(&self) -> broadcast::Receiver<CommitNotice>;
}

/// Extension trait providing convenience methods for event stores.
#[async_trait]
pub trait EventStoreExt: EventStore {
    /// Appends a single event to the store.
    async fn append_event(&self, event: EventEnvelope, options: AppendOptions) -> Result<Version> {
        self.append(vec![event], options).await
    }

    /// Checks if a stream exists (has any events).
    async fn stream_exists(&self, stream_id: StreamId) -> Result<bool> {
        Ok(self.stream_version(stream_id).await?.is_some())
    }
}

// Blanket implementation for all EventStore implementations
impl<T: EventStore + ?Sized> EventStoreExt for T {}

/// Validates an event batch before appending.
///
/// A batch must be non-empty, target a single stream, and carry sequential
/// versions.
pub fn validate_events_for_append(events: &[EventEnvelope]) -> Result<()> {
    use crate::EventStoreError;

    if events.is_empty() {
        return Err(EventStoreError::InvalidAppend(
            "Cannot append empty event batch".to_string(),
        ));
    }

    let first = &events[0];
    for event in events.iter().skip(1) {
        if event.stream_id != first.stream_id {
            return Err(EventStoreError::InvalidAppend(
                "All events in a batch must target the same stream".to_string(),
            ));
        }
    }

    let mut expected_version = first.version;
    for event in events.iter().skip(1) {
        expected_version = expected_version.next();
        if event.version != expected_version {
            return Err(EventStoreError::InvalidAppend(format!(
                "Event versions must be sequential. Expected {}, got {}",
                expected_version, event.version
            )));
        }
    }

    Ok(())
}

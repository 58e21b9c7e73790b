use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{RwLock, broadcast};

use crate::{
    EventEnvelope, EventQuery, EventStoreError, GlobalSequence, QueryPage, Result, StreamId,
    Version,
    store::{AppendOptions, CommitNotice, EventStore, validate_events_for_append},
};

const COMMIT_CHANNEL_CAPACITY: usize = 64;

/// In-memory event store implementation.
///
/// The reference implementation of the store contract: a single log vector
/// in commit order, with the global sequence assigned under the write lock
/// so batch appends are atomic with respect to sequence assignment.
#[derive(Clone)]
pub struct InMemoryEventStore {
    log: Arc<RwLock<Log>>,
    commits: broadcast::Sender<CommitNotice>,
}

struct Log {
    events: Vec<EventEnvelope>,
    next_global: GlobalSequence,
}

impl InMemoryEventStore {
    /// Creates a new empty in-memory event store.
    pub fn new() -> Self {
        let (commits, _) = broadcast::channel(COMMIT_CHANNEL_CAPACITY);
        Self {
            log: Arc::new(RwLock::new(Log {
                events: Vec::new(),
                next_global: GlobalSequence::start(),
            })),
            commits,
        }
    }

    /// Returns the total number of events stored.
    pub async fn event_count(&self) -> usize {
        self.log.read().await.events.len()
    }

    /// Clears all events.
    pub async fn clear(&self) {
        let mut log = self.log.write().await;
        log.events.clear();
        log.next_global = GlobalSequence::start();
    }
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(
        &self,
        mut events: Vec<EventEnvelope>,
        options: AppendOptions,
    ) -> Result<Version> {
        validate_events_for_append(&events)?;

        let stream_id = events[0].stream_id;
        let mut log = self.log.write().await;

        let current_version = log
            .events
            .iter()
            .filter(|e| e.stream_id == stream_id)
            .map(|e| e.version)
            .max()
            .unwrap_or(Version::initial());

        if let Some(expected) = options.expected_version
            && current_version != expected
        {
            return Err(EventStoreError::ConcurrencyConflict {
                stream_id,
                expected,
                actual: current_version,
            });
        }

        // Unique-constraint simulation: the batch must continue the stream.
        if events[0].version != current_version.next() {
            return Err(EventStoreError::ConcurrencyConflict {
                stream_id,
                expected: options.expected_version.unwrap_or(current_version),
                actual: current_version,
            });
        }

        let commit_time = Utc::now();
        for event in &mut events {
            log.next_global = log.next_global.next();
            event.global_sequence = log.next_global;
            event.timestamp = commit_time;
        }

        let last_version = events
            .last()
            .map(|e| e.version)
            .unwrap_or(Version::initial());
        let count = events.len();
        log.events.extend(events);
        drop(log);

        metrics::counter!("event_store_events_appended").increment(count as u64);
        tracing::debug!(
            stream_id = %stream_id,
            events = count,
            version = %last_version,
            "events appended"
        );

        // At-most-once fan-out; send fails only when nobody is subscribed.
        let _ = self.commits.send(CommitNotice {
            timestamp: commit_time,
        });

        Ok(last_version)
    }

    async fn events_for_stream(&self, stream_id: StreamId) -> Result<Vec<EventEnvelope>> {
        let log = self.log.read().await;
        let mut events: Vec<_> = log
            .events
            .iter()
            .filter(|e| e.stream_id == stream_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.version);
        Ok(events)
    }

    async fn query_events(&self, query: EventQuery) -> Result<QueryPage> {
        let log = self.log.read().await;
        let mut events: Vec<_> = log
            .events
            .iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        events.sort_by_key(|e| e.global_sequence);

        let total = events.len();
        let offset = query.offset.unwrap_or(0);
        let events: Vec<_> = events.into_iter().skip(offset).collect();

        let events: Vec<_> = if let Some(limit) = query.limit {
            events.into_iter().take(limit).collect()
        } else {
            events
        };

        let has_more = offset + events.len() < total;

        Ok(QueryPage {
            events,
            total,
            has_more,
        })
    }

    async fn events_after(&self, position: GlobalSequence) -> Result<Vec<EventEnvelope>> {
        let log = self.log.read().await;
        let mut events: Vec<_> = log
            .events
            .iter()
            .filter(|e| e.global_sequence > position)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.global_sequence);
        Ok(events)
    }

    async fn stream_version(&self, stream_id: StreamId) -> Result<Option<Version>> {
        let log = self.log.read().await;
        let version = log
            .events
            .iter()
            .filter(|e| e.stream_id == stream_id)
            .map(|e| e.version)
            .max();
        Ok(version)
    }

    async fn last_global_sequence(&self) -> Result<GlobalSequence> {
        let log = self.log.read().await;
        Ok(log.next_global)
    }

    fn subscribe_commits(&self) -> broadcast::Receiver<CommitNotice> {
        self.commits.subscribe()
    }
}

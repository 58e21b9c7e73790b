use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use common::Actor;
use event_store::{AppendOptions, EventEnvelope, EventStore, StreamId, Version};
use tokio::sync::Mutex;

use crate::{Aggregate, DomainError, aggregate::DomainEvent};

/// Result of executing a command.
pub struct CommandResult<A: Aggregate> {
    /// The aggregate after applying the new events.
    pub aggregate: A,
    /// The events that were emitted and persisted.
    pub events: Vec<A::Event>,
    /// The stream version after the append.
    pub version: Version,
}

impl<A: Aggregate> std::fmt::Debug for CommandResult<A>
where
    A: std::fmt::Debug,
    A::Event: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandResult")
            .field("aggregate", &self.aggregate)
            .field("events", &self.events)
            .field("version", &self.version)
            .finish()
    }
}

/// Generic command handler for event-sourced aggregates.
///
/// Handles the full command lifecycle: serialize access to the stream, load
/// the aggregate by replaying its events, run the command function against
/// the loaded state, and append the emitted events with an expected-version
/// check. Commands against the same stream run one at a time; commands
/// against different streams proceed concurrently.
pub struct CommandHandler<S, A> {
    store: Arc<S>,
    locks: Mutex<HashMap<StreamId, Arc<Mutex<()>>>>,
    _aggregate: PhantomData<fn() -> A>,
}

impl<S, A> CommandHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
            _aggregate: PhantomData,
        }
    }

    /// The underlying event store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    async fn stream_lock(&self, stream_id: StreamId) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .await
            .entry(stream_id)
            .or_default()
            .clone()
    }

    /// Loads an aggregate by replaying its event stream.
    ///
    /// A stream with no events yields the default state at version 0.
    #[tracing::instrument(skip(self), fields(stream_id = %stream_id))]
    pub async fn load(&self, stream_id: StreamId) -> Result<A, DomainError> {
        let envelopes = self.store.events_for_stream(stream_id).await?;

        let mut aggregate = A::default();
        for envelope in &envelopes {
            let event: A::Event = serde_json::from_value(envelope.payload.clone()).map_err(
                |_| DomainError::UnknownEventType {
                    stream_id,
                    event_type: envelope.event_type.clone(),
                },
            )?;
            aggregate.apply(&event);
            aggregate.set_version(envelope.version);
        }
        Ok(aggregate)
    }

    /// Executes a command against an aggregate.
    ///
    /// The command function receives the current state and either returns
    /// the events to emit or rejects the command. Emitted events are
    /// appended atomically with an expected-version check, so a concurrent
    /// writer that slipped in despite the stream lock still cannot corrupt
    /// the stream.
    #[tracing::instrument(skip(self, actor, command_fn), fields(stream_id = %stream_id))]
    pub async fn execute<F, E>(
        &self,
        stream_id: StreamId,
        actor: Option<&Actor>,
        command_fn: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        F: FnOnce(&A) -> Result<Vec<A::Event>, E>,
        DomainError: From<E>,
    {
        let started = std::time::Instant::now();
        let lock = self.stream_lock(stream_id).await;
        let _guard = lock.lock().await;

        let mut aggregate = self.load(stream_id).await?;
        let expected_version = aggregate.version();

        let events = match command_fn(&aggregate) {
            Ok(events) => events,
            Err(err) => {
                metrics::counter!("domain_commands_rejected").increment(1);
                return Err(DomainError::from(err));
            }
        };

        if events.is_empty() {
            return Ok(CommandResult {
                aggregate,
                events,
                version: expected_version,
            });
        }

        let mut version = expected_version;
        let mut envelopes = Vec::with_capacity(events.len());
        for event in &events {
            version = version.next();
            let mut builder = EventEnvelope::builder()
                .stream_id(stream_id)
                .event_type(event.event_type())
                .version(version)
                .payload(event)?;
            if let Some(actor) = actor {
                builder = builder.actor_id(actor.id.clone());
            }
            envelopes.push(builder.build());
        }

        let new_version = self
            .store
            .append(envelopes, AppendOptions::expect_version(expected_version))
            .await?;

        metrics::counter!("domain_commands_executed").increment(1);
        metrics::histogram!("domain_command_duration_seconds").record(started.elapsed());
        tracing::debug!(
            events = events.len(),
            version = %new_version,
            "command executed"
        );

        aggregate.apply_events(&events);
        aggregate.set_version(new_version);

        Ok(CommandResult {
            aggregate,
            events,
            version: new_version,
        })
    }
}

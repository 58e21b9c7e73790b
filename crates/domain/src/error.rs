use event_store::{EventStoreError, StreamId};
use thiserror::Error;

use crate::rental::RentalError;

/// Errors that can occur in the domain layer.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A command was rejected by the aggregate.
    #[error(transparent)]
    Rental(#[from] RentalError),

    /// An error from the event store.
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    /// Failed to serialize or deserialize an event payload.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An event envelope could not be applied to the aggregate.
    #[error("Cannot apply event of type '{event_type}' to stream {stream_id}")]
    UnknownEventType {
        stream_id: StreamId,
        event_type: String,
    },
}

impl DomainError {
    /// True when the error is a domain rejection rather than an
    /// infrastructure failure.
    pub fn is_rejection(&self) -> bool {
        matches!(self, DomainError::Rental(_))
    }
}

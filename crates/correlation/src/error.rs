//! Correlation error types.

use thiserror::Error;

/// Errors that can occur during correlation processing.
#[derive(Debug, Error)]
pub enum CorrelationError {
    /// A follow-up command failed in the domain layer.
    #[error("Domain error: {0}")]
    Domain(#[from] domain::DomainError),

    /// An error occurred in the event store.
    #[error("Event store error: {0}")]
    EventStore(#[from] event_store::EventStoreError),

    /// Failed to deserialize an event payload.
    #[error("Event deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}

/// Result type for correlation operations.
pub type Result<T> = std::result::Result<T, CorrelationError>;

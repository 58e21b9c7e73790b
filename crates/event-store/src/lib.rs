pub mod error;
pub mod event;
pub mod memory;
pub mod query;
pub mod store;

pub use common::StreamId;
pub use error::{EventStoreError, Result};
pub use event::{EventEnvelope, EventEnvelopeBuilder, EventId, GlobalSequence, Version};
pub use memory::InMemoryEventStore;
pub use query::{EventQuery, QueryPage};
pub use store::{AppendOptions, CommitNotice, EventStore, EventStoreExt};

use event_store::{StreamId, Version};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A domain event that can be applied to an aggregate.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// The type name of this event, used as the envelope's `event_type`.
    fn event_type(&self) -> &'static str;
}

/// An event-sourced aggregate.
///
/// Aggregates are rebuilt by folding their event stream over a default
/// state. `apply` must be a total, deterministic function: given the same
/// ordered events it always produces the same state, and it never fails.
/// Validation happens before events are emitted, not while folding.
pub trait Aggregate: Default + Send + Sync {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent;

    /// The stream this aggregate instance belongs to.
    ///
    /// Returns None until the first event has been applied.
    fn id(&self) -> Option<StreamId>;

    /// The version of the aggregate (number of events applied).
    fn version(&self) -> Version;

    /// Sets the version. Called by the command handler during replay.
    fn set_version(&mut self, version: Version);

    /// Applies an event to mutate the aggregate state.
    fn apply(&mut self, event: &Self::Event);

    /// Applies a sequence of events in order.
    fn apply_events(&mut self, events: &[Self::Event]) {
        for event in events {
            self.apply(event);
        }
    }
}

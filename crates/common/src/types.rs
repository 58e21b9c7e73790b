use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an event stream (one per aggregate instance).
///
/// Wraps a UUID to provide type safety and prevent mixing up
/// stream IDs with other UUID-based identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamId(Uuid);

impl StreamId {
    /// Creates a new random stream ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a stream ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for StreamId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for StreamId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<StreamId> for Uuid {
    fn from(id: StreamId) -> Self {
        id.0
    }
}

/// Opaque identity of the caller issuing a command.
///
/// The system records who performed an action but never interprets the
/// identity; authentication and authorization live outside this system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Stable identifier, e.g. a user or service account ID.
    pub id: String,

    /// Human-readable display name.
    pub name: String,
}

impl Actor {
    /// Creates a new actor identity.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_id_new_creates_unique_ids() {
        let id1 = StreamId::new();
        let id2 = StreamId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn stream_id_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = StreamId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn stream_id_serialization_roundtrip() {
        let id = StreamId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: StreamId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn actor_display() {
        let actor = Actor::new("staff-1", "Bob");
        assert_eq!(actor.to_string(), "Bob (staff-1)");
    }
}

use chrono::{DateTime, Utc};

use crate::{EventEnvelope, GlobalSequence, StreamId};

/// Builder for constructing event queries.
///
/// Allows filtering events by stream, event name set, commit-timestamp
/// range, and global position, with limit/offset pagination. Results are
/// always returned in ascending commit (global sequence) order.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    /// Filter by stream ID.
    pub stream_id: Option<StreamId>,

    /// Filter by event types (any of these types).
    pub event_types: Option<Vec<String>>,

    /// Only events committed strictly after this global position.
    pub after_global: Option<GlobalSequence>,

    /// Filter by events at or after this timestamp.
    pub from_timestamp: Option<DateTime<Utc>>,

    /// Filter by events at or before this timestamp.
    pub to_timestamp: Option<DateTime<Utc>>,

    /// Maximum number of events to return.
    pub limit: Option<usize>,

    /// Number of events to skip.
    pub offset: Option<usize>,
}

impl EventQuery {
    /// Creates a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for a specific stream.
    pub fn for_stream(stream_id: StreamId) -> Self {
        Self {
            stream_id: Some(stream_id),
            ..Default::default()
        }
    }

    /// Creates a query for events of a specific type.
    pub fn for_event_type(event_type: impl Into<String>) -> Self {
        Self {
            event_types: Some(vec![event_type.into()]),
            ..Default::default()
        }
    }

    /// Filters by stream ID.
    pub fn stream_id(mut self, id: StreamId) -> Self {
        self.stream_id = Some(id);
        self
    }

    /// Filters by event type.
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_types = Some(vec![event_type.into()]);
        self
    }

    /// Filters by multiple event types (any of these).
    pub fn event_types(mut self, event_types: Vec<String>) -> Self {
        self.event_types = Some(event_types);
        self
    }

    /// Filters to events committed strictly after this global position.
    pub fn after_global(mut self, position: GlobalSequence) -> Self {
        self.after_global = Some(position);
        self
    }

    /// Filters to events at or after this timestamp.
    pub fn from_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.from_timestamp = Some(timestamp);
        self
    }

    /// Filters to events at or before this timestamp.
    pub fn to_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.to_timestamp = Some(timestamp);
        self
    }

    /// Limits the number of events returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips this many events before returning results.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns true if the envelope passes every filter of this query.
    pub fn matches(&self, event: &EventEnvelope) -> bool {
        if let Some(id) = self.stream_id
            && event.stream_id != id
        {
            return false;
        }
        if let Some(ref types) = self.event_types
            && !types.contains(&event.event_type)
        {
            return false;
        }
        if let Some(after) = self.after_global
            && event.global_sequence <= after
        {
            return false;
        }
        if let Some(from) = self.from_timestamp
            && event.timestamp < from
        {
            return false;
        }
        if let Some(to) = self.to_timestamp
            && event.timestamp > to
        {
            return false;
        }
        true
    }
}

/// One page of query results.
#[derive(Debug, Clone)]
pub struct QueryPage {
    /// The matching events in ascending commit order.
    pub events: Vec<EventEnvelope>,

    /// Total number of events matching the filters, before pagination.
    pub total: usize,

    /// True if events matching the filters exist beyond this page.
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Version;

    fn envelope(stream_id: StreamId, event_type: &str, global: u64) -> EventEnvelope {
        let mut e = EventEnvelope::builder()
            .stream_id(stream_id)
            .event_type(event_type)
            .version(Version::first())
            .payload_raw(serde_json::json!({}))
            .build();
        e.global_sequence = GlobalSequence::new(global);
        e
    }

    #[test]
    fn query_for_stream() {
        let id = StreamId::new();
        let query = EventQuery::for_stream(id);

        assert_eq!(query.stream_id, Some(id));
        assert!(query.event_types.is_none());
    }

    #[test]
    fn query_for_event_type() {
        let query = EventQuery::for_event_type("ItemCreated");

        assert!(query.stream_id.is_none());
        assert_eq!(query.event_types, Some(vec!["ItemCreated".to_string()]));
    }

    #[test]
    fn query_builder_chain() {
        let id = StreamId::new();
        let query = EventQuery::new()
            .stream_id(id)
            .event_type("ItemCreated")
            .after_global(GlobalSequence::new(5))
            .limit(100)
            .offset(0);

        assert_eq!(query.stream_id, Some(id));
        assert_eq!(query.event_types, Some(vec!["ItemCreated".to_string()]));
        assert_eq!(query.after_global, Some(GlobalSequence::new(5)));
        assert_eq!(query.limit, Some(100));
        assert_eq!(query.offset, Some(0));
    }

    #[test]
    fn matches_filters_by_stream_and_type() {
        let id = StreamId::new();
        let other = StreamId::new();
        let query = EventQuery::for_stream(id).event_type("ItemRented");

        assert!(query.matches(&envelope(id, "ItemRented", 1)));
        assert!(!query.matches(&envelope(other, "ItemRented", 2)));
        assert!(!query.matches(&envelope(id, "ItemReturned", 3)));
    }

    #[test]
    fn matches_after_global_is_strict() {
        let id = StreamId::new();
        let query = EventQuery::new().after_global(GlobalSequence::new(2));

        assert!(!query.matches(&envelope(id, "ItemRented", 2)));
        assert!(query.matches(&envelope(id, "ItemRented", 3)));
    }
}

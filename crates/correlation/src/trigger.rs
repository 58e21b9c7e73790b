//! Correlation triggers: reactive follow-up commands.

use std::sync::Arc;

use async_trait::async_trait;
use common::Actor;
use domain::{ItemStatus, RentalItemService, ScheduleMaintenance};
use event_store::{EventEnvelope, EventStore};

use crate::Result;

/// A reactive rule over committed events.
///
/// Triggers run under at-least-once delivery: the same event can be seen
/// again after a partial scan. A trigger must re-check current aggregate
/// state before issuing its follow-up command so redelivery is a no-op.
#[async_trait]
pub trait CorrelationTrigger: Send + Sync {
    /// Returns the name of this trigger.
    fn name(&self) -> &'static str;

    /// Reacts to one committed event, possibly issuing follow-up commands
    /// through the normal write path.
    async fn react(&self, event: &EventEnvelope) -> Result<()>;
}

/// Schedules maintenance when a damage report leaves an item with no
/// available units.
///
/// Re-checking state makes this idempotent: once the follow-up has run the
/// item is in Maintenance, so seeing the same DamageReported event again
/// does nothing.
pub struct DamageFollowUpTrigger<S> {
    service: Arc<RentalItemService<S>>,
    actor: Actor,
}

impl<S: EventStore> DamageFollowUpTrigger<S> {
    pub fn new(service: Arc<RentalItemService<S>>) -> Self {
        Self {
            service,
            actor: Actor::new("correlation-engine", "Correlation Engine"),
        }
    }
}

#[async_trait]
impl<S: EventStore> CorrelationTrigger for DamageFollowUpTrigger<S> {
    fn name(&self) -> &'static str {
        "damage_follow_up"
    }

    #[tracing::instrument(skip(self, event), fields(stream_id = %event.stream_id))]
    async fn react(&self, event: &EventEnvelope) -> Result<()> {
        if event.event_type != "DamageReported" {
            return Ok(());
        }

        let Some(item) = self.service.get_item(event.stream_id).await? else {
            return Ok(());
        };
        if item.status() != ItemStatus::Quarantined || item.available_quantity() > 0 {
            return Ok(());
        }

        let reason = item
            .damage_report()
            .map(|d| format!("Damage follow-up: {d}"))
            .unwrap_or_else(|| "Damage follow-up".to_string());

        tracing::info!(item_id = %event.stream_id, "scheduling maintenance after damage");
        metrics::counter!("correlation_follow_ups_issued").increment(1);
        self.service
            .schedule_maintenance(
                ScheduleMaintenance::new(event.stream_id, reason),
                Some(&self.actor),
            )
            .await?;
        Ok(())
    }
}

//! High-level service for rental item commands and authoritative reads.
//!
//! One method per command. Each call loads the aggregate, runs the command
//! against current state, and appends the emitted events, all serialized
//! per stream by the underlying [`CommandHandler`].

use std::sync::Arc;

use common::Actor;
use event_store::{EventStore, StreamId};

use crate::aggregate::Aggregate;
use crate::command::{CommandHandler, CommandResult};
use crate::error::DomainError;

use super::aggregate::RentalItem;
use super::commands::{
    AddQuantity, CompleteMaintenance, CreateItem, InspectItem, RemoveQuantity, RentItem,
    ReportDamage, RetireItem, ReturnItem, ScheduleMaintenance, SetBasePrice, SetPricingStrategy,
};

type ServiceResult = Result<CommandResult<RentalItem>, DomainError>;

pub struct RentalItemService<S> {
    handler: CommandHandler<S, RentalItem>,
}

impl<S: EventStore> RentalItemService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            handler: CommandHandler::new(store),
        }
    }

    /// The underlying event store, shared with projections.
    pub fn store(&self) -> &Arc<S> {
        self.handler.store()
    }

    /// Point-in-time authoritative read. A stream with no events yields
    /// the default zero-value state at version 0.
    pub async fn load(&self, item_id: StreamId) -> Result<RentalItem, DomainError> {
        self.handler.load(item_id).await
    }

    /// Like [`load`](Self::load), but distinguishes never-created items.
    pub async fn get_item(&self, item_id: StreamId) -> Result<Option<RentalItem>, DomainError> {
        let item = self.handler.load(item_id).await?;
        Ok(item.id().map(|_| item))
    }

    pub async fn create_item(&self, cmd: CreateItem, actor: Option<&Actor>) -> ServiceResult {
        self.handler
            .execute(cmd.item_id, actor, |item: &RentalItem| item.create(&cmd))
            .await
    }

    pub async fn rent_item(&self, cmd: RentItem, actor: Option<&Actor>) -> ServiceResult {
        self.handler
            .execute(cmd.item_id, actor, |item: &RentalItem| item.rent(&cmd))
            .await
    }

    pub async fn return_item(&self, cmd: ReturnItem, actor: Option<&Actor>) -> ServiceResult {
        self.handler
            .execute(cmd.item_id, actor, |item: &RentalItem| {
                item.return_rental(&cmd)
            })
            .await
    }

    pub async fn report_damage(&self, cmd: ReportDamage, actor: Option<&Actor>) -> ServiceResult {
        self.handler
            .execute(cmd.item_id, actor, |item: &RentalItem| {
                item.report_damage(&cmd)
            })
            .await
    }

    pub async fn schedule_maintenance(
        &self,
        cmd: ScheduleMaintenance,
        actor: Option<&Actor>,
    ) -> ServiceResult {
        self.handler
            .execute(cmd.item_id, actor, |item: &RentalItem| {
                item.schedule_maintenance(&cmd)
            })
            .await
    }

    pub async fn complete_maintenance(
        &self,
        cmd: CompleteMaintenance,
        actor: Option<&Actor>,
    ) -> ServiceResult {
        self.handler
            .execute(cmd.item_id, actor, |item: &RentalItem| {
                item.complete_maintenance(&cmd)
            })
            .await
    }

    pub async fn inspect_item(&self, cmd: InspectItem, actor: Option<&Actor>) -> ServiceResult {
        self.handler
            .execute(cmd.item_id, actor, |item: &RentalItem| item.inspect(&cmd))
            .await
    }

    pub async fn retire_item(&self, cmd: RetireItem, actor: Option<&Actor>) -> ServiceResult {
        self.handler
            .execute(cmd.item_id, actor, |item: &RentalItem| item.retire(&cmd))
            .await
    }

    pub async fn add_quantity(&self, cmd: AddQuantity, actor: Option<&Actor>) -> ServiceResult {
        self.handler
            .execute(cmd.item_id, actor, |item: &RentalItem| {
                item.add_quantity(&cmd)
            })
            .await
    }

    pub async fn remove_quantity(
        &self,
        cmd: RemoveQuantity,
        actor: Option<&Actor>,
    ) -> ServiceResult {
        self.handler
            .execute(cmd.item_id, actor, |item: &RentalItem| {
                item.remove_quantity(&cmd)
            })
            .await
    }

    pub async fn set_base_price(&self, cmd: SetBasePrice, actor: Option<&Actor>) -> ServiceResult {
        self.handler
            .execute(cmd.item_id, actor, |item: &RentalItem| {
                item.set_base_price(&cmd)
            })
            .await
    }

    pub async fn set_pricing_strategy(
        &self,
        cmd: SetPricingStrategy,
        actor: Option<&Actor>,
    ) -> ServiceResult {
        self.handler
            .execute(cmd.item_id, actor, |item: &RentalItem| {
                item.set_pricing_strategy(&cmd)
            })
            .await
    }
}

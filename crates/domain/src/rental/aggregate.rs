//! The rental item aggregate.
//!
//! Command methods validate the payload, check an ordered list of business
//! rules against current state, and emit events. The fold in
//! [`Aggregate::apply`] is total and deterministic; it re-derives status
//! and price after every event rather than trusting any cached value.

use chrono::Utc;
use event_store::{StreamId, Version};
use serde::Serialize;
use thiserror::Error;

use crate::aggregate::Aggregate;
use crate::invariant::{Invariant, check_invariants};

use super::commands::{
    AddQuantity, CompleteMaintenance, CreateItem, InspectItem, RemoveQuantity, RentItem,
    ReportDamage, RetireItem, ReturnItem, ScheduleMaintenance, SetBasePrice, SetPricingStrategy,
};
use super::events::{
    BasePriceSetData, DamageReportedData, ItemCreatedData, ItemInspectedData, ItemRentedData,
    ItemRetiredData, ItemReturnedData, MaintenanceCompletedData, MaintenanceScheduledData,
    PricingStrategyChangedData, QuantityAddedData, QuantityRemovedData, RentalItemEvent,
};
use super::pricing;
use super::state::{
    ItemCategory, ItemCondition, ItemStatus, PricingStrategy, Rental, RentalId, SkuUnit, UnitId,
    UnitStatus,
};

/// Errors produced by rental item commands.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RentalError {
    /// A malformed command payload, rejected before any state was read.
    #[error("Invalid command: {0}")]
    Validation(String),

    /// A business rule did not hold. Carries the rule's description
    /// verbatim.
    #[error("{0}")]
    Rejected(String),
}

mod rules {
    use super::*;

    pub fn not_created() -> Invariant<'static, RentalItem> {
        Invariant::new("Item already exists", |s: &RentalItem| s.id.is_none())
    }

    pub fn exists() -> Invariant<'static, RentalItem> {
        Invariant::new("Item must exist", |s: &RentalItem| s.id.is_some())
    }

    pub fn not_retired() -> Invariant<'static, RentalItem> {
        Invariant::new("Item must not be retired", |s: &RentalItem| {
            !s.status.is_terminal()
        })
    }

    pub fn has_availability() -> Invariant<'static, RentalItem> {
        Invariant::new("Item must have available units", |s: &RentalItem| {
            s.available_quantity() > 0
        })
    }

    pub fn enough_available(requested: u32) -> Invariant<'static, RentalItem> {
        Invariant::new(
            format!("Not enough available units for quantity {requested}"),
            move |s: &RentalItem| s.available_quantity() >= requested,
        )
    }

    pub fn units_available(unit_ids: &[UnitId]) -> Invariant<'_, RentalItem> {
        Invariant::new("Requested units must be available", move |s: &RentalItem| {
            unit_ids
                .iter()
                .all(|id| s.unit(*id).is_some_and(SkuUnit::is_available))
        })
    }

    pub fn in_maintenance() -> Invariant<'static, RentalItem> {
        Invariant::new("Item must be in maintenance", |s: &RentalItem| {
            s.status == ItemStatus::Maintenance
        })
    }
}

const RENTAL_NOT_FOUND: &str = "No active rental matches the given rental id";

/// An event-sourced rental item with individually tracked units.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RentalItem {
    id: Option<StreamId>,
    version: Version,
    name: String,
    description: Option<String>,
    serial_number: String,
    category: ItemCategory,
    status: ItemStatus,
    condition: ItemCondition,
    units: Vec<SkuUnit>,
    base_price: f64,
    current_price: f64,
    pricing_strategy: PricingStrategy,
    active_rentals: Vec<Rental>,
    damage_report: Option<String>,
    maintenance_reason: Option<String>,
    image_url: Option<String>,
}

impl RentalItem {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    pub fn category(&self) -> ItemCategory {
        self.category
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn condition(&self) -> ItemCondition {
        self.condition
    }

    pub fn units(&self) -> &[SkuUnit] {
        &self.units
    }

    /// Size of the unit pool, including unavailable units.
    pub fn total_quantity(&self) -> u32 {
        self.units.len() as u32
    }

    /// Number of units currently available to rent.
    pub fn available_quantity(&self) -> u32 {
        self.units.iter().filter(|u| u.is_available()).count() as u32
    }

    pub fn base_price(&self) -> f64 {
        self.base_price
    }

    pub fn current_price(&self) -> f64 {
        self.current_price
    }

    pub fn pricing_strategy(&self) -> PricingStrategy {
        self.pricing_strategy
    }

    pub fn active_rentals(&self) -> &[Rental] {
        &self.active_rentals
    }

    pub fn damage_report(&self) -> Option<&str> {
        self.damage_report.as_deref()
    }

    pub fn maintenance_reason(&self) -> Option<&str> {
        self.maintenance_reason.as_deref()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    fn unit(&self, unit_id: UnitId) -> Option<&SkuUnit> {
        self.units.iter().find(|u| u.unit_id == unit_id)
    }

    fn rental(&self, rental_id: RentalId) -> Option<&Rental> {
        self.active_rentals
            .iter()
            .find(|r| r.rental_id == rental_id)
    }

    /// First `take` available unit ids in pool order, clamped to what
    /// exists.
    fn available_unit_ids(&self, take: u32) -> Vec<UnitId> {
        self.units
            .iter()
            .filter(|u| u.is_available())
            .take(take as usize)
            .map(|u| u.unit_id)
            .collect()
    }

    fn check(&self, invariants: &[Invariant<'_, RentalItem>]) -> Result<(), RentalError> {
        check_invariants(self, invariants).map_err(RentalError::Rejected)
    }

    // --- command methods ---

    pub fn create(&self, cmd: &CreateItem) -> Result<Vec<RentalItemEvent>, RentalError> {
        cmd.validate()?;
        self.check(&[rules::not_created()])?;

        let unit_ids = (0..cmd.initial_quantity).map(|_| UnitId::new()).collect();
        Ok(vec![RentalItemEvent::ItemCreated(ItemCreatedData {
            item_id: cmd.item_id,
            name: cmd.name.clone(),
            description: cmd.description.clone(),
            serial_number: cmd.serial_number.clone(),
            category: cmd.category,
            condition: cmd.condition,
            base_price: cmd.base_price,
            pricing_strategy: cmd.pricing_strategy,
            unit_ids,
            image_url: cmd.image_url.clone(),
        })])
    }

    pub fn rent(&self, cmd: &RentItem) -> Result<Vec<RentalItemEvent>, RentalError> {
        cmd.validate()?;

        let mut invariants = vec![
            rules::exists(),
            rules::not_retired(),
            rules::has_availability(),
            rules::enough_available(cmd.quantity),
        ];
        if let Some(unit_ids) = &cmd.unit_ids {
            invariants.push(rules::units_available(unit_ids));
        }
        self.check(&invariants)?;

        let unit_ids = match &cmd.unit_ids {
            Some(ids) => ids.clone(),
            None => self.available_unit_ids(cmd.quantity),
        };

        Ok(vec![RentalItemEvent::ItemRented(ItemRentedData {
            rental_id: RentalId::new(),
            renter_id: cmd.renter_id.clone(),
            unit_ids,
            price_at_rental: self.current_price,
            expected_return_date: cmd.expected_return_date,
        })])
    }

    pub fn return_rental(&self, cmd: &ReturnItem) -> Result<Vec<RentalItemEvent>, RentalError> {
        cmd.validate()?;
        self.check(&[rules::exists(), rules::not_retired()])?;

        let Some(rental) = self.rental(cmd.rental_id) else {
            return Err(RentalError::Rejected(RENTAL_NOT_FOUND.to_string()));
        };

        Ok(vec![RentalItemEvent::ItemReturned(ItemReturnedData {
            rental_id: rental.rental_id,
            unit_ids: rental.unit_ids.clone(),
            return_date: cmd.return_date.unwrap_or_else(Utc::now),
        })])
    }

    pub fn report_damage(&self, cmd: &ReportDamage) -> Result<Vec<RentalItemEvent>, RentalError> {
        cmd.validate()?;
        self.check(&[rules::exists(), rules::not_retired()])?;

        // Clamped: if fewer units are available than reported, pull what we
        // can; the quarantine applies to the item either way.
        let unit_ids = self.available_unit_ids(cmd.quantity_affected);

        Ok(vec![RentalItemEvent::DamageReported(DamageReportedData {
            description: cmd.description.clone(),
            reported_by: cmd.reported_by.clone(),
            unit_ids,
        })])
    }

    pub fn schedule_maintenance(
        &self,
        cmd: &ScheduleMaintenance,
    ) -> Result<Vec<RentalItemEvent>, RentalError> {
        cmd.validate()?;
        self.check(&[rules::exists(), rules::not_retired()])?;

        let take = cmd.quantity.unwrap_or_else(|| self.available_quantity());
        let unit_ids = self.available_unit_ids(take);

        Ok(vec![RentalItemEvent::MaintenanceScheduled(
            MaintenanceScheduledData {
                reason: cmd.reason.clone(),
                unit_ids,
            },
        )])
    }

    pub fn complete_maintenance(
        &self,
        cmd: &CompleteMaintenance,
    ) -> Result<Vec<RentalItemEvent>, RentalError> {
        cmd.validate()?;
        self.check(&[rules::exists(), rules::in_maintenance()])?;

        let in_maintenance = self
            .units
            .iter()
            .filter(|u| u.status == UnitStatus::Maintenance)
            .map(|u| u.unit_id);
        let unit_ids: Vec<UnitId> = match cmd.quantity {
            Some(quantity) => in_maintenance.take(quantity as usize).collect(),
            None => in_maintenance.collect(),
        };

        Ok(vec![RentalItemEvent::MaintenanceCompleted(
            MaintenanceCompletedData {
                notes: cmd.notes.clone(),
                unit_ids,
            },
        )])
    }

    pub fn inspect(&self, cmd: &InspectItem) -> Result<Vec<RentalItemEvent>, RentalError> {
        cmd.validate()?;
        self.check(&[rules::exists(), rules::not_retired()])?;

        Ok(vec![RentalItemEvent::ItemInspected(ItemInspectedData {
            condition: cmd.condition,
            notes: cmd.notes.clone(),
        })])
    }

    pub fn retire(&self, cmd: &RetireItem) -> Result<Vec<RentalItemEvent>, RentalError> {
        cmd.validate()?;
        self.check(&[rules::exists(), rules::not_retired()])?;

        Ok(vec![RentalItemEvent::ItemRetired(ItemRetiredData {
            reason: cmd.reason.clone(),
        })])
    }

    pub fn add_quantity(&self, cmd: &AddQuantity) -> Result<Vec<RentalItemEvent>, RentalError> {
        cmd.validate()?;
        self.check(&[rules::exists(), rules::not_retired()])?;

        let unit_ids = (0..cmd.amount).map(|_| UnitId::new()).collect();
        Ok(vec![RentalItemEvent::QuantityAdded(QuantityAddedData {
            unit_ids,
            condition: cmd.condition,
            reason: cmd.reason.clone(),
        })])
    }

    pub fn remove_quantity(
        &self,
        cmd: &RemoveQuantity,
    ) -> Result<Vec<RentalItemEvent>, RentalError> {
        cmd.validate()?;
        self.check(&[
            rules::exists(),
            rules::not_retired(),
            rules::enough_available(cmd.amount),
        ])?;

        let unit_ids = self.available_unit_ids(cmd.amount);
        Ok(vec![RentalItemEvent::QuantityRemoved(QuantityRemovedData {
            unit_ids,
            reason: cmd.reason.clone(),
        })])
    }

    pub fn set_base_price(&self, cmd: &SetBasePrice) -> Result<Vec<RentalItemEvent>, RentalError> {
        cmd.validate()?;
        self.check(&[rules::exists(), rules::not_retired()])?;

        Ok(vec![RentalItemEvent::BasePriceSet(BasePriceSetData {
            base_price: cmd.base_price,
            previous_price: self.base_price,
        })])
    }

    pub fn set_pricing_strategy(
        &self,
        cmd: &SetPricingStrategy,
    ) -> Result<Vec<RentalItemEvent>, RentalError> {
        cmd.validate()?;
        self.check(&[rules::exists(), rules::not_retired()])?;

        Ok(vec![RentalItemEvent::PricingStrategyChanged(
            PricingStrategyChangedData {
                strategy: cmd.strategy,
                previous_strategy: self.pricing_strategy,
            },
        )])
    }

    // --- fold helpers ---

    fn mark_units(&mut self, unit_ids: &[UnitId], status: UnitStatus) {
        for unit in &mut self.units {
            if unit_ids.contains(&unit.unit_id) {
                unit.status = status;
            }
        }
    }

    /// Re-derives status and price from the unit pool. Exceptional statuses
    /// (quarantine, maintenance, retired) are preserved; they are cleared
    /// only by their own events.
    fn refresh(&mut self) {
        if !self.status.is_exceptional() {
            self.status = if self.available_quantity() == 0 && self.total_quantity() > 0 {
                ItemStatus::OutOfStock
            } else {
                ItemStatus::Available
            };
        }
        self.current_price = pricing::price(
            self.base_price,
            self.total_quantity(),
            self.available_quantity(),
            self.pricing_strategy,
        );
    }
}

impl Aggregate for RentalItem {
    type Event = RentalItemEvent;

    fn id(&self) -> Option<StreamId> {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: &RentalItemEvent) {
        match event {
            RentalItemEvent::ItemCreated(data) => {
                self.id = Some(data.item_id);
                self.name = data.name.clone();
                self.description = data.description.clone();
                self.serial_number = data.serial_number.clone();
                self.category = data.category;
                self.condition = data.condition;
                self.base_price = data.base_price;
                self.pricing_strategy = data.pricing_strategy;
                self.units = data
                    .unit_ids
                    .iter()
                    .map(|id| SkuUnit::new(*id, data.condition))
                    .collect();
                self.image_url = data.image_url.clone();
                self.status = ItemStatus::Available;
            }
            RentalItemEvent::ItemRented(data) => {
                self.mark_units(&data.unit_ids, UnitStatus::Rented);
                self.active_rentals.push(Rental {
                    rental_id: data.rental_id,
                    renter_id: data.renter_id.clone(),
                    unit_ids: data.unit_ids.clone(),
                    expected_return_date: data.expected_return_date,
                });
            }
            RentalItemEvent::ItemReturned(data) => {
                self.active_rentals.retain(|r| r.rental_id != data.rental_id);
                for unit in &mut self.units {
                    if data.unit_ids.contains(&unit.unit_id) && unit.status == UnitStatus::Rented {
                        unit.status = UnitStatus::Available;
                    }
                }
            }
            RentalItemEvent::DamageReported(data) => {
                for unit in &mut self.units {
                    if data.unit_ids.contains(&unit.unit_id) {
                        unit.status = UnitStatus::Damaged;
                        unit.condition = ItemCondition::Damaged;
                    }
                }
                self.condition = ItemCondition::Damaged;
                self.status = ItemStatus::Quarantined;
                self.damage_report = Some(data.description.clone());
            }
            RentalItemEvent::MaintenanceScheduled(data) => {
                self.mark_units(&data.unit_ids, UnitStatus::Maintenance);
                self.status = ItemStatus::Maintenance;
                self.maintenance_reason = Some(data.reason.clone());
            }
            RentalItemEvent::MaintenanceCompleted(data) => {
                for unit in &mut self.units {
                    if data.unit_ids.contains(&unit.unit_id)
                        && unit.status == UnitStatus::Maintenance
                    {
                        unit.status = UnitStatus::Available;
                    }
                }
                self.maintenance_reason = None;
                if self.status == ItemStatus::Maintenance {
                    self.status = ItemStatus::Available;
                }
            }
            RentalItemEvent::ItemInspected(data) => {
                self.condition = data.condition;
            }
            RentalItemEvent::ItemRetired(_) => {
                for unit in &mut self.units {
                    unit.status = UnitStatus::Retired;
                }
                self.status = ItemStatus::Retired;
            }
            RentalItemEvent::QuantityAdded(data) => {
                self.units.extend(
                    data.unit_ids
                        .iter()
                        .map(|id| SkuUnit::new(*id, data.condition)),
                );
            }
            RentalItemEvent::QuantityRemoved(data) => {
                self.units.retain(|u| !data.unit_ids.contains(&u.unit_id));
            }
            RentalItemEvent::BasePriceSet(data) => {
                self.base_price = data.base_price;
            }
            RentalItemEvent::PricingStrategyChanged(data) => {
                self.pricing_strategy = data.strategy;
            }
        }
        self.refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn created(quantity: u32, base_price: f64, strategy: PricingStrategy) -> RentalItem {
        let cmd = CreateItem::new("Projector", "SN-100", base_price, quantity)
            .with_category(ItemCategory::Electronics)
            .with_strategy(strategy);
        let mut item = RentalItem::default();
        let events = item.create(&cmd).unwrap();
        item.apply_events(&events);
        item
    }

    fn rent(item: &mut RentalItem, quantity: u32) -> RentalId {
        let cmd = RentItem::new(
            item.id().unwrap(),
            "renter-1",
            quantity,
            Utc::now() + Duration::days(7),
        );
        let events = item.rent(&cmd).unwrap();
        let rental_id = match &events[0] {
            RentalItemEvent::ItemRented(data) => data.rental_id,
            other => panic!("unexpected event: {other:?}"),
        };
        item.apply_events(&events);
        rental_id
    }

    fn assert_consistent(item: &RentalItem) {
        assert!(item.available_quantity() <= item.total_quantity());
        assert_eq!(
            item.current_price(),
            pricing::price(
                item.base_price(),
                item.total_quantity(),
                item.available_quantity(),
                item.pricing_strategy()
            )
        );
    }

    #[test]
    fn create_initializes_unit_pool_at_base_price() {
        let item = created(5, 20.0, PricingStrategy::Linear);
        assert_eq!(item.total_quantity(), 5);
        assert_eq!(item.available_quantity(), 5);
        assert_eq!(item.status(), ItemStatus::Available);
        assert_eq!(item.current_price(), 20.0);
        assert_consistent(&item);
    }

    #[test]
    fn create_twice_is_rejected() {
        let item = created(1, 20.0, PricingStrategy::Linear);
        let err = item
            .create(&CreateItem::new("Other", "SN-2", 5.0, 1))
            .unwrap_err();
        assert_eq!(err, RentalError::Rejected("Item already exists".to_string()));
    }

    #[test]
    fn commands_against_missing_item_fail_existence_first() {
        let item = RentalItem::default();
        let err = item
            .rent(&RentItem::new(StreamId::new(), "renter-1", 1, Utc::now()))
            .unwrap_err();
        assert_eq!(err, RentalError::Rejected("Item must exist".to_string()));
    }

    #[test]
    fn renting_last_unit_goes_out_of_stock_and_doubles_linear_price() {
        let mut item = created(1, 50.0, PricingStrategy::Linear);
        rent(&mut item, 1);
        assert_eq!(item.available_quantity(), 0);
        assert_eq!(item.status(), ItemStatus::OutOfStock);
        assert_eq!(item.current_price(), 100.0);
        assert_consistent(&item);
    }

    #[test]
    fn returning_restores_availability_and_price() {
        let mut item = created(1, 50.0, PricingStrategy::Linear);
        let rental_id = rent(&mut item, 1);

        let events = item
            .return_rental(&ReturnItem::new(item.id().unwrap(), rental_id))
            .unwrap();
        item.apply_events(&events);

        assert_eq!(item.available_quantity(), 1);
        assert_eq!(item.status(), ItemStatus::Available);
        assert_eq!(item.current_price(), 50.0);
        assert!(item.active_rentals().is_empty());
        assert_consistent(&item);
    }

    #[test]
    fn renting_beyond_availability_is_rejected() {
        let item = created(2, 10.0, PricingStrategy::Linear);
        let err = item
            .rent(&RentItem::new(item.id().unwrap(), "renter-1", 3, Utc::now()))
            .unwrap_err();
        assert_eq!(
            err,
            RentalError::Rejected("Not enough available units for quantity 3".to_string())
        );
    }

    #[test]
    fn renting_when_nothing_available_fails_availability_rule_first() {
        let mut item = created(1, 10.0, PricingStrategy::Linear);
        rent(&mut item, 1);
        let err = item
            .rent(&RentItem::new(item.id().unwrap(), "renter-2", 1, Utc::now()))
            .unwrap_err();
        assert_eq!(
            err,
            RentalError::Rejected("Item must have available units".to_string())
        );
    }

    #[test]
    fn explicit_unit_selection_claims_those_units() {
        let item = created(3, 10.0, PricingStrategy::Linear);
        let wanted = item.units()[1].unit_id;
        let cmd = RentItem::new(item.id().unwrap(), "renter-1", 1, Utc::now())
            .with_units(vec![wanted]);
        let events = item.rent(&cmd).unwrap();
        match &events[0] {
            RentalItemEvent::ItemRented(data) => assert_eq!(data.unit_ids, vec![wanted]),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn renting_an_already_rented_unit_is_rejected() {
        let mut item = created(2, 10.0, PricingStrategy::Linear);
        let taken = item.units()[0].unit_id;
        let cmd = RentItem::new(item.id().unwrap(), "renter-1", 1, Utc::now())
            .with_units(vec![taken]);
        let events = item.rent(&cmd).unwrap();
        item.apply_events(&events);

        let err = item
            .rent(
                &RentItem::new(item.id().unwrap(), "renter-2", 1, Utc::now())
                    .with_units(vec![taken]),
            )
            .unwrap_err();
        assert_eq!(
            err,
            RentalError::Rejected("Requested units must be available".to_string())
        );
    }

    #[test]
    fn returning_unknown_rental_is_rejected() {
        let item = created(1, 10.0, PricingStrategy::Linear);
        let err = item
            .return_rental(&ReturnItem::new(item.id().unwrap(), RentalId::new()))
            .unwrap_err();
        assert_eq!(err, RentalError::Rejected(RENTAL_NOT_FOUND.to_string()));
    }

    #[test]
    fn quarantine_outranks_availability_after_return() {
        let mut item = created(1, 10.0, PricingStrategy::Linear);
        let rental_id = rent(&mut item, 1);

        // All units are out, so the damage report claims none of them, but
        // the item is still quarantined.
        let events = item
            .report_damage(&ReportDamage::new(
                item.id().unwrap(),
                "came back scratched",
                "staff-1",
            ))
            .unwrap();
        item.apply_events(&events);
        assert_eq!(item.status(), ItemStatus::Quarantined);
        assert_eq!(item.condition(), ItemCondition::Damaged);

        let events = item
            .return_rental(&ReturnItem::new(item.id().unwrap(), rental_id))
            .unwrap();
        item.apply_events(&events);

        assert_eq!(item.available_quantity(), 1);
        assert_eq!(item.status(), ItemStatus::Quarantined);
        assert_consistent(&item);
    }

    #[test]
    fn damage_pulls_available_units_and_reduces_availability() {
        let mut item = created(3, 10.0, PricingStrategy::Linear);
        let events = item
            .report_damage(
                &ReportDamage::new(item.id().unwrap(), "dented", "staff-1").with_quantity(2),
            )
            .unwrap();
        item.apply_events(&events);

        assert_eq!(item.available_quantity(), 1);
        assert_eq!(item.status(), ItemStatus::Quarantined);
        assert!(item.damage_report().is_some());
        assert_consistent(&item);
    }

    #[test]
    fn maintenance_cycle_pulls_and_restores_units() {
        let mut item = created(2, 10.0, PricingStrategy::Linear);

        let events = item
            .schedule_maintenance(&ScheduleMaintenance::new(
                item.id().unwrap(),
                "annual service",
            ))
            .unwrap();
        item.apply_events(&events);
        assert_eq!(item.status(), ItemStatus::Maintenance);
        assert_eq!(item.available_quantity(), 0);
        assert_eq!(item.maintenance_reason(), Some("annual service"));
        assert_consistent(&item);

        let events = item
            .complete_maintenance(&CompleteMaintenance::new(item.id().unwrap()))
            .unwrap();
        item.apply_events(&events);
        assert_eq!(item.status(), ItemStatus::Available);
        assert_eq!(item.available_quantity(), 2);
        assert_eq!(item.maintenance_reason(), None);
        assert_consistent(&item);
    }

    #[test]
    fn complete_maintenance_requires_maintenance_status() {
        let item = created(1, 10.0, PricingStrategy::Linear);
        let err = item
            .complete_maintenance(&CompleteMaintenance::new(item.id().unwrap()))
            .unwrap_err();
        assert_eq!(
            err,
            RentalError::Rejected("Item must be in maintenance".to_string())
        );
    }

    #[test]
    fn retire_is_terminal() {
        let mut item = created(2, 10.0, PricingStrategy::Linear);
        let events = item.retire(&RetireItem::new(item.id().unwrap())).unwrap();
        item.apply_events(&events);

        assert_eq!(item.status(), ItemStatus::Retired);
        assert_eq!(item.available_quantity(), 0);
        assert_consistent(&item);

        let err = item
            .retire(&RetireItem::new(item.id().unwrap()))
            .unwrap_err();
        assert_eq!(
            err,
            RentalError::Rejected("Item must not be retired".to_string())
        );
        let err = item
            .rent(&RentItem::new(item.id().unwrap(), "renter-1", 1, Utc::now()))
            .unwrap_err();
        assert_eq!(
            err,
            RentalError::Rejected("Item must not be retired".to_string())
        );
    }

    #[test]
    fn quantity_changes_recompute_price() {
        let mut item = created(2, 100.0, PricingStrategy::Tiered);
        let rental_id = rent(&mut item, 1);
        // ratio 0.5 falls to the 1.5x tier
        assert_eq!(item.current_price(), 150.0);

        let events = item
            .add_quantity(&AddQuantity::new(item.id().unwrap(), 2))
            .unwrap();
        item.apply_events(&events);
        // ratio 0.75 falls to the 1.25x tier
        assert_eq!(item.total_quantity(), 4);
        assert_eq!(item.current_price(), 125.0);
        assert_consistent(&item);

        let events = item
            .return_rental(&ReturnItem::new(item.id().unwrap(), rental_id))
            .unwrap();
        item.apply_events(&events);
        assert_eq!(item.current_price(), 100.0);
        assert_consistent(&item);
    }

    #[test]
    fn remove_quantity_beyond_availability_is_rejected() {
        let mut item = created(2, 10.0, PricingStrategy::Linear);
        rent(&mut item, 1);
        let err = item
            .remove_quantity(&RemoveQuantity::new(item.id().unwrap(), 2))
            .unwrap_err();
        assert_eq!(
            err,
            RentalError::Rejected("Not enough available units for quantity 2".to_string())
        );
    }

    #[test]
    fn price_and_strategy_changes_recompute_price() {
        let mut item = created(2, 50.0, PricingStrategy::Linear);
        rent(&mut item, 1);
        assert_eq!(item.current_price(), 75.0);

        let events = item
            .set_base_price(&SetBasePrice::new(item.id().unwrap(), 100.0))
            .unwrap();
        item.apply_events(&events);
        assert_eq!(item.base_price(), 100.0);
        assert_eq!(item.current_price(), 150.0);

        let events = item
            .set_pricing_strategy(&SetPricingStrategy::new(
                item.id().unwrap(),
                PricingStrategy::Tiered,
            ))
            .unwrap();
        item.apply_events(&events);
        assert_eq!(item.current_price(), 150.0);
        assert_consistent(&item);
    }

    #[test]
    fn inspection_updates_condition_only() {
        let mut item = created(1, 10.0, PricingStrategy::Linear);
        let events = item
            .inspect(&InspectItem::new(item.id().unwrap(), ItemCondition::Fair))
            .unwrap();
        item.apply_events(&events);

        assert_eq!(item.condition(), ItemCondition::Fair);
        assert_eq!(item.status(), ItemStatus::Available);
        assert_eq!(item.available_quantity(), 1);
        assert_consistent(&item);
    }

    #[test]
    fn replay_is_deterministic() {
        // Drive a live aggregate through a command sequence, keeping the
        // emitted events, then fold the log from scratch and compare.
        let mut item = RentalItem::default();
        let mut log: Vec<RentalItemEvent> = Vec::new();
        let mut run = |item: &mut RentalItem, events: Vec<RentalItemEvent>| {
            item.apply_events(&events);
            log.extend(events);
        };

        let cmd = CreateItem::new("Projector", "SN-100", 40.0, 3)
            .with_strategy(PricingStrategy::Exponential);
        let events = item.create(&cmd).unwrap();
        run(&mut item, events);

        let events = item
            .rent(&RentItem::new(
                item.id().unwrap(),
                "renter-1",
                2,
                Utc::now() + Duration::days(3),
            ))
            .unwrap();
        run(&mut item, events);

        let rental_id = item.active_rentals()[0].rental_id;
        let events = item
            .return_rental(&ReturnItem::new(item.id().unwrap(), rental_id))
            .unwrap();
        run(&mut item, events);

        let events = item
            .report_damage(&ReportDamage::new(item.id().unwrap(), "worn lens", "staff-1"))
            .unwrap();
        run(&mut item, events);

        let mut from_scratch = RentalItem::default();
        from_scratch.apply_events(&log);

        assert_eq!(from_scratch.status(), item.status());
        assert_eq!(from_scratch.condition(), item.condition());
        assert_eq!(from_scratch.available_quantity(), item.available_quantity());
        assert_eq!(from_scratch.current_price(), item.current_price());
        assert_eq!(from_scratch.units(), item.units());
        assert_eq!(from_scratch.active_rentals(), item.active_rentals());
    }
}

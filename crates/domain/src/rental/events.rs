//! Rental item domain events.

use chrono::{DateTime, Utc};
use event_store::StreamId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::state::{
    ItemCategory, ItemCondition, PricingStrategy, RentalId, UnitId,
};

/// Events that can occur on a rental item aggregate.
///
/// Every fact that affects availability names the exact unit ids it claims
/// or releases, so replay never has to guess which units a rental, damage
/// report, or maintenance window touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RentalItemEvent {
    /// Item was added to the catalog.
    ItemCreated(ItemCreatedData),

    /// Units were rented out.
    ItemRented(ItemRentedData),

    /// A rental's units were returned.
    ItemReturned(ItemReturnedData),

    /// Damage was reported; the item is quarantined.
    DamageReported(DamageReportedData),

    /// Units were pulled from availability for maintenance.
    MaintenanceScheduled(MaintenanceScheduledData),

    /// Maintenance finished; units returned to availability.
    MaintenanceCompleted(MaintenanceCompletedData),

    /// Item condition was assessed.
    ItemInspected(ItemInspectedData),

    /// Item was permanently retired. Terminal.
    ItemRetired(ItemRetiredData),

    /// New units were added to the pool.
    QuantityAdded(QuantityAddedData),

    /// Units were removed from the pool.
    QuantityRemoved(QuantityRemovedData),

    /// Base price was changed.
    BasePriceSet(BasePriceSetData),

    /// Pricing strategy was changed.
    PricingStrategyChanged(PricingStrategyChangedData),
}

impl DomainEvent for RentalItemEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RentalItemEvent::ItemCreated(_) => "ItemCreated",
            RentalItemEvent::ItemRented(_) => "ItemRented",
            RentalItemEvent::ItemReturned(_) => "ItemReturned",
            RentalItemEvent::DamageReported(_) => "DamageReported",
            RentalItemEvent::MaintenanceScheduled(_) => "MaintenanceScheduled",
            RentalItemEvent::MaintenanceCompleted(_) => "MaintenanceCompleted",
            RentalItemEvent::ItemInspected(_) => "ItemInspected",
            RentalItemEvent::ItemRetired(_) => "ItemRetired",
            RentalItemEvent::QuantityAdded(_) => "QuantityAdded",
            RentalItemEvent::QuantityRemoved(_) => "QuantityRemoved",
            RentalItemEvent::BasePriceSet(_) => "BasePriceSet",
            RentalItemEvent::PricingStrategyChanged(_) => "PricingStrategyChanged",
        }
    }
}

/// Data for ItemCreated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCreatedData {
    /// The stream the item lives on.
    pub item_id: StreamId,

    /// Display name.
    pub name: String,

    /// Optional free-form description.
    pub description: Option<String>,

    /// Manufacturer serial number or internal asset tag.
    pub serial_number: String,

    /// Catalog category.
    pub category: ItemCategory,

    /// Condition of the initial units.
    pub condition: ItemCondition,

    /// Base rental price.
    pub base_price: f64,

    /// Pricing strategy for demand-based price adjustments.
    pub pricing_strategy: PricingStrategy,

    /// Identifiers of the initial unit pool, one per physical unit.
    pub unit_ids: Vec<UnitId>,

    /// Optional catalog image.
    pub image_url: Option<String>,
}

/// Data for ItemRented event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRentedData {
    /// Identifier of this rental, used to return the same units later.
    pub rental_id: RentalId,

    /// Who rented the units.
    pub renter_id: String,

    /// The exact units claimed by this rental.
    pub unit_ids: Vec<UnitId>,

    /// Price in effect when the rental started.
    pub price_at_rental: f64,

    /// When the units are due back.
    pub expected_return_date: DateTime<Utc>,
}

/// Data for ItemReturned event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemReturnedData {
    /// The rental being closed.
    pub rental_id: RentalId,

    /// The units released back to availability.
    pub unit_ids: Vec<UnitId>,

    /// When the units came back.
    pub return_date: DateTime<Utc>,
}

/// Data for DamageReported event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageReportedData {
    /// What happened.
    pub description: String,

    /// Who reported the damage.
    pub reported_by: String,

    /// Available units pulled from the pool as damaged. May be empty when
    /// every unit was already unavailable at report time.
    pub unit_ids: Vec<UnitId>,
}

/// Data for MaintenanceScheduled event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceScheduledData {
    /// Why maintenance is needed.
    pub reason: String,

    /// Available units pulled from the pool for maintenance.
    pub unit_ids: Vec<UnitId>,
}

/// Data for MaintenanceCompleted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceCompletedData {
    /// Optional completion notes.
    pub notes: Option<String>,

    /// Units restored to availability.
    pub unit_ids: Vec<UnitId>,
}

/// Data for ItemInspected event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemInspectedData {
    /// Condition assessed by the inspection.
    pub condition: ItemCondition,

    /// Optional inspection notes.
    pub notes: Option<String>,
}

/// Data for ItemRetired event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRetiredData {
    /// Optional reason for retiring the item.
    pub reason: Option<String>,
}

/// Data for QuantityAdded event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantityAddedData {
    /// Identifiers of the newly added units.
    pub unit_ids: Vec<UnitId>,

    /// Condition of the added units.
    pub condition: ItemCondition,

    /// Optional restock note.
    pub reason: Option<String>,
}

/// Data for QuantityRemoved event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantityRemovedData {
    /// The units removed from the pool.
    pub unit_ids: Vec<UnitId>,

    /// Optional removal note.
    pub reason: Option<String>,
}

/// Data for BasePriceSet event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasePriceSetData {
    /// The new base price.
    pub base_price: f64,

    /// The base price it replaced.
    pub previous_price: f64,
}

/// Data for PricingStrategyChanged event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingStrategyChangedData {
    /// The new strategy.
    pub strategy: PricingStrategy,

    /// The strategy it replaced.
    pub previous_strategy: PricingStrategy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_and_data_tags() {
        let event = RentalItemEvent::BasePriceSet(BasePriceSetData {
            base_price: 25.5,
            previous_price: 20.0,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "BasePriceSet");
        assert_eq!(json["data"]["base_price"], 25.5);
    }

    #[test]
    fn event_type_matches_serialized_tag() {
        use crate::aggregate::DomainEvent;

        let event = RentalItemEvent::ItemRetired(ItemRetiredData { reason: None });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.event_type());
    }

    #[test]
    fn roundtrips_unit_ids() {
        let unit_ids = vec![UnitId::new(), UnitId::new()];
        let event = RentalItemEvent::MaintenanceScheduled(MaintenanceScheduledData {
            reason: "annual service".to_string(),
            unit_ids: unit_ids.clone(),
        });
        let json = serde_json::to_string(&event).unwrap();
        let back: RentalItemEvent = serde_json::from_str(&json).unwrap();
        match back {
            RentalItemEvent::MaintenanceScheduled(data) => assert_eq!(data.unit_ids, unit_ids),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}

//! Item catalog read model: one denormalized record per rental item.
//!
//! The record keeps a per-unit status map rather than counters, so every
//! handler is a set operation and redelivering an event leaves the record
//! unchanged. Totals, availability, and price are derived on read.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{
    Aggregate, ItemCategory, ItemCondition, ItemStatus, PricingStrategy, RentalId, RentalItem,
    RentalItemEvent, UnitId, UnitStatus, pricing,
};
use event_store::{EventEnvelope, GlobalSequence, StreamId};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::Result;
use crate::projection::Projection;
use crate::read_model::ReadModel;

/// A denormalized catalog record, as returned to query callers.
#[derive(Debug, Clone, Serialize)]
pub struct ItemRecord {
    pub item_id: StreamId,
    pub name: String,
    pub category: ItemCategory,
    pub status: ItemStatus,
    pub condition: ItemCondition,
    pub total_quantity: u32,
    pub available_quantity: u32,
    pub base_price: f64,
    pub current_price: f64,
    pub pricing_strategy: PricingStrategy,
    pub active_rentals: usize,
    pub image_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Filter for catalog listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogFilter {
    pub category: Option<ItemCategory>,
    /// When true, only items with at least one available unit; when false,
    /// only items with none.
    pub in_stock: Option<bool>,
}

impl CatalogFilter {
    fn matches(&self, record: &ItemRecord) -> bool {
        if let Some(category) = self.category
            && record.category != category
        {
            return false;
        }
        if let Some(in_stock) = self.in_stock
            && (record.available_quantity > 0) != in_stock
        {
            return false;
        }
        true
    }
}

/// Aggregated counts over the catalog.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogSummary {
    pub total_items: usize,
    pub by_category: HashMap<String, usize>,
    pub by_status: HashMap<String, usize>,
}

/// Internal per-item state.
#[derive(Debug, Clone)]
struct ItemState {
    name: String,
    category: ItemCategory,
    status: ItemStatus,
    condition: ItemCondition,
    units: HashMap<UnitId, UnitStatus>,
    rentals: HashSet<RentalId>,
    base_price: f64,
    current_price: f64,
    pricing_strategy: PricingStrategy,
    image_url: Option<String>,
    updated_at: DateTime<Utc>,
}

impl ItemState {
    fn total_quantity(&self) -> u32 {
        self.units.len() as u32
    }

    fn available_quantity(&self) -> u32 {
        self.units
            .values()
            .filter(|s| **s == UnitStatus::Available)
            .count() as u32
    }

    fn mark(&mut self, unit_ids: &[UnitId], status: UnitStatus) {
        for id in unit_ids {
            if let Some(current) = self.units.get_mut(id) {
                *current = status;
            }
        }
    }

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

    fn apply(&mut self, event: &RentalItemEvent, timestamp: DateTime<Utc>) {
        match event {
            // Creation is handled by the view, which inserts the record.
            RentalItemEvent::ItemCreated(_) => {}
            RentalItemEvent::ItemRented(data) => {
                self.mark(&data.unit_ids, UnitStatus::Rented);
                self.rentals.insert(data.rental_id);
            }
            RentalItemEvent::ItemReturned(data) => {
                self.rentals.remove(&data.rental_id);
                for id in &data.unit_ids {
                    if self.units.get(id) == Some(&UnitStatus::Rented) {
                        self.units.insert(*id, UnitStatus::Available);
                    }
                }
            }
            RentalItemEvent::DamageReported(data) => {
                self.mark(&data.unit_ids, UnitStatus::Damaged);
                self.status = ItemStatus::Quarantined;
                self.condition = ItemCondition::Damaged;
            }
            RentalItemEvent::MaintenanceScheduled(data) => {
                self.mark(&data.unit_ids, UnitStatus::Maintenance);
                self.status = ItemStatus::Maintenance;
            }
            RentalItemEvent::MaintenanceCompleted(data) => {
                for id in &data.unit_ids {
                    if self.units.get(id) == Some(&UnitStatus::Maintenance) {
                        self.units.insert(*id, UnitStatus::Available);
                    }
                }
                if self.status == ItemStatus::Maintenance {
                    self.status = ItemStatus::Available;
                }
            }
            RentalItemEvent::ItemInspected(data) => {
                self.condition = data.condition;
            }
            RentalItemEvent::ItemRetired(_) => {
                for status in self.units.values_mut() {
                    *status = UnitStatus::Retired;
                }
                self.status = ItemStatus::Retired;
            }
            RentalItemEvent::QuantityAdded(data) => {
                for id in &data.unit_ids {
                    self.units.entry(*id).or_insert(UnitStatus::Available);
                }
            }
            RentalItemEvent::QuantityRemoved(data) => {
                for id in &data.unit_ids {
                    self.units.remove(id);
                }
            }
            RentalItemEvent::BasePriceSet(data) => {
                self.base_price = data.base_price;
            }
            RentalItemEvent::PricingStrategyChanged(data) => {
                self.pricing_strategy = data.strategy;
            }
        }
        self.refresh();
        self.updated_at = timestamp;
    }

    fn record(&self, item_id: StreamId) -> ItemRecord {
        ItemRecord {
            item_id,
            name: self.name.clone(),
            category: self.category,
            status: self.status,
            condition: self.condition,
            total_quantity: self.total_quantity(),
            available_quantity: self.available_quantity(),
            base_price: self.base_price,
            current_price: self.current_price,
            pricing_strategy: self.pricing_strategy,
            active_rentals: self.rentals.len(),
            image_url: self.image_url.clone(),
            updated_at: self.updated_at,
        }
    }
}

struct CatalogState {
    items: HashMap<StreamId, ItemState>,
    position: GlobalSequence,
}

/// Read model view of the rental item catalog.
#[derive(Clone)]
pub struct ItemCatalogView {
    state: Arc<RwLock<CatalogState>>,
}

impl ItemCatalogView {
    /// Creates a new empty catalog view.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(CatalogState {
                items: HashMap::new(),
                position: GlobalSequence::start(),
            })),
        }
    }

    /// Returns the record for one item, if the view has seen it.
    pub async fn get(&self, item_id: StreamId) -> Option<ItemRecord> {
        let state = self.state.read().await;
        state.items.get(&item_id).map(|item| item.record(item_id))
    }

    /// Lists records matching the filter, sorted by name.
    pub async fn list(&self, filter: &CatalogFilter) -> Vec<ItemRecord> {
        let state = self.state.read().await;
        let mut records: Vec<ItemRecord> = state
            .items
            .iter()
            .map(|(id, item)| item.record(*id))
            .filter(|record| filter.matches(record))
            .collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records
    }

    /// Aggregated counts by category and status.
    pub async fn summarize(&self) -> CatalogSummary {
        let state = self.state.read().await;
        let mut summary = CatalogSummary {
            total_items: state.items.len(),
            ..CatalogSummary::default()
        };
        for item in state.items.values() {
            *summary
                .by_category
                .entry(item.category.as_str().to_string())
                .or_default() += 1;
            *summary
                .by_status
                .entry(item.status.as_str().to_string())
                .or_default() += 1;
        }
        summary
    }

    /// Fast path: overwrites the record from authoritative aggregate state
    /// at command time, for immediate read-after-write visibility.
    ///
    /// Does not touch the watermark; the next drain re-applies the same
    /// events and converges on the same record.
    pub async fn patch(&self, item: &RentalItem) {
        let Some(item_id) = item.id() else {
            return;
        };
        let state_entry = ItemState {
            name: item.name().to_string(),
            category: item.category(),
            status: item.status(),
            condition: item.condition(),
            units: item
                .units()
                .iter()
                .map(|u| (u.unit_id, u.status))
                .collect(),
            rentals: item
                .active_rentals()
                .iter()
                .map(|r| r.rental_id)
                .collect(),
            base_price: item.base_price(),
            current_price: item.current_price(),
            pricing_strategy: item.pricing_strategy(),
            image_url: item.image_url().map(String::from),
            updated_at: Utc::now(),
        };
        self.state.write().await.items.insert(item_id, state_entry);
    }
}

impl Default for ItemCatalogView {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Projection for ItemCatalogView {
    fn name(&self) -> &'static str {
        "item_catalog"
    }

    async fn handle(&self, envelope: &EventEnvelope) -> Result<()> {
        let event: RentalItemEvent = serde_json::from_value(envelope.payload.clone())?;
        let mut state = self.state.write().await;

        if let RentalItemEvent::ItemCreated(data) = &event {
            let mut item = ItemState {
                name: data.name.clone(),
                category: data.category,
                status: ItemStatus::Available,
                condition: data.condition,
                units: data
                    .unit_ids
                    .iter()
                    .map(|id| (*id, UnitStatus::Available))
                    .collect(),
                rentals: HashSet::new(),
                base_price: data.base_price,
                current_price: data.base_price,
                pricing_strategy: data.pricing_strategy,
                image_url: data.image_url.clone(),
                updated_at: envelope.timestamp,
            };
            item.refresh();
            state.items.insert(envelope.stream_id, item);
        } else if let Some(item) = state.items.get_mut(&envelope.stream_id) {
            item.apply(&event, envelope.timestamp);
        }
        // Events for unknown items are dropped; a rebuild backfills them.

        Ok(())
    }

    async fn position(&self) -> GlobalSequence {
        self.state.read().await.position
    }

    async fn set_position(&self, position: GlobalSequence) {
        let mut state = self.state.write().await;
        if position > state.position {
            state.position = position;
        }
    }

    async fn reset(&self) -> Result<()> {
        let mut state = self.state.write().await;
        state.items.clear();
        state.position = GlobalSequence::start();
        Ok(())
    }
}

impl ReadModel for ItemCatalogView {
    fn name(&self) -> &'static str {
        "item_catalog"
    }

    fn count(&self) -> usize {
        self.state.try_read().map(|s| s.items.len()).unwrap_or(0)
    }
}

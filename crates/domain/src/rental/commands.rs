//! Rental item commands.
//!
//! Commands carry caller intent. `validate` rejects malformed payloads
//! before any state is loaded; business rules are evaluated separately by
//! the aggregate against current state.

use chrono::{DateTime, Utc};
use event_store::StreamId;

use super::aggregate::RentalError;
use super::state::{ItemCategory, ItemCondition, PricingStrategy, RentalId, UnitId};

fn require(condition: bool, message: &str) -> Result<(), RentalError> {
    if condition {
        Ok(())
    } else {
        Err(RentalError::Validation(message.to_string()))
    }
}

fn require_price(value: f64) -> Result<(), RentalError> {
    require(
        value.is_finite() && value >= 0.0,
        "Base price must be a non-negative number",
    )
}

/// Command to add a new item to the catalog.
#[derive(Debug, Clone)]
pub struct CreateItem {
    /// The stream the new item will live on.
    pub item_id: StreamId,
    pub name: String,
    pub description: Option<String>,
    pub serial_number: String,
    pub category: ItemCategory,
    pub condition: ItemCondition,
    pub base_price: f64,
    pub pricing_strategy: PricingStrategy,
    /// Size of the initial unit pool.
    pub initial_quantity: u32,
    pub image_url: Option<String>,
}

impl CreateItem {
    pub fn new(
        name: impl Into<String>,
        serial_number: impl Into<String>,
        base_price: f64,
        initial_quantity: u32,
    ) -> Self {
        Self {
            item_id: StreamId::new(),
            name: name.into(),
            description: None,
            serial_number: serial_number.into(),
            category: ItemCategory::default(),
            condition: ItemCondition::default(),
            base_price,
            pricing_strategy: PricingStrategy::default(),
            initial_quantity,
            image_url: None,
        }
    }

    pub fn with_category(mut self, category: ItemCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_condition(mut self, condition: ItemCondition) -> Self {
        self.condition = condition;
        self
    }

    pub fn with_strategy(mut self, strategy: PricingStrategy) -> Self {
        self.pricing_strategy = strategy;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn validate(&self) -> Result<(), RentalError> {
        require(!self.name.trim().is_empty(), "Item name must not be empty")?;
        require(
            !self.serial_number.trim().is_empty(),
            "Serial number must not be empty",
        )?;
        require_price(self.base_price)?;
        require(
            self.initial_quantity >= 1,
            "Initial quantity must be at least 1",
        )
    }
}

/// Command to rent units of an item.
#[derive(Debug, Clone)]
pub struct RentItem {
    pub item_id: StreamId,
    pub renter_id: String,
    /// Number of units to rent.
    pub quantity: u32,
    /// Specific units to rent. When absent, the first available units in
    /// pool order are selected.
    pub unit_ids: Option<Vec<UnitId>>,
    pub expected_return_date: DateTime<Utc>,
}

impl RentItem {
    pub fn new(
        item_id: StreamId,
        renter_id: impl Into<String>,
        quantity: u32,
        expected_return_date: DateTime<Utc>,
    ) -> Self {
        Self {
            item_id,
            renter_id: renter_id.into(),
            quantity,
            unit_ids: None,
            expected_return_date,
        }
    }

    pub fn with_units(mut self, unit_ids: Vec<UnitId>) -> Self {
        self.quantity = unit_ids.len() as u32;
        self.unit_ids = Some(unit_ids);
        self
    }

    pub fn validate(&self) -> Result<(), RentalError> {
        require(
            !self.renter_id.trim().is_empty(),
            "Renter id must not be empty",
        )?;
        require(self.quantity >= 1, "Rental quantity must be at least 1")?;
        if let Some(unit_ids) = &self.unit_ids {
            require(
                unit_ids.len() as u32 == self.quantity,
                "Requested unit list must match the rental quantity",
            )?;
            let mut seen = std::collections::HashSet::new();
            require(
                unit_ids.iter().all(|id| seen.insert(*id)),
                "Requested unit list must not contain duplicates",
            )?;
        }
        Ok(())
    }
}

/// Command to return a rental's units.
#[derive(Debug, Clone)]
pub struct ReturnItem {
    pub item_id: StreamId,
    pub rental_id: RentalId,
    /// When the units came back. Defaults to now.
    pub return_date: Option<DateTime<Utc>>,
}

impl ReturnItem {
    pub fn new(item_id: StreamId, rental_id: RentalId) -> Self {
        Self {
            item_id,
            rental_id,
            return_date: None,
        }
    }

    pub fn validate(&self) -> Result<(), RentalError> {
        Ok(())
    }
}

/// Command to report damage on an item.
#[derive(Debug, Clone)]
pub struct ReportDamage {
    pub item_id: StreamId,
    pub description: String,
    pub reported_by: String,
    /// How many units are affected. Defaults to 1; clamped to what is
    /// actually available.
    pub quantity_affected: u32,
}

impl ReportDamage {
    pub fn new(
        item_id: StreamId,
        description: impl Into<String>,
        reported_by: impl Into<String>,
    ) -> Self {
        Self {
            item_id,
            description: description.into(),
            reported_by: reported_by.into(),
            quantity_affected: 1,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity_affected = quantity;
        self
    }

    pub fn validate(&self) -> Result<(), RentalError> {
        require(
            !self.description.trim().is_empty(),
            "Damage description must not be empty",
        )?;
        require(
            !self.reported_by.trim().is_empty(),
            "Damage reporter must not be empty",
        )?;
        require(
            self.quantity_affected >= 1,
            "Affected quantity must be at least 1",
        )
    }
}

/// Command to pull units from availability for maintenance.
#[derive(Debug, Clone)]
pub struct ScheduleMaintenance {
    pub item_id: StreamId,
    pub reason: String,
    /// How many units to pull. When absent, all currently available units
    /// are pulled.
    pub quantity: Option<u32>,
}

impl ScheduleMaintenance {
    pub fn new(item_id: StreamId, reason: impl Into<String>) -> Self {
        Self {
            item_id,
            reason: reason.into(),
            quantity: None,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn validate(&self) -> Result<(), RentalError> {
        require(
            !self.reason.trim().is_empty(),
            "Maintenance reason must not be empty",
        )?;
        if let Some(quantity) = self.quantity {
            require(quantity >= 1, "Maintenance quantity must be at least 1")?;
        }
        Ok(())
    }
}

/// Command to complete maintenance and restore units.
#[derive(Debug, Clone)]
pub struct CompleteMaintenance {
    pub item_id: StreamId,
    pub notes: Option<String>,
    /// How many units to restore. When absent, all units currently in
    /// maintenance are restored.
    pub quantity: Option<u32>,
}

impl CompleteMaintenance {
    pub fn new(item_id: StreamId) -> Self {
        Self {
            item_id,
            notes: None,
            quantity: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn validate(&self) -> Result<(), RentalError> {
        if let Some(quantity) = self.quantity {
            require(quantity >= 1, "Restored quantity must be at least 1")?;
        }
        Ok(())
    }
}

/// Command to record an inspection result.
#[derive(Debug, Clone)]
pub struct InspectItem {
    pub item_id: StreamId,
    pub condition: ItemCondition,
    pub notes: Option<String>,
}

impl InspectItem {
    pub fn new(item_id: StreamId, condition: ItemCondition) -> Self {
        Self {
            item_id,
            condition,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn validate(&self) -> Result<(), RentalError> {
        Ok(())
    }
}

/// Command to permanently retire an item.
#[derive(Debug, Clone)]
pub struct RetireItem {
    pub item_id: StreamId,
    pub reason: Option<String>,
}

impl RetireItem {
    pub fn new(item_id: StreamId) -> Self {
        Self {
            item_id,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn validate(&self) -> Result<(), RentalError> {
        Ok(())
    }
}

/// Command to add units to the pool.
#[derive(Debug, Clone)]
pub struct AddQuantity {
    pub item_id: StreamId,
    pub amount: u32,
    /// Condition of the new units.
    pub condition: ItemCondition,
    pub reason: Option<String>,
}

impl AddQuantity {
    pub fn new(item_id: StreamId, amount: u32) -> Self {
        Self {
            item_id,
            amount,
            condition: ItemCondition::New,
            reason: None,
        }
    }

    pub fn with_condition(mut self, condition: ItemCondition) -> Self {
        self.condition = condition;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn validate(&self) -> Result<(), RentalError> {
        require(self.amount >= 1, "Added quantity must be at least 1")
    }
}

/// Command to remove available units from the pool.
#[derive(Debug, Clone)]
pub struct RemoveQuantity {
    pub item_id: StreamId,
    pub amount: u32,
    pub reason: Option<String>,
}

impl RemoveQuantity {
    pub fn new(item_id: StreamId, amount: u32) -> Self {
        Self {
            item_id,
            amount,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn validate(&self) -> Result<(), RentalError> {
        require(self.amount >= 1, "Removed quantity must be at least 1")
    }
}

/// Command to change the base price.
#[derive(Debug, Clone)]
pub struct SetBasePrice {
    pub item_id: StreamId,
    pub base_price: f64,
}

impl SetBasePrice {
    pub fn new(item_id: StreamId, base_price: f64) -> Self {
        Self {
            item_id,
            base_price,
        }
    }

    pub fn validate(&self) -> Result<(), RentalError> {
        require_price(self.base_price)
    }
}

/// Command to change the pricing strategy.
#[derive(Debug, Clone)]
pub struct SetPricingStrategy {
    pub item_id: StreamId,
    pub strategy: PricingStrategy,
}

impl SetPricingStrategy {
    pub fn new(item_id: StreamId, strategy: PricingStrategy) -> Self {
        Self { item_id, strategy }
    }

    pub fn validate(&self) -> Result<(), RentalError> {
        Ok(())
    }
}

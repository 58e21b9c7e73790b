use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a rental item as a whole.
///
/// `Available`, `OutOfStock`, and `Rented` are derived from unit
/// availability. `Quarantined`, `Maintenance`, and `Retired` are exceptional
/// statuses that outrank availability until explicitly cleared; `Retired` is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ItemStatus {
    #[default]
    Available,
    OutOfStock,
    Rented,
    Maintenance,
    Quarantined,
    Retired,
}

impl ItemStatus {
    /// True for statuses that outrank availability-derived status.
    pub fn is_exceptional(&self) -> bool {
        matches!(
            self,
            ItemStatus::Quarantined | ItemStatus::Maintenance | ItemStatus::Retired
        )
    }

    /// True when no further state-mutating command can succeed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ItemStatus::Retired)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Available => "Available",
            ItemStatus::OutOfStock => "OutOfStock",
            ItemStatus::Rented => "Rented",
            ItemStatus::Maintenance => "Maintenance",
            ItemStatus::Quarantined => "Quarantined",
            ItemStatus::Retired => "Retired",
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical condition of an item or unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ItemCondition {
    #[default]
    New,
    Good,
    Fair,
    Poor,
    Damaged,
}

impl ItemCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCondition::New => "New",
            ItemCondition::Good => "Good",
            ItemCondition::Fair => "Fair",
            ItemCondition::Poor => "Poor",
            ItemCondition::Damaged => "Damaged",
        }
    }
}

impl std::fmt::Display for ItemCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog category of a rental item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ItemCategory {
    Electronics,
    Tools,
    Sports,
    Camping,
    Party,
    #[default]
    Other,
}

impl ItemCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Electronics => "Electronics",
            ItemCategory::Tools => "Tools",
            ItemCategory::Sports => "Sports",
            ItemCategory::Camping => "Camping",
            ItemCategory::Party => "Party",
            ItemCategory::Other => "Other",
        }
    }
}

impl std::fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy used to derive the current price from availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PricingStrategy {
    #[default]
    Linear,
    Exponential,
    Tiered,
}

impl std::fmt::Display for PricingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PricingStrategy::Linear => "Linear",
            PricingStrategy::Exponential => "Exponential",
            PricingStrategy::Tiered => "Tiered",
        };
        f.write_str(name)
    }
}

/// Unique identifier for an individually tracked unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(Uuid);

impl UnitId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UnitId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a rental.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RentalId(Uuid);

impl RentalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RentalId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RentalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a single unit. A unit is in exactly one of these at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UnitStatus {
    #[default]
    Available,
    Rented,
    Maintenance,
    Damaged,
    Retired,
}

/// An individually tracked physical instance of a rental item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuUnit {
    pub unit_id: UnitId,
    pub status: UnitStatus,
    pub condition: ItemCondition,
}

impl SkuUnit {
    pub fn new(unit_id: UnitId, condition: ItemCondition) -> Self {
        Self {
            unit_id,
            status: UnitStatus::Available,
            condition,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == UnitStatus::Available
    }
}

/// An active rental of one or more units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rental {
    pub rental_id: RentalId,
    pub renter_id: String,
    pub unit_ids: Vec<UnitId>,
    pub expected_return_date: DateTime<Utc>,
}

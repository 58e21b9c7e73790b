//! The rental item aggregate and its surrounding machinery.

pub mod aggregate;
pub mod commands;
pub mod events;
pub mod pricing;
pub mod service;
pub mod state;

pub use aggregate::{RentalError, RentalItem};
pub use commands::{
    AddQuantity, CompleteMaintenance, CreateItem, InspectItem, RemoveQuantity, RentItem,
    ReportDamage, RetireItem, ReturnItem, ScheduleMaintenance, SetBasePrice, SetPricingStrategy,
};
pub use events::RentalItemEvent;
pub use service::RentalItemService;
pub use state::{
    ItemCategory, ItemCondition, ItemStatus, PricingStrategy, Rental, RentalId, SkuUnit, UnitId,
    UnitStatus,
};

//! Domain layer for the rental inventory event-sourcing system.
//!
//! This crate provides the core domain abstractions including:
//! - Aggregate trait for event-sourced entities
//! - DomainEvent trait for domain events
//! - Ordered invariant evaluation with short-circuit on first failure
//! - CommandHandler with per-stream serialized command processing
//! - RentalItem aggregate with SKU-unit tracking and dynamic pricing

pub mod aggregate;
pub mod command;
pub mod error;
pub mod invariant;
pub mod rental;

pub use aggregate::{Aggregate, DomainEvent};
pub use command::{CommandHandler, CommandResult};
pub use error::DomainError;
pub use invariant::{Invariant, check_invariants};
pub use rental::{
    AddQuantity, CompleteMaintenance, CreateItem, InspectItem, ItemCategory, ItemCondition,
    ItemStatus, PricingStrategy, RemoveQuantity, Rental, RentalError, RentalId, RentalItem,
    RentalItemEvent, RentalItemService, RentItem, ReportDamage, RetireItem, ReturnItem,
    ScheduleMaintenance, SetBasePrice, SetPricingStrategy, SkuUnit, UnitId, UnitStatus, pricing,
};

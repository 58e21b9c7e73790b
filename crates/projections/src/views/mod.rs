//! Read model views.

pub mod item_catalog;

pub use item_catalog::{CatalogFilter, CatalogSummary, ItemCatalogView, ItemRecord};

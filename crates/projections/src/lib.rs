//! Read models and projections for the CQRS query side.
//!
//! This crate provides the query side of the system:
//! - [`Projection`] trait for processing events into read models, with a
//!   global-sequence watermark per projection
//! - [`ReadModel`] trait for query access to denormalized data
//! - [`ProjectionProcessor`] with `drain()` catch-up from the event store
//! - [`ItemCatalogView`], the denormalized rental item catalog

pub mod error;
pub mod processor;
pub mod projection;
pub mod read_model;
pub mod views;

pub use error::{ProjectionError, Result};
pub use processor::ProjectionProcessor;
pub use projection::Projection;
pub use read_model::ReadModel;
pub use views::{CatalogFilter, CatalogSummary, ItemCatalogView, ItemRecord};

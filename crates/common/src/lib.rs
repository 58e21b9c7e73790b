//! Shared types used across the rental inventory event-sourcing crates.

mod types;

pub use types::{Actor, StreamId};

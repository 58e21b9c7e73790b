//! Reactive correlation and background scheduling.
//!
//! Correlation is the saga-style mechanism of this system: a background
//! scan over recently committed events that issues follow-up commands
//! through the normal write path. Delivery is at-least-once, so triggers
//! re-check current state before emitting anything.
//!
//! The [`DrainScheduler`] owns the background loop: a bounded work queue
//! fed by store commit notices plus a periodic tick, each cycle running a
//! projection drain and a correlation scan, then fanning out a
//! timestamp-only change signal to subscribers.

pub mod config;
pub mod engine;
pub mod error;
pub mod scheduler;
pub mod trigger;

pub use config::SchedulerConfig;
pub use engine::CorrelationEngine;
pub use error::{CorrelationError, Result};
pub use scheduler::{ChangeSignal, DrainScheduler};
pub use trigger::{CorrelationTrigger, DamageFollowUpTrigger};

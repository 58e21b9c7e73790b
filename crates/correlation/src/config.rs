//! Scheduler configuration loaded from environment variables.

use std::time::Duration;

/// Background scheduler configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `DRAIN_INTERVAL_MS`: periodic drain tick (default: `500`)
/// - `CORRELATION_BATCH_LIMIT`: max events per correlation scan
///   (default: `256`)
/// - `DRAIN_QUEUE_CAPACITY`: bound on the commit-notice work queue
///   (default: `64`)
/// - `CHANGE_SIGNAL_CAPACITY`: broadcast buffer for change signals
///   (default: `64`)
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub drain_interval: Duration,
    pub correlation_batch_limit: usize,
    pub queue_capacity: usize,
    pub signal_capacity: usize,
}

impl SchedulerConfig {
    /// Loads configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            drain_interval: std::env::var("DRAIN_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.drain_interval),
            correlation_batch_limit: std::env::var("CORRELATION_BATCH_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.correlation_batch_limit),
            queue_capacity: std::env::var("DRAIN_QUEUE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.queue_capacity),
            signal_capacity: std::env::var("CHANGE_SIGNAL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.signal_capacity),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            drain_interval: Duration::from_millis(500),
            correlation_batch_limit: 256,
            queue_capacity: 64,
            signal_capacity: 64,
        }
    }
}

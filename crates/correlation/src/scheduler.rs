//! Background drain scheduler.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use event_store::EventStore;
use projections::ProjectionProcessor;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::config::SchedulerConfig;
use crate::engine::CorrelationEngine;

/// Change notification fanned out to subscribers after a cycle that moved
/// anything. Carries only a timestamp; consumers re-query what they need.
#[derive(Debug, Clone, Copy)]
pub struct ChangeSignal {
    pub timestamp: DateTime<Utc>,
}

/// Owns the background drain-and-correlate loop.
///
/// Work cycles are triggered two ways: a bounded queue fed by store commit
/// notices (for low latency) and a periodic tick (so a lost notice can
/// only delay a cycle, never prevent it). When the queue is full the
/// notice is dropped; a queued cycle already covers that commit. Cycle
/// failures are logged and retried on the next trigger, never propagated.
pub struct DrainScheduler {
    signals: broadcast::Sender<ChangeSignal>,
    listener: JoinHandle<()>,
    worker: JoinHandle<()>,
}

impl DrainScheduler {
    /// Starts the background tasks.
    pub fn start<S>(
        store: Arc<S>,
        processor: Arc<ProjectionProcessor<S>>,
        engine: Arc<CorrelationEngine<S>>,
        config: SchedulerConfig,
    ) -> Self
    where
        S: EventStore + 'static,
    {
        let (signals, _) = broadcast::channel(config.signal_capacity);
        let (work_tx, mut work_rx) = mpsc::channel::<()>(config.queue_capacity);

        let mut commits = store.subscribe_commits();
        let listener = tokio::spawn(async move {
            loop {
                match commits.recv().await {
                    Ok(_) => {
                        let _ = work_tx.try_send(());
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "commit notices lagged");
                        let _ = work_tx.try_send(());
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let signals_out = signals.clone();
        let worker = tokio::spawn(async move {
            let mut tick = tokio::time::interval(config.drain_interval);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = tick.tick() => {}
                    notice = work_rx.recv() => {
                        if notice.is_none() {
                            break;
                        }
                    }
                }

                let mut changed = false;
                match processor.drain().await {
                    Ok(delivered) => changed |= delivered > 0,
                    Err(err) => {
                        tracing::error!(error = %err, "projection drain failed");
                        metrics::counter!("scheduler_cycle_failures").increment(1);
                    }
                }
                match engine.correlate().await {
                    Ok(processed) => changed |= processed > 0,
                    Err(err) => {
                        tracing::error!(error = %err, "correlation scan failed");
                        metrics::counter!("scheduler_cycle_failures").increment(1);
                    }
                }

                if changed {
                    // At-most-once: disconnected or lagged listeners miss
                    // signals and must re-query on reconnect.
                    let _ = signals_out.send(ChangeSignal {
                        timestamp: Utc::now(),
                    });
                }
            }
        });

        Self {
            signals,
            listener,
            worker,
        }
    }

    /// Subscribes to change signals. Dropping the receiver releases the
    /// registration.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeSignal> {
        self.signals.subscribe()
    }

    /// Number of currently registered signal listeners.
    pub fn listener_count(&self) -> usize {
        self.signals.receiver_count()
    }

    /// Stops the background tasks.
    pub fn shutdown(&self) {
        self.listener.abort();
        self.worker.abort();
    }
}

impl Drop for DrainScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

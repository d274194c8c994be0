//! # Coordinator builder.
//!
//! Assembles the event bus, the observer fan-out, and the coordinator
//! itself. Observers are optional; without any, no listener task is
//! spawned and events are only visible through
//! [`Coordinator::bus`](super::Coordinator::bus).

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::CoordinatorConfig;
use crate::events::Bus;
use crate::observers::{Observe, ObserverSet};

use super::coordinator::Coordinator;

/// Builder for constructing a [`Coordinator`] with optional observers.
pub struct CoordinatorBuilder {
    cfg: CoordinatorConfig,
    observers: Vec<Arc<dyn Observe>>,
}

impl CoordinatorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: CoordinatorConfig) -> Self {
        Self { cfg, observers: Vec::new() }
    }

    /// Adds one observer.
    pub fn with_observer(mut self, observer: Arc<dyn Observe>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Sets the full observer list.
    pub fn with_observers(mut self, observers: Vec<Arc<dyn Observe>>) -> Self {
        self.observers = observers;
        self
    }

    /// Builds the coordinator and, if observers were configured, spawns the
    /// bus listener that fans events out to them.
    ///
    /// The listener runs until [`Coordinator::shutdown`] cancels it; on the
    /// way out it drains events still buffered on the bus so observers see
    /// the closing sequence.
    pub fn build(self) -> Arc<Coordinator> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let token = CancellationToken::new();

        let coordinator = Arc::new_cyclic(|weak| {
            Coordinator::new_internal(self.cfg, bus.clone(), token.clone(), weak.clone())
        });

        if !self.observers.is_empty() {
            let set = ObserverSet::new(self.observers);
            let mut rx = bus.subscribe();

            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        msg = rx.recv() => match msg {
                            Ok(ev) => set.emit(&ev),
                            Err(RecvError::Closed) => break,
                            Err(RecvError::Lagged(skipped)) => {
                                warn!(skipped, "observer listener lagged behind the bus");
                                continue;
                            }
                        }
                    }
                }

                // Deliver whatever the shutdown sequence still published.
                while let Ok(ev) = rx.try_recv() {
                    set.emit(&ev);
                }
                set.close().await;
            });
        }

        coordinator
    }
}

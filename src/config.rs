//! # Coordinator configuration.
//!
//! [`CoordinatorConfig`] controls the event-bus capacity used for lifecycle
//! events. Registration and subscription behavior is not configurable; the
//! protocol is fixed by the coordinator.
//!
//! # Example
//! ```
//! use telewire::CoordinatorConfig;
//!
//! let mut cfg = CoordinatorConfig::default();
//! cfg.bus_capacity = 256;
//!
//! assert_eq!(cfg.bus_capacity, 256);
//! ```

/// Configuration for a [`Coordinator`](crate::Coordinator).
#[derive(Clone, Debug)]
pub struct CoordinatorConfig {
    /// Capacity of the lifecycle event bus channel.
    pub bus_capacity: usize,
}

impl Default for CoordinatorConfig {
    /// Provides a default configuration:
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self { bus_capacity: 1024 }
    }
}

impl CoordinatorConfig {
    /// Returns the bus capacity clamped to the minimum the channel accepts.
    pub(crate) fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

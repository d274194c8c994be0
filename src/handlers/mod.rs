//! # Telemetry handlers: consumer capability and per-handler state.
//!
//! This module provides the consumer-side types:
//! - [`Handler`] - trait for telemetry consumers (log writers, formatters,
//!   exporters)
//! - [`HandlerRef`] - shared handle (`Arc<dyn Handler>`)
//! - [`HandlerManager`] - per-registered-handler bookkeeping owned by the
//!   coordinator
//! - [`SubscriptionSnapshot`] - read-only view of a handler's subscriptions

mod handler;
mod manager;

pub use handler::{Handler, HandlerRef};
pub use manager::{HandlerManager, SubscriptionSnapshot};

pub(crate) use manager::PendingOutcome;

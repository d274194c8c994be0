//! # Lifecycle events emitted by the coordinator.
//!
//! Every registration, subscription, and wiring transition publishes an
//! [`Event`] on the [`Bus`]; [`Observe`](crate::Observe) implementations
//! receive them through the coordinator's fan-out.
//!
//! ```text
//! Event flow:
//!   Coordinator ── publish(Event) ──► Bus ──► listener ──► ObserverSet
//!                                                ┌────┴────┬─────────┐
//!                                                ▼         ▼         ▼
//!                                            LogWriter  Metrics   Custom
//! ```

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};

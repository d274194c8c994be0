//! # Event observers for the coordinator.
//!
//! This module provides the [`Observe`] trait and the fan-out machinery that
//! delivers coordinator lifecycle [`Event`](crate::Event)s to user-provided
//! observers (logging, metrics, audit).
//!
//! ## Architecture
//! ```text
//! Coordinator ── publish(Event) ──► Bus ──► listener ──► ObserverSet
//!                                              ┌──────────┼──────────┐
//!                                              ▼          ▼          ▼
//!                                         [queue O1] [queue O2] [queue ON]
//!                                              ▼          ▼          ▼
//!                                         worker O1  worker O2  worker ON
//!                                              ▼          ▼          ▼
//!                                         on_event()  on_event() on_event()
//! ```
//!
//! ## Observer types
//! - **Passive observers** - observe and react to events (logging, metrics,
//!   alerts)
//! - **Stateful observers** - maintain state based on events (wiring
//!   dashboards, health trackers)

mod observe;
mod set;

pub use observe::Observe;
pub use set::ObserverSet;

#[cfg(feature = "logging")]
mod embedded;
#[cfg(feature = "logging")]
pub use embedded::LogWriter;

//! # telewire
//!
//! **Telewire** is a lightweight telemetry wiring library for Rust.
//!
//! It correlates independently-arriving telemetry producers ("sources") with
//! independently-arriving consumers ("handlers") and wires a private
//! delivery channel (a "buffer manager") between each subscribed pair.
//! Sources and handlers register, deregister, subscribe, and unsubscribe
//! concurrently and in any order; every wiring is created exactly once and
//! torn down exactly once.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  ┌──────────────┐   ┌──────────────┐        ┌──────────────┐
//!  │   Source     │   │   Source     │        │   Handler    │
//!  │ (trace emit) │   │ (log emit)   │        │ (log writer) │
//!  └──────┬───────┘   └──────┬───────┘        └──────┬───────┘
//!         │ register_source  │                       │ register_handler /
//!         ▼                  ▼                       ▼ subscribe via link
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Coordinator (registry + protocols)                               │
//! │  - sources:  map<Ident, SourceManager>   (wired handler sets)     │
//! │  - handlers: map<Ident, HandlerManager>  (subscribed + pending)   │
//! │  - per-source wiring locks (order-independent, exactly-once)      │
//! │  - Bus (broadcast lifecycle events)                               │
//! └──────────────┬───────────────────────────────────┬────────────────┘
//!                │ open_buffer(handler)              │ events
//!                ▼                                   ▼
//!         BufferManager ──install_buffer──►  ObserverSet ─► observers
//! ```
//!
//! ### Ordering
//! ```text
//! subscribe first:                      register first:
//!   subscribe(h, [s])  → PENDING         register_source(s)
//!   register_source(s) → WIRED           subscribe(h, [s]) → WIRED
//!
//! Either order produces the identical wired state; the per-source wiring
//! lock makes "source just appeared" vs "handler just subscribed" race-free.
//! ```
//!
//! ## Features
//! | Area              | Description                                                          | Key types / traits                       |
//! |-------------------|----------------------------------------------------------------------|------------------------------------------|
//! | **Capabilities**  | Implement producers and consumers wired by the coordinator.          | [`Source`], [`Handler`], [`BufferManager`] |
//! | **Coordination**  | Register/deregister and subscribe/unsubscribe, race-free.            | [`Coordinator`], [`CoordinatorLink`]     |
//! | **Inspection**    | Read-only snapshots of the wiring graph.                             | [`SubscriptionSnapshot`]                 |
//! | **Observability** | Hook into registration/wiring events.                                | [`Observe`], [`Event`], [`Bus`]          |
//! | **Errors**        | Typed errors for protocol and capability failures.                   | [`CoordinatorError`], [`CapabilityError`] |
//! | **Configuration** | Centralize coordinator settings.                                     | [`CoordinatorConfig`]                    |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] observer
//!   _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use telewire::{
//!     BufferRef, CapabilityError, Coordinator, CoordinatorConfig, CoordinatorLink,
//!     Handler, Ident, MemoryBuffer, Source,
//! };
//!
//! struct DummySource;
//!
//! #[async_trait]
//! impl Source for DummySource {
//!     fn kind(&self) -> &str { "dummysource" }
//!     fn location(&self) -> &str { "memory" }
//!
//!     async fn open_buffer(&self, _handler: &Ident) -> Result<BufferRef, CapabilityError> {
//!         Ok(MemoryBuffer::bounded(128))
//!     }
//!
//!     async fn close_buffer(&self, _handler: &Ident) -> Result<(), CapabilityError> {
//!         Ok(())
//!     }
//! }
//!
//! struct ConsoleHandler;
//!
//! #[async_trait]
//! impl Handler for ConsoleHandler {
//!     fn kind(&self) -> &str { "console" }
//!     fn location(&self) -> &str { "memory" }
//!
//!     async fn on_attached(&self, _link: CoordinatorLink) {}
//!
//!     async fn install_buffer(
//!         &self,
//!         source: &Ident,
//!         _buffer: BufferRef,
//!     ) -> Result<(), CapabilityError> {
//!         println!("buffer installed for {source}");
//!         Ok(())
//!     }
//!
//!     async fn remove_buffer(&self, _source: &Ident) -> Result<(), CapabilityError> {
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let coordinator = Coordinator::builder(CoordinatorConfig::default()).build();
//!
//!     let handler = Arc::new(ConsoleHandler);
//!     coordinator.register_handler(handler.clone()).await?;
//!
//!     // Subscribe before the source exists: the request parks as pending.
//!     let source_id = Ident::from_raw("dummysource|memory");
//!     coordinator.subscribe(handler.as_ref(), &[source_id.clone()]).await?;
//!
//!     // The source arrives and the pending subscription resolves.
//!     coordinator.register_source(Arc::new(DummySource)).await?;
//!
//!     let snapshot = coordinator
//!         .handler_subscriptions(&Ident::derive("console", "memory"))
//!         .await
//!         .expect("handler is registered");
//!     assert_eq!(snapshot.subscribed, vec![source_id]);
//!     assert!(snapshot.pending.is_empty());
//!
//!     coordinator.shutdown().await;
//!     Ok(())
//! }
//! ```

mod buffers;
mod config;
mod core;
mod error;
mod events;
mod handlers;
mod identity;
mod observers;
mod sources;

// ---- Public re-exports ----

pub use crate::buffers::{BufferManager, BufferRef, MemoryBuffer};
pub use crate::config::CoordinatorConfig;
pub use crate::core::{Coordinator, CoordinatorBuilder, CoordinatorLink};
pub use crate::error::{CapabilityError, CoordinatorError};
pub use crate::events::{Bus, Event, EventKind};
pub use crate::handlers::{Handler, HandlerManager, HandlerRef, SubscriptionSnapshot};
pub use crate::identity::{Ident, IDENT_SEPARATOR};
pub use crate::observers::{Observe, ObserverSet};
pub use crate::sources::{Source, SourceManager, SourceRef};

// Optional: expose a simple built-in logger observer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use crate::observers::LogWriter;

//! # Source capability: a telemetry producer.
//!
//! A source emits telemetry records and hands out one buffer manager per
//! subscribed handler. The coordinator resolves its identity from the
//! declared [`kind`](Source::kind) and [`location`](Source::location)
//! metadata and drives buffer lifecycle through
//! [`open_buffer`](Source::open_buffer) / [`close_buffer`](Source::close_buffer).
//!
//! ## Rules
//! - `open_buffer` is called at most once per currently-wired handler; the
//!   coordinator never requests a second buffer for an already-wired pair.
//! - `close_buffer` may arrive for a handler the source no longer knows;
//!   treat that as a no-op rather than an error.
//! - Both calls should be fast and non-blocking; they run inside the
//!   per-source wiring critical section.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use telewire::{CapabilityError, BufferRef, Ident, MemoryBuffer, Source};
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
//! assert_eq!(Ident::for_source(&DummySource).as_str(), "dummysource|memory");
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::buffers::BufferRef;
use crate::error::CapabilityError;
use crate::identity::Ident;

/// # Telemetry producer capability.
///
/// Identified by its declared kind and location; capable of producing a
/// buffer manager scoped to a requesting handler and of releasing it again.
#[async_trait]
pub trait Source: Send + Sync + 'static {
    /// Returns the telemetry kind this source emits (e.g. `"accesslog"`).
    fn kind(&self) -> &str;

    /// Returns where this source runs (e.g. `"memory"`, `"server/default"`).
    fn location(&self) -> &str;

    /// Creates a buffer manager scoped to the given handler.
    ///
    /// Called by the coordinator during wiring. A failure aborts the wiring;
    /// nothing is installed on the handler side.
    async fn open_buffer(&self, handler: &Ident) -> Result<BufferRef, CapabilityError>;

    /// Releases the buffer manager previously created for the given handler.
    ///
    /// Called during unwiring and wiring rollback. Must tolerate unknown
    /// handlers (idempotent no-op).
    async fn close_buffer(&self, handler: &Ident) -> Result<(), CapabilityError>;
}

/// Shared handle to a source capability.
pub type SourceRef = Arc<dyn Source>;

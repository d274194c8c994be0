//! # Handler capability: a telemetry consumer.
//!
//! A handler consumes telemetry records from the sources it subscribes to.
//! At registration it receives a [`CoordinatorLink`] through
//! [`on_attached`](Handler::on_attached) and drives its own subscriptions
//! through that link; the coordinator delivers one buffer manager per wired
//! source through [`install_buffer`](Handler::install_buffer), tagged with
//! the source ident so incoming records can be routed by origin.
//!
//! ## Rules
//! - `on_attached` is called exactly once, during registration, before any
//!   buffer is installed.
//! - `install_buffer` arrives at most once per wired source; a failure rolls
//!   the wiring back on the source side and the pair stays unwired.
//! - `remove_buffer` may arrive for a source the handler no longer holds a
//!   buffer for; treat that as a no-op rather than an error.

use std::sync::Arc;

use async_trait::async_trait;

use crate::buffers::BufferRef;
use crate::core::CoordinatorLink;
use crate::error::CapabilityError;
use crate::identity::Ident;

/// # Telemetry consumer capability.
///
/// Identified by its declared kind and location; receives a coordinator
/// back-reference at registration and per-source buffer managers as its
/// subscriptions are wired.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Returns the handler kind (e.g. `"logstash"`, `"console"`).
    fn kind(&self) -> &str;

    /// Returns where this handler runs (e.g. `"memory"`).
    fn location(&self) -> &str;

    /// Delivers the coordinator back-reference, exactly once, at
    /// registration time.
    ///
    /// The handler typically stores the link and later calls
    /// [`CoordinatorLink::subscribe`] with the source idents it wants.
    async fn on_attached(&self, link: CoordinatorLink);

    /// Installs the buffer manager wired for the given source.
    ///
    /// A failure here aborts the wiring; the coordinator releases the buffer
    /// on the source side and the pair remains unwired.
    async fn install_buffer(
        &self,
        source: &Ident,
        buffer: BufferRef,
    ) -> Result<(), CapabilityError>;

    /// Releases the buffer manager previously installed for the given
    /// source. Must tolerate unknown sources (idempotent no-op).
    async fn remove_buffer(&self, source: &Ident) -> Result<(), CapabilityError>;
}

/// Shared handle to a handler capability.
pub type HandlerRef = Arc<dyn Handler>;

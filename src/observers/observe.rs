//! # Event observer trait.
//!
//! Provides [`Observe`], an extension point for plugging custom event
//! handling into the coordinator's lifecycle stream.
//!
//! Each observer gets:
//! - **Dedicated worker task** (runs independently)
//! - **Per-observer bounded queue** (capacity via
//!   [`Observe::queue_capacity`])
//! - **Panic isolation** (panics are caught and logged; other observers are
//!   unaffected)
//!
//! ## Rules
//! - A slow observer only affects its own queue.
//! - Queue overflow drops the event **for this observer only**; other
//!   observers are unaffected.
//! - Events are processed sequentially (FIFO) per observer.
//! - Observers do not block the coordinator or each other.

use async_trait::async_trait;

use crate::events::Event;

/// Coordinator event observer.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
/// - Slow processing affects only this observer's queue.
#[async_trait]
pub trait Observe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from a dedicated worker task, not in the publisher context.
    /// Events are delivered in FIFO order per observer.
    async fn on_event(&self, event: &Event);

    /// Returns the observer name used in logs.
    ///
    /// Prefer short, descriptive names (e.g., "metrics", "audit"). The
    /// default uses `type_name::<Self>()`, which can be verbose - override
    /// it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this observer.
    ///
    /// On overflow the new event is dropped for this observer only. The
    /// runtime clamps capacity to a minimum of 1.
    ///
    /// Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}

//! # Opaque buffer-manager handle.
//!
//! The coordinator treats a buffer manager as an opaque resource: it asks a
//! source to open one, hands it to a handler, and later asks both sides to
//! release it. It never reads or writes records through it. Concrete channel
//! types expose their own API behind [`BufferManager::as_any`].

use std::any::Any;
use std::sync::Arc;

/// Opaque delivery channel between one source and one handler.
///
/// Implementations carry whatever queueing, batching, or backpressure
/// behavior the source needs; the coordinator only routes the handle.
pub trait BufferManager: Send + Sync + 'static {
    /// Returns a stable name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose -
    /// override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Downcast seam: handlers that know the concrete channel type reach its
    /// typed API through this.
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a buffer manager.
pub type BufferRef = Arc<dyn BufferManager>;

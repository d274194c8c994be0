//! # MemoryBuffer — embedded in-memory delivery channel.
//!
//! A minimal [`BufferManager`] backed by a bounded mpsc channel. Sources
//! write records with [`MemoryBuffer::offer`]; the owning handler drains them
//! with [`MemoryBuffer::next`]. Use it for tests or demos; production buffer
//! implementations live outside this crate.
//!
//! ## Rules
//! - `offer` never blocks: when the channel is full the record is dropped
//!   and `false` is returned.
//! - Records are opaque shared strings; payload formats are the business of
//!   real source/handler implementations.

use std::any::Any;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use super::buffer::{BufferManager, BufferRef};

/// In-memory bounded delivery channel *(demo/reference only)*.
pub struct MemoryBuffer {
    tx: mpsc::Sender<Arc<str>>,
    rx: Mutex<mpsc::Receiver<Arc<str>>>,
}

impl MemoryBuffer {
    /// Creates a bounded buffer with the given capacity (clamped to 1).
    pub fn bounded(capacity: usize) -> Arc<Self> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Arc::new(Self { tx, rx: Mutex::new(rx) })
    }

    /// Offers one record without blocking.
    ///
    /// Returns `false` when the buffer is full or the handler side is gone;
    /// the record is dropped in that case.
    pub fn offer(&self, record: impl Into<Arc<str>>) -> bool {
        self.tx.try_send(record.into()).is_ok()
    }

    /// Receives the next record, waiting until one arrives.
    ///
    /// Returns `None` once the producing side is gone and the buffer is
    /// drained.
    pub async fn next(&self) -> Option<Arc<str>> {
        self.rx.lock().await.recv().await
    }

    /// Receives the next record if one is already buffered.
    pub async fn try_next(&self) -> Option<Arc<str>> {
        self.rx.lock().await.try_recv().ok()
    }

    /// Borrows the concrete buffer back out of an opaque handle.
    pub fn from_ref(buffer: &BufferRef) -> Option<&MemoryBuffer> {
        buffer.as_any().downcast_ref::<MemoryBuffer>()
    }
}

impl BufferManager for MemoryBuffer {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

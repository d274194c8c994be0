//! Recording test doubles for coordinator tests.
//!
//! `RecordingSource` and `RecordingHandler` implement the capability traits,
//! record every call they receive, and can be told to fail their next
//! buffer operation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use telewire::{
    BufferRef, CapabilityError, CoordinatorLink, Handler, Ident, MemoryBuffer, Source,
};

/// Source double that records buffer lifecycle calls.
pub struct RecordingSource {
    kind: String,
    location: String,
    /// Handler idents passed to `open_buffer`, in call order.
    pub opened: Mutex<Vec<Ident>>,
    /// Handler idents passed to `close_buffer`, in call order.
    pub closed: Mutex<Vec<Ident>>,
    /// When set, the next `open_buffer` fails.
    pub fail_open: AtomicBool,
}

impl RecordingSource {
    pub fn new(kind: &str, location: &str) -> Arc<Self> {
        Arc::new(Self {
            kind: kind.to_owned(),
            location: location.to_owned(),
            opened: Mutex::new(Vec::new()),
            closed: Mutex::new(Vec::new()),
            fail_open: AtomicBool::new(false),
        })
    }

    pub fn ident(&self) -> Ident {
        Ident::derive(&self.kind, &self.location)
    }

    pub fn opened_count(&self) -> usize {
        self.opened.lock().unwrap().len()
    }

    pub fn closed_count(&self) -> usize {
        self.closed.lock().unwrap().len()
    }
}

#[async_trait]
impl Source for RecordingSource {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn location(&self) -> &str {
        &self.location
    }

    async fn open_buffer(&self, handler: &Ident) -> Result<BufferRef, CapabilityError> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(CapabilityError::new("open refused"));
        }
        self.opened.lock().unwrap().push(handler.clone());
        Ok(MemoryBuffer::bounded(8))
    }

    async fn close_buffer(&self, handler: &Ident) -> Result<(), CapabilityError> {
        self.closed.lock().unwrap().push(handler.clone());
        Ok(())
    }
}

/// Handler double that records attachment and buffer installs/removals.
pub struct RecordingHandler {
    kind: String,
    location: String,
    /// Links received through `on_attached`, in call order.
    pub links: Mutex<Vec<CoordinatorLink>>,
    /// `(source, buffer)` pairs received through `install_buffer`.
    pub installed: Mutex<Vec<(Ident, BufferRef)>>,
    /// Source idents passed to `remove_buffer`, in call order.
    pub removed: Mutex<Vec<Ident>>,
    /// Buffers currently held, by source ident.
    pub buffers: Mutex<HashMap<Ident, BufferRef>>,
    /// When set, the next `install_buffer` fails.
    pub fail_install: AtomicBool,
    /// When set, `remove_buffer` fails (the handler still forgets the
    /// buffer).
    pub fail_remove: AtomicBool,
}

impl RecordingHandler {
    pub fn new(kind: &str, location: &str) -> Arc<Self> {
        Arc::new(Self {
            kind: kind.to_owned(),
            location: location.to_owned(),
            links: Mutex::new(Vec::new()),
            installed: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
            buffers: Mutex::new(HashMap::new()),
            fail_install: AtomicBool::new(false),
            fail_remove: AtomicBool::new(false),
        })
    }

    pub fn ident(&self) -> Ident {
        Ident::derive(&self.kind, &self.location)
    }

    pub fn link(&self) -> CoordinatorLink {
        self.links.lock().unwrap().first().expect("handler attached").clone()
    }

    pub fn installed_count(&self) -> usize {
        self.installed.lock().unwrap().len()
    }

    pub fn removed_count(&self) -> usize {
        self.removed.lock().unwrap().len()
    }
}

#[async_trait]
impl Handler for RecordingHandler {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn location(&self) -> &str {
        &self.location
    }

    async fn on_attached(&self, link: CoordinatorLink) {
        self.links.lock().unwrap().push(link);
    }

    async fn install_buffer(
        &self,
        source: &Ident,
        buffer: BufferRef,
    ) -> Result<(), CapabilityError> {
        if self.fail_install.load(Ordering::SeqCst) {
            return Err(CapabilityError::new("install refused"));
        }
        self.installed.lock().unwrap().push((source.clone(), buffer.clone()));
        self.buffers.lock().unwrap().insert(source.clone(), buffer);
        Ok(())
    }

    async fn remove_buffer(&self, source: &Ident) -> Result<(), CapabilityError> {
        self.removed.lock().unwrap().push(source.clone());
        self.buffers.lock().unwrap().remove(source);
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(CapabilityError::new("remove refused"));
        }
        Ok(())
    }
}

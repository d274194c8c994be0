//! Register a source and a handler, wire them, and push a few records
//! through the buffer.
//!
//! Run with: `cargo run --example wiring --features logging`

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use telewire::{
    BufferRef, CapabilityError, Coordinator, CoordinatorConfig, CoordinatorLink, Handler, Ident,
    LogWriter, MemoryBuffer, Source,
};

/// Source that keeps the producing end of every buffer it hands out.
struct TickSource {
    buffers: Mutex<HashMap<Ident, Arc<MemoryBuffer>>>,
}

impl TickSource {
    fn new() -> Arc<Self> {
        Arc::new(Self { buffers: Mutex::new(HashMap::new()) })
    }

    async fn emit(&self, record: &str) {
        for buffer in self.buffers.lock().await.values() {
            buffer.offer(record);
        }
    }
}

#[async_trait]
impl Source for TickSource {
    fn kind(&self) -> &str {
        "tick"
    }

    fn location(&self) -> &str {
        "memory"
    }

    async fn open_buffer(&self, handler: &Ident) -> Result<BufferRef, CapabilityError> {
        let buffer = MemoryBuffer::bounded(64);
        self.buffers.lock().await.insert(handler.clone(), Arc::clone(&buffer));
        Ok(buffer)
    }

    async fn close_buffer(&self, handler: &Ident) -> Result<(), CapabilityError> {
        self.buffers.lock().await.remove(handler);
        Ok(())
    }
}

/// Handler that drains whatever buffers it has been given.
struct ConsoleHandler {
    buffers: Mutex<HashMap<Ident, BufferRef>>,
}

impl ConsoleHandler {
    fn new() -> Arc<Self> {
        Arc::new(Self { buffers: Mutex::new(HashMap::new()) })
    }

    async fn drain(&self) {
        for (source, buffer) in self.buffers.lock().await.iter() {
            if let Some(memory) = MemoryBuffer::from_ref(buffer) {
                while let Some(record) = memory.try_next().await {
                    println!("{source} -> {record}");
                }
            }
        }
    }
}

#[async_trait]
impl Handler for ConsoleHandler {
    fn kind(&self) -> &str {
        "console"
    }

    fn location(&self) -> &str {
        "memory"
    }

    async fn on_attached(&self, _link: CoordinatorLink) {}

    async fn install_buffer(
        &self,
        source: &Ident,
        buffer: BufferRef,
    ) -> Result<(), CapabilityError> {
        self.buffers.lock().await.insert(source.clone(), buffer);
        Ok(())
    }

    async fn remove_buffer(&self, source: &Ident) -> Result<(), CapabilityError> {
        self.buffers.lock().await.remove(source);
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("telewire=debug").init();

    let coordinator = Coordinator::builder(CoordinatorConfig::default())
        .with_observer(Arc::new(LogWriter::new()))
        .build();

    let source = TickSource::new();
    let handler = ConsoleHandler::new();

    coordinator.register_source(source.clone()).await?;
    coordinator.register_handler(handler.clone()).await?;
    coordinator
        .subscribe(handler.as_ref(), &[Ident::derive("tick", "memory")])
        .await?;

    source.emit("tick 1").await;
    source.emit("tick 2").await;
    handler.drain().await;

    coordinator.shutdown().await;
    Ok(())
}

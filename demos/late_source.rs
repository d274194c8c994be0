//! Subscribe before the source exists: the request parks as pending and
//! resolves the moment the source registers.
//!
//! Run with: `cargo run --example late_source --features logging`

use std::sync::Arc;

use async_trait::async_trait;

use telewire::{
    BufferRef, CapabilityError, Coordinator, CoordinatorConfig, CoordinatorLink, Handler, Ident,
    LogWriter, MemoryBuffer, Source,
};

struct DummySource;

#[async_trait]
impl Source for DummySource {
    fn kind(&self) -> &str {
        "dummysource"
    }

    fn location(&self) -> &str {
        "memory"
    }

    async fn open_buffer(&self, _handler: &Ident) -> Result<BufferRef, CapabilityError> {
        Ok(MemoryBuffer::bounded(16))
    }

    async fn close_buffer(&self, _handler: &Ident) -> Result<(), CapabilityError> {
        Ok(())
    }
}

/// Handler that subscribes itself as soon as it is attached.
struct EagerHandler;

#[async_trait]
impl Handler for EagerHandler {
    fn kind(&self) -> &str {
        "eager"
    }

    fn location(&self) -> &str {
        "memory"
    }

    async fn on_attached(&self, link: CoordinatorLink) {
        // The source is not registered yet; this parks as pending.
        let wanted = [Ident::from_raw("dummysource|memory")];
        if let Err(err) = link.subscribe(&wanted).await {
            eprintln!("subscribe failed: {err}");
        }
    }

    async fn install_buffer(
        &self,
        source: &Ident,
        _buffer: BufferRef,
    ) -> Result<(), CapabilityError> {
        println!("wired to {source}");
        Ok(())
    }

    async fn remove_buffer(&self, _source: &Ident) -> Result<(), CapabilityError> {
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let coordinator = Coordinator::builder(CoordinatorConfig::default())
        .with_observer(Arc::new(LogWriter::new()))
        .build();

    coordinator.register_handler(Arc::new(EagerHandler)).await?;

    let snapshot = coordinator
        .handler_subscriptions(&Ident::derive("eager", "memory"))
        .await
        .expect("handler is registered");
    println!("pending before the source arrives: {:?}", snapshot.pending);

    coordinator.register_source(Arc::new(DummySource)).await?;

    let snapshot = coordinator
        .handler_subscriptions(&Ident::derive("eager", "memory"))
        .await
        .expect("handler is registered");
    println!("subscribed after it arrives: {:?}", snapshot.subscribed);

    coordinator.shutdown().await;
    Ok(())
}

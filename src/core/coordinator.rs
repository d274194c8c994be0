//! # Coordinator - the source/handler registry and its protocols.
//!
//! The [`Coordinator`] correlates independently-arriving sources with
//! independently-arriving handlers and owns the only authority to create or
//! destroy a wiring. Registration hooks call `register_*`/`deregister_*`;
//! handlers drive `subscribe`/`unsubscribe` through their
//! [`CoordinatorLink`](super::CoordinatorLink).
//!
//! ## Architecture
//! ```text
//! register_source ──┐                         ┌── register_handler
//! deregister_source ┤                         ├── deregister_handler
//!                   ▼                         ▼
//!        ┌───────────────────────────────────────────────┐
//!        │ Coordinator                                   │
//!        │  - sources:  map<Ident, SourceManager>        │
//!        │  - handlers: map<Ident, HandlerManager>       │
//!        │  - wiring locks: one mutex per source ident   │
//!        └──────────────┬────────────────────────────────┘
//!                       │ wiring sub-protocol
//!                       ▼
//!         source.open_buffer(handler) ──► handler.install_buffer(source, buf)
//! ```
//!
//! ## Rules
//! - Registry map locks are held only for map mutation/lookup, never across
//!   capability calls.
//! - Every decision to wire, defer to pending, or unwire a given source
//!   ident happens under that ident's wiring lock. `register_source` holds
//!   it across manager insertion **and** the pending scan, so a concurrent
//!   `subscribe` either lands before the scan (and is found pending) or
//!   after the insertion (and wires directly) - never missed, never wired
//!   twice.
//! - Deregistration of an unknown source or handler is an idempotent no-op.
//! - Wiring-lock table entries are retained for the coordinator's lifetime;
//!   the table grows with the number of distinct source idents ever seen.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::CoordinatorConfig;
use crate::error::CoordinatorError;
use crate::events::{Bus, Event, EventKind};
use crate::handlers::{Handler, HandlerManager, HandlerRef, PendingOutcome, SubscriptionSnapshot};
use crate::identity::Ident;
use crate::sources::{Source, SourceManager, SourceRef};

use super::builder::CoordinatorBuilder;
use super::link::CoordinatorLink;
use super::wiring::{self, WireOutcome};

/// Registry of sources and handlers plus the subscription protocol between
/// them. Created through [`Coordinator::builder`]; shared as
/// `Arc<Coordinator>`.
pub struct Coordinator {
    /// Coordinator configuration.
    pub cfg: CoordinatorConfig,
    bus: Bus,
    sources: RwLock<HashMap<Ident, Arc<SourceManager>>>,
    handlers: RwLock<HashMap<Ident, Arc<HandlerManager>>>,
    wiring_locks: Mutex<HashMap<Ident, Arc<Mutex<()>>>>,
    listener_token: CancellationToken,
    /// Self-reference handed to handlers inside their [`CoordinatorLink`].
    weak: Weak<Coordinator>,
}

impl Coordinator {
    /// Starts building a coordinator with the given configuration.
    pub fn builder(cfg: CoordinatorConfig) -> CoordinatorBuilder {
        CoordinatorBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: CoordinatorConfig,
        bus: Bus,
        listener_token: CancellationToken,
        weak: Weak<Coordinator>,
    ) -> Self {
        Self {
            cfg,
            bus,
            sources: RwLock::new(HashMap::new()),
            handlers: RwLock::new(HashMap::new()),
            wiring_locks: Mutex::new(HashMap::new()),
            listener_token,
            weak,
        }
    }

    /// Returns the lifecycle event bus.
    ///
    /// Subscribe to observe registration/wiring transitions directly,
    /// independent of any configured observers.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    // ---------------------------
    // Registration protocol
    // ---------------------------

    /// Registers a source and resolves every pending subscription for it.
    ///
    /// Fails with [`CoordinatorError::DuplicateSource`] if the ident is
    /// already registered, or with [`CoordinatorError::Wiring`] if a pending
    /// resolution fails (the source stays registered; the failed pair stays
    /// pending).
    pub async fn register_source(&self, source: SourceRef) -> Result<(), CoordinatorError> {
        let ident = Ident::for_source(source.as_ref());
        let lock = self.wiring_lock(&ident).await;
        let _guard = lock.lock().await;

        let source_mgr = {
            let mut sources = self.sources.write().await;
            if sources.contains_key(&ident) {
                return Err(CoordinatorError::DuplicateSource { ident });
            }
            let mgr = Arc::new(SourceManager::new(ident.clone(), source));
            sources.insert(ident.clone(), Arc::clone(&mgr));
            mgr
        };
        debug!(source = %ident, "source registered");
        self.bus
            .publish(Event::new(EventKind::SourceRegistered).with_source(ident.as_arc()));

        // Pending scan: still under the wiring lock, so no subscribe call
        // for this ident can slip between the insertion and this pass.
        let handlers: Vec<Arc<HandlerManager>> =
            self.handlers.read().await.values().cloned().collect();
        for handler_mgr in handlers {
            if handler_mgr.is_pending(&ident).await {
                wiring::wire(&self.bus, &source_mgr, &handler_mgr).await?;
            }
        }
        Ok(())
    }

    /// Deregisters a source, tearing down all its wirings first.
    ///
    /// Affected handlers drop the entries entirely; they do not move back to
    /// pending. Unknown sources are ignored.
    pub async fn deregister_source(&self, source: &dyn Source) {
        let ident = Ident::for_source(source);
        let lock = self.wiring_lock(&ident).await;
        let _guard = lock.lock().await;

        let Some(source_mgr) = self.sources.write().await.remove(&ident) else {
            debug!(source = %ident, "deregister ignored: source not registered");
            return;
        };

        for handler_id in source_mgr.drain().await {
            let handler_mgr = self.handlers.read().await.get(&handler_id).cloned();
            match handler_mgr {
                Some(handler_mgr) => {
                    wiring::unwire(&self.bus, &source_mgr, &handler_mgr).await;
                }
                // Handler already mid-deregistration; release our side only.
                None => {
                    wiring::release_source_side(&self.bus, &source_mgr, &handler_id).await;
                }
            }
        }

        debug!(source = %ident, "source deregistered");
        self.bus
            .publish(Event::new(EventKind::SourceDeregistered).with_source(ident.as_arc()));
    }

    /// Registers a handler and hands it a [`CoordinatorLink`] via
    /// `on_attached`, exactly once. No subscriptions are created
    /// automatically.
    ///
    /// Fails with [`CoordinatorError::DuplicateHandler`] if the ident is
    /// already registered.
    pub async fn register_handler(&self, handler: HandlerRef) -> Result<(), CoordinatorError> {
        let ident = Ident::for_handler(handler.as_ref());
        {
            let mut handlers = self.handlers.write().await;
            if handlers.contains_key(&ident) {
                return Err(CoordinatorError::DuplicateHandler { ident });
            }
            handlers.insert(
                ident.clone(),
                Arc::new(HandlerManager::new(ident.clone(), Arc::clone(&handler))),
            );
        }

        let link = CoordinatorLink::new(self.weak.clone(), ident.clone());
        handler.on_attached(link).await;

        debug!(handler = %ident, "handler registered");
        self.bus
            .publish(Event::new(EventKind::HandlerRegistered).with_handler(ident.as_arc()));
        Ok(())
    }

    /// Deregisters a handler: discards its pending requests, unwires its
    /// active subscriptions, and removes it from the registry.
    ///
    /// Unknown handlers are ignored.
    pub async fn deregister_handler(&self, handler: &dyn Handler) {
        let ident = Ident::for_handler(handler);
        let Some(handler_mgr) = self.handlers.write().await.remove(&ident) else {
            debug!(handler = %ident, "deregister ignored: handler not registered");
            return;
        };
        self.teardown_handler(handler_mgr).await;
    }

    // ---------------------------
    // Subscription protocol
    // ---------------------------

    /// Subscribes a handler to the given source idents.
    ///
    /// Registered sources are wired immediately; absent sources become
    /// pending and resolve when they register. Re-subscribing an ident that
    /// is already wired or pending is a no-op. Fails with
    /// [`CoordinatorError::NotRegistered`] if the handler is unknown and
    /// with [`CoordinatorError::Wiring`] on the first wiring failure
    /// (remaining idents are not attempted).
    pub async fn subscribe(
        &self,
        handler: &dyn Handler,
        sources: &[Ident],
    ) -> Result<(), CoordinatorError> {
        self.subscribe_ident(&Ident::for_handler(handler), sources).await
    }

    /// Unsubscribes a handler from the given source idents.
    ///
    /// Wired pairs are unwired, pending requests dropped, unknown idents
    /// ignored. Fails with [`CoordinatorError::NotRegistered`] if the
    /// handler is unknown.
    pub async fn unsubscribe(
        &self,
        handler: &dyn Handler,
        sources: &[Ident],
    ) -> Result<(), CoordinatorError> {
        self.unsubscribe_ident(&Ident::for_handler(handler), sources).await
    }

    pub(crate) async fn subscribe_ident(
        &self,
        handler: &Ident,
        sources: &[Ident],
    ) -> Result<(), CoordinatorError> {
        let handler_mgr = self.handler_manager(handler).await.ok_or_else(|| {
            CoordinatorError::NotRegistered { handler: handler.clone() }
        })?;
        for source in sources {
            self.subscribe_one(&handler_mgr, source).await?;
        }
        Ok(())
    }

    pub(crate) async fn unsubscribe_ident(
        &self,
        handler: &Ident,
        sources: &[Ident],
    ) -> Result<(), CoordinatorError> {
        let handler_mgr = self.handler_manager(handler).await.ok_or_else(|| {
            CoordinatorError::NotRegistered { handler: handler.clone() }
        })?;
        for source in sources {
            let lock = self.wiring_lock(source).await;
            let _guard = lock.lock().await;

            if handler_mgr.drop_pending(source).await {
                continue;
            }
            if let Some(source_mgr) = self.sources.read().await.get(source).cloned() {
                wiring::unwire(&self.bus, &source_mgr, &handler_mgr).await;
            }
        }
        Ok(())
    }

    async fn subscribe_one(
        &self,
        handler_mgr: &Arc<HandlerManager>,
        source: &Ident,
    ) -> Result<(), CoordinatorError> {
        let lock = self.wiring_lock(source).await;
        let _guard = lock.lock().await;

        let source_mgr = self.sources.read().await.get(source).cloned();
        match source_mgr {
            Some(source_mgr) => {
                match wiring::wire(&self.bus, &source_mgr, handler_mgr).await? {
                    WireOutcome::Wired | WireOutcome::AlreadyWired => Ok(()),
                    WireOutcome::HandlerClosed => Err(CoordinatorError::NotRegistered {
                        handler: handler_mgr.ident().clone(),
                    }),
                }
            }
            None => match handler_mgr.mark_pending(source).await {
                PendingOutcome::Added => {
                    debug!(source = %source, handler = %handler_mgr.ident(), "subscription pending");
                    self.bus.publish(
                        Event::new(EventKind::SubscriptionPending)
                            .with_source(source.as_arc())
                            .with_handler(handler_mgr.ident().as_arc()),
                    );
                    Ok(())
                }
                PendingOutcome::AlreadyTracked => Ok(()),
                PendingOutcome::Closed => Err(CoordinatorError::NotRegistered {
                    handler: handler_mgr.ident().clone(),
                }),
            },
        }
    }

    // ---------------------------
    // Inspection
    // ---------------------------

    /// Returns the sorted idents of all registered sources.
    pub async fn sources(&self) -> Vec<Ident> {
        let mut idents: Vec<Ident> = self.sources.read().await.keys().cloned().collect();
        idents.sort_unstable();
        idents
    }

    /// Returns the sorted idents of all registered handlers.
    pub async fn handlers(&self) -> Vec<Ident> {
        let mut idents: Vec<Ident> = self.handlers.read().await.keys().cloned().collect();
        idents.sort_unstable();
        idents
    }

    /// Looks up the manager of a registered source.
    pub async fn source_manager(&self, ident: &Ident) -> Option<Arc<SourceManager>> {
        self.sources.read().await.get(ident).cloned()
    }

    /// Looks up the manager of a registered handler.
    pub async fn handler_manager(&self, ident: &Ident) -> Option<Arc<HandlerManager>> {
        self.handlers.read().await.get(ident).cloned()
    }

    /// Returns the handler idents currently wired to a source, sorted.
    pub async fn source_subscriptions(&self, ident: &Ident) -> Option<Vec<Ident>> {
        let mgr = self.source_manager(ident).await?;
        Some(mgr.subscriptions().await)
    }

    /// Returns a handler's active and pending subscriptions, sorted.
    pub async fn handler_subscriptions(&self, ident: &Ident) -> Option<SubscriptionSnapshot> {
        let mgr = self.handler_manager(ident).await?;
        Some(mgr.snapshot().await)
    }

    // ---------------------------
    // Lifecycle
    // ---------------------------

    /// Tears the whole registry down: every handler is deregistered (pending
    /// discarded, wirings released), then every source, then the event
    /// listener stops. The registry is empty afterwards.
    pub async fn shutdown(&self) {
        let handlers: Vec<Arc<HandlerManager>> = {
            let mut map = self.handlers.write().await;
            map.drain().map(|(_, mgr)| mgr).collect()
        };
        for handler_mgr in handlers {
            self.teardown_handler(handler_mgr).await;
        }

        let sources: Vec<Arc<SourceManager>> = {
            let mut map = self.sources.write().await;
            map.drain().map(|(_, mgr)| mgr).collect()
        };
        for source_mgr in sources {
            let lock = self.wiring_lock(source_mgr.ident()).await;
            let _guard = lock.lock().await;
            // Handlers are gone already; any leftover wiring releases the
            // source side only.
            for handler_id in source_mgr.drain().await {
                wiring::release_source_side(&self.bus, &source_mgr, &handler_id).await;
            }
            self.bus.publish(
                Event::new(EventKind::SourceDeregistered)
                    .with_source(source_mgr.ident().as_arc()),
            );
        }

        debug!("coordinator closed");
        self.bus.publish(Event::new(EventKind::CoordinatorClosed));
        self.listener_token.cancel();
    }

    // ---------------------------
    // Helpers
    // ---------------------------

    /// Closes a handler manager already removed from the registry and
    /// unwires everything it still holds.
    async fn teardown_handler(&self, handler_mgr: Arc<HandlerManager>) {
        let ident = handler_mgr.ident().clone();
        for source_id in handler_mgr.close().await {
            let lock = self.wiring_lock(&source_id).await;
            let _guard = lock.lock().await;

            let source_mgr = self.sources.read().await.get(&source_id).cloned();
            match source_mgr {
                Some(source_mgr) => {
                    wiring::unwire(&self.bus, &source_mgr, &handler_mgr).await;
                }
                // Source already mid-deregistration; release our side only.
                None => {
                    wiring::release_handler_side(&self.bus, &handler_mgr, &source_id).await;
                }
            }
        }

        debug!(handler = %ident, "handler deregistered");
        self.bus
            .publish(Event::new(EventKind::HandlerDeregistered).with_handler(ident.as_arc()));
    }

    /// Returns the wiring mutex for a source ident, creating it on first
    /// use. Entries are never removed: racing operations must always
    /// observe the same mutex for the same ident.
    async fn wiring_lock(&self, source: &Ident) -> Arc<Mutex<()>> {
        let mut locks = self.wiring_locks.lock().await;
        Arc::clone(
            locks
                .entry(source.clone())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }
}

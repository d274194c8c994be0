//! # Per-source bookkeeping.
//!
//! A [`SourceManager`] exists from the instant its source registers to the
//! instant it deregisters. It owns the live [`SourceRef`] and the set of
//! handler idents a buffer manager is currently wired for.
//!
//! ## Rules
//! - `subscriptions` contains only handlers with a **live** wiring; pending
//!   subscriptions live on the handler side until the source appears.
//! - All mutation happens inside the coordinator's per-source wiring
//!   critical section; the internal lock only guards snapshot reads against
//!   in-flight mutation.

use std::collections::BTreeSet;

use tokio::sync::Mutex;

use crate::identity::Ident;

use super::source::SourceRef;

/// Bookkeeping for one registered source.
pub struct SourceManager {
    ident: Ident,
    source: SourceRef,
    subscriptions: Mutex<BTreeSet<Ident>>,
}

impl SourceManager {
    /// Creates a manager owning the given source instance.
    pub(crate) fn new(ident: Ident, source: SourceRef) -> Self {
        Self {
            ident,
            source,
            subscriptions: Mutex::new(BTreeSet::new()),
        }
    }

    /// Returns the ident this manager is registered under.
    pub fn ident(&self) -> &Ident {
        &self.ident
    }

    /// Returns the owned source capability.
    pub(crate) fn source(&self) -> &SourceRef {
        &self.source
    }

    /// Returns the sorted list of handler idents currently wired.
    pub async fn subscriptions(&self) -> Vec<Ident> {
        self.subscriptions.lock().await.iter().cloned().collect()
    }

    /// Returns true if a buffer manager is currently wired for the handler.
    pub async fn is_subscribed(&self, handler: &Ident) -> bool {
        self.subscriptions.lock().await.contains(handler)
    }

    /// Records a completed wiring. Returns false if it was already recorded.
    pub(crate) async fn record(&self, handler: Ident) -> bool {
        self.subscriptions.lock().await.insert(handler)
    }

    /// Forgets a wiring. Returns false if none was recorded.
    pub(crate) async fn forget(&self, handler: &Ident) -> bool {
        self.subscriptions.lock().await.remove(handler)
    }

    /// Takes the whole subscriptions set, leaving it empty.
    ///
    /// Used at deregistration to tear every wiring down exactly once.
    pub(crate) async fn drain(&self) -> Vec<Ident> {
        let mut subs = self.subscriptions.lock().await;
        let drained: Vec<Ident> = subs.iter().cloned().collect();
        subs.clear();
        drained
    }
}

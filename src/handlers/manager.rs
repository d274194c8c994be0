//! # Per-handler bookkeeping.
//!
//! A [`HandlerManager`] exists from the instant its handler registers to the
//! instant it deregisters. It owns the live [`HandlerRef`] and two disjoint
//! ident sets: `subscribed` (buffer manager wired and installed) and
//! `pending` (subscription requested, source not yet registered).
//!
//! ## State machine (per source↔handler pair)
//! ```text
//! UNSUBSCRIBED ──subscribe, source absent──► PENDING
//! UNSUBSCRIBED ──subscribe, source present─► WIRED
//! PENDING ──────register_source────────────► WIRED
//! PENDING ──────unsubscribe────────────────► UNSUBSCRIBED
//! WIRED ────────unsubscribe / deregister───► UNSUBSCRIBED
//! ```
//!
//! ## Rules
//! - `subscribed ∩ pending = ∅` always; a requested source ident sits in
//!   exactly one of the two sets until explicitly unsubscribed.
//! - Once `close()` has run, no further wiring can complete against this
//!   manager; an in-flight attempt observes `closed` and rolls back.
//! - The state mutex is held across `install_buffer` so a close cannot
//!   interleave with an install.

use std::collections::BTreeSet;

use tokio::sync::{Mutex, MutexGuard};

use crate::identity::Ident;

use super::handler::HandlerRef;

/// Mutable subscription state of one handler, guarded by one mutex.
pub(crate) struct HandlerState {
    /// Source idents with a live, installed buffer manager.
    pub(crate) subscribed: BTreeSet<Ident>,
    /// Source idents requested before their source registered.
    pub(crate) pending: BTreeSet<Ident>,
    /// Set at deregistration; wiring attempts abort once observed.
    pub(crate) closed: bool,
}

/// Outcome of a pending-subscription request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PendingOutcome {
    /// The ident was added to the pending set.
    Added,
    /// The ident was already pending or already wired; nothing changed.
    AlreadyTracked,
    /// The manager is closed; the request must fail upstream.
    Closed,
}

/// Read-only view of a handler's subscriptions, sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionSnapshot {
    /// Source idents with a live wiring.
    pub subscribed: Vec<Ident>,
    /// Source idents awaiting their source's registration.
    pub pending: Vec<Ident>,
}

/// Bookkeeping for one registered handler.
pub struct HandlerManager {
    ident: Ident,
    handler: HandlerRef,
    state: Mutex<HandlerState>,
}

impl HandlerManager {
    /// Creates a manager owning the given handler instance.
    pub(crate) fn new(ident: Ident, handler: HandlerRef) -> Self {
        Self {
            ident,
            handler,
            state: Mutex::new(HandlerState {
                subscribed: BTreeSet::new(),
                pending: BTreeSet::new(),
                closed: false,
            }),
        }
    }

    /// Returns the ident this manager is registered under.
    pub fn ident(&self) -> &Ident {
        &self.ident
    }

    /// Returns the owned handler capability.
    pub(crate) fn handler(&self) -> &HandlerRef {
        &self.handler
    }

    /// Locks the subscription state for a wiring/unwiring critical section.
    pub(crate) async fn state(&self) -> MutexGuard<'_, HandlerState> {
        self.state.lock().await
    }

    /// Returns a sorted snapshot of both subscription sets.
    pub async fn snapshot(&self) -> SubscriptionSnapshot {
        let state = self.state.lock().await;
        SubscriptionSnapshot {
            subscribed: state.subscribed.iter().cloned().collect(),
            pending: state.pending.iter().cloned().collect(),
        }
    }

    /// Returns true if the source ident is currently wired.
    pub async fn is_subscribed(&self, source: &Ident) -> bool {
        self.state.lock().await.subscribed.contains(source)
    }

    /// Returns true if the source ident is awaiting registration.
    pub async fn is_pending(&self, source: &Ident) -> bool {
        self.state.lock().await.pending.contains(source)
    }

    /// Requests a pending subscription for a source that is not registered.
    pub(crate) async fn mark_pending(&self, source: &Ident) -> PendingOutcome {
        let mut state = self.state.lock().await;
        if state.closed {
            return PendingOutcome::Closed;
        }
        if state.subscribed.contains(source) || state.pending.contains(source) {
            return PendingOutcome::AlreadyTracked;
        }
        state.pending.insert(source.clone());
        PendingOutcome::Added
    }

    /// Drops a pending entry. Returns false if none existed.
    pub(crate) async fn drop_pending(&self, source: &Ident) -> bool {
        self.state.lock().await.pending.remove(source)
    }

    /// Closes the manager: marks it closed, discards pending entries, and
    /// returns the subscribed idents that still need unwiring.
    ///
    /// Idempotent; a second close returns an empty list.
    pub(crate) async fn close(&self) -> Vec<Ident> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Vec::new();
        }
        state.closed = true;
        state.pending.clear();
        state.subscribed.iter().cloned().collect()
    }
}

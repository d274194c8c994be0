//! # Coordinator lifecycle events.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Registration events**: sources and handlers arriving and leaving
//! - **Subscription events**: pending, wired, and unwired pairs
//! - **Failure events**: rolled-back wirings and best-effort release errors
//!
//! The [`Event`] struct carries the affected source/handler idents and an
//! optional reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use telewire::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::SubscriptionWired)
//!     .with_source("trace|memory")
//!     .with_handler("console|memory");
//!
//! assert_eq!(ev.kind, EventKind::SubscriptionWired);
//! assert_eq!(ev.source.as_deref(), Some("trace|memory"));
//! assert_eq!(ev.handler.as_deref(), Some("console|memory"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of coordinator lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Registration events ===
    /// A source registered and its manager was created.
    ///
    /// Sets:
    /// - `source`: source ident
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    SourceRegistered,

    /// A source deregistered; all its wirings were torn down first.
    ///
    /// Sets:
    /// - `source`: source ident
    SourceDeregistered,

    /// A handler registered and received its coordinator link.
    ///
    /// Sets:
    /// - `handler`: handler ident
    HandlerRegistered,

    /// A handler deregistered; its active and pending subscriptions were
    /// drained first.
    ///
    /// Sets:
    /// - `handler`: handler ident
    HandlerDeregistered,

    // === Subscription events ===
    /// A subscription was requested for a source that is not registered yet;
    /// it will resolve when the source appears.
    ///
    /// Sets:
    /// - `source`: requested source ident
    /// - `handler`: requesting handler ident
    SubscriptionPending,

    /// A buffer manager was created, installed, and recorded for a pair.
    ///
    /// Sets:
    /// - `source`: source ident
    /// - `handler`: handler ident
    SubscriptionWired,

    /// A pair's buffer manager was released and the pair unrecorded.
    ///
    /// Sets:
    /// - `source`: source ident
    /// - `handler`: handler ident
    SubscriptionUnwired,

    // === Failure events ===
    /// A wiring step failed and was rolled back; the pair stays
    /// unsubscribed or pending.
    ///
    /// Sets:
    /// - `source`: source ident
    /// - `handler`: handler ident
    /// - `reason`: capability failure message
    WiringFailed,

    /// A capability errored while releasing a buffer during unwiring;
    /// bookkeeping was cleaned up regardless.
    ///
    /// Sets:
    /// - `source`: source ident
    /// - `handler`: handler ident
    /// - `reason`: capability failure message
    ReleaseFailed,

    // === Coordinator lifecycle ===
    /// The coordinator shut down; the registry was drained.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    CoordinatorClosed,
}

/// Coordinator lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Ident of the affected source, if applicable.
    pub source: Option<Arc<str>>,
    /// Ident of the affected handler, if applicable.
    pub handler: Option<Arc<str>>,
    /// Human-readable reason (capability failure messages).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            source: None,
            handler: None,
            reason: None,
        }
    }

    /// Attaches the affected source ident.
    #[inline]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attaches the affected handler ident.
    #[inline]
    pub fn with_handler(mut self, handler: impl Into<Arc<str>>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// True for events that report a failure.
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self.kind, EventKind::WiringFailed | EventKind::ReleaseFailed)
    }
}

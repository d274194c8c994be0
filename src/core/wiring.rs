//! # Wiring / unwiring sub-protocol.
//!
//! Shared by every path that creates or destroys a buffer manager:
//! `subscribe` (source already present), `register_source` (pending
//! resolution), `unsubscribe`, and both deregistration directions.
//!
//! ## Wiring
//! ```text
//! wire(source_mgr, handler_mgr):
//!   1. source.open_buffer(handler)            (no manager lock held)
//!   2. lock handler state
//!        closed or already wired? ──► release buffer, abort
//!        handler.install_buffer(source, buf)  (still under the state lock)
//!        move ident pending ──► subscribed
//!   3. record handler in source subscriptions
//! ```
//! Steps 2 and 3 both complete or the wiring is rolled back: a buffer that
//! could not be installed and recorded is released on the source side and
//! the failure propagates. A half-wired pair cannot be observed.
//!
//! ## Unwiring
//! Best-effort and idempotent: missing entries are no-ops, capability
//! release failures are logged and published as `ReleaseFailed`, and
//! bookkeeping removal always proceeds.
//!
//! ## Rules
//! - Callers hold the per-source wiring lock; nothing here re-checks the
//!   registry maps.
//! - The handler state mutex is held across `install_buffer` so a
//!   concurrent close cannot interleave with an install.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{CapabilityError, CoordinatorError};
use crate::events::{Bus, Event, EventKind};
use crate::handlers::HandlerManager;
use crate::identity::Ident;
use crate::sources::SourceManager;

/// Result of a wiring attempt that did not error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WireOutcome {
    /// A buffer manager was created, installed, and recorded.
    Wired,
    /// The pair was already wired; nothing was created.
    AlreadyWired,
    /// The handler closed before the buffer could be installed; the buffer
    /// was released again.
    HandlerClosed,
}

/// Wires one source↔handler pair.
///
/// Caller holds the per-source wiring lock for `source_mgr`'s ident.
pub(crate) async fn wire(
    bus: &Bus,
    source_mgr: &Arc<SourceManager>,
    handler_mgr: &Arc<HandlerManager>,
) -> Result<WireOutcome, CoordinatorError> {
    let source_id = source_mgr.ident();
    let handler_id = handler_mgr.ident();

    if handler_mgr.is_subscribed(source_id).await {
        return Ok(WireOutcome::AlreadyWired);
    }

    let buffer = match source_mgr.source().open_buffer(handler_id).await {
        Ok(buffer) => buffer,
        Err(cause) => {
            publish_wiring_failed(bus, source_id, handler_id, &cause);
            return Err(CoordinatorError::Wiring {
                source_id: source_id.clone(),
                handler_id: handler_id.clone(),
                cause,
            });
        }
    };

    {
        let mut state = handler_mgr.state().await;
        if state.closed {
            drop(state);
            release_source_side(bus, source_mgr, handler_id).await;
            return Ok(WireOutcome::HandlerClosed);
        }
        if state.subscribed.contains(source_id) {
            drop(state);
            release_source_side(bus, source_mgr, handler_id).await;
            return Ok(WireOutcome::AlreadyWired);
        }

        if let Err(cause) = handler_mgr
            .handler()
            .install_buffer(source_id, buffer)
            .await
        {
            drop(state);
            release_source_side(bus, source_mgr, handler_id).await;
            publish_wiring_failed(bus, source_id, handler_id, &cause);
            return Err(CoordinatorError::Wiring {
                source_id: source_id.clone(),
                handler_id: handler_id.clone(),
                cause,
            });
        }

        state.pending.remove(source_id);
        state.subscribed.insert(source_id.clone());
    }

    source_mgr.record(handler_id.clone()).await;
    debug!(source = %source_id, handler = %handler_id, "pair wired");
    bus.publish(
        Event::new(EventKind::SubscriptionWired)
            .with_source(source_id.as_arc())
            .with_handler(handler_id.as_arc()),
    );
    Ok(WireOutcome::Wired)
}

/// Unwires one source↔handler pair. Returns true if anything was released.
///
/// Caller holds the per-source wiring lock for `source_mgr`'s ident.
pub(crate) async fn unwire(
    bus: &Bus,
    source_mgr: &Arc<SourceManager>,
    handler_mgr: &Arc<HandlerManager>,
) -> bool {
    let source_id = source_mgr.ident();
    let handler_id = handler_mgr.ident();

    let removed = {
        let mut state = handler_mgr.state().await;
        let removed = state.subscribed.remove(source_id);
        if removed {
            if let Err(cause) = handler_mgr.handler().remove_buffer(source_id).await {
                publish_release_failed(bus, source_id, handler_id, &cause);
            }
        }
        removed
    };

    let forgotten = source_mgr.forget(handler_id).await;

    if !removed && !forgotten {
        return false;
    }

    release_source_side(bus, source_mgr, handler_id).await;
    debug!(source = %source_id, handler = %handler_id, "pair unwired");
    bus.publish(
        Event::new(EventKind::SubscriptionUnwired)
            .with_source(source_id.as_arc())
            .with_handler(handler_id.as_arc()),
    );
    true
}

/// Releases the source-side buffer for a handler, best-effort.
pub(crate) async fn release_source_side(
    bus: &Bus,
    source_mgr: &Arc<SourceManager>,
    handler_id: &Ident,
) {
    if let Err(cause) = source_mgr.source().close_buffer(handler_id).await {
        publish_release_failed(bus, source_mgr.ident(), handler_id, &cause);
    }
}

/// Releases the handler-side buffer for a source whose manager is already
/// gone (concurrent deregistration of both ends). Returns true if the
/// handler still tracked the pair.
pub(crate) async fn release_handler_side(
    bus: &Bus,
    handler_mgr: &Arc<HandlerManager>,
    source_id: &Ident,
) -> bool {
    let handler_id = handler_mgr.ident();
    let removed = {
        let mut state = handler_mgr.state().await;
        state.subscribed.remove(source_id)
    };
    if !removed {
        return false;
    }
    if let Err(cause) = handler_mgr.handler().remove_buffer(source_id).await {
        publish_release_failed(bus, source_id, handler_id, &cause);
    }
    bus.publish(
        Event::new(EventKind::SubscriptionUnwired)
            .with_source(source_id.as_arc())
            .with_handler(handler_id.as_arc()),
    );
    true
}

fn publish_wiring_failed(bus: &Bus, source: &Ident, handler: &Ident, cause: &CapabilityError) {
    warn!(source = %source, handler = %handler, %cause, "wiring failed, rolled back");
    bus.publish(
        Event::new(EventKind::WiringFailed)
            .with_source(source.as_arc())
            .with_handler(handler.as_arc())
            .with_reason(cause.message().to_owned()),
    );
}

fn publish_release_failed(bus: &Bus, source: &Ident, handler: &Ident, cause: &CapabilityError) {
    warn!(source = %source, handler = %handler, %cause, "buffer release failed");
    bus.publish(
        Event::new(EventKind::ReleaseFailed)
            .with_source(source.as_arc())
            .with_handler(handler.as_arc())
            .with_reason(cause.message().to_owned()),
    );
}

//! # LogWriter — simple event printer
//!
//! A minimal observer that prints incoming [`Event`]s to stdout.
//! Use it for test or demo.
//!
//! ## Example output
//! ```text
//! [source-registered] source="trace|memory"
//! [handler-registered] handler="console|memory"
//! [subscription-pending] source="gc|memory" handler="console|memory"
//! [subscription-wired] source="trace|memory" handler="console|memory"
//! [wiring-failed] source="gc|memory" handler="console|memory" reason="buffer refused"
//! [subscription-unwired] source="trace|memory" handler="console|memory"
//! [coordinator-closed]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::observers::Observe;

/// Event writer observer.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Observe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::SourceRegistered => {
                println!("[source-registered] source={:?}", e.source);
            }
            EventKind::SourceDeregistered => {
                println!("[source-deregistered] source={:?}", e.source);
            }
            EventKind::HandlerRegistered => {
                println!("[handler-registered] handler={:?}", e.handler);
            }
            EventKind::HandlerDeregistered => {
                println!("[handler-deregistered] handler={:?}", e.handler);
            }
            EventKind::SubscriptionPending => {
                println!(
                    "[subscription-pending] source={:?} handler={:?}",
                    e.source, e.handler
                );
            }
            EventKind::SubscriptionWired => {
                println!(
                    "[subscription-wired] source={:?} handler={:?}",
                    e.source, e.handler
                );
            }
            EventKind::SubscriptionUnwired => {
                println!(
                    "[subscription-unwired] source={:?} handler={:?}",
                    e.source, e.handler
                );
            }
            EventKind::WiringFailed => {
                println!(
                    "[wiring-failed] source={:?} handler={:?} reason={:?}",
                    e.source, e.handler, e.reason
                );
            }
            EventKind::ReleaseFailed => {
                println!(
                    "[release-failed] source={:?} handler={:?} reason={:?}",
                    e.source, e.handler, e.reason
                );
            }
            EventKind::CoordinatorClosed => {
                println!("[coordinator-closed]");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

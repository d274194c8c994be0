//! # Coordinator back-reference for handlers.
//!
//! At registration every handler receives a [`CoordinatorLink`] through
//! [`Handler::on_attached`](crate::Handler::on_attached). The link carries
//! the handler's own ident and a weak reference to the coordinator, so a
//! handler can drive its subscriptions without keeping the coordinator
//! alive (and without creating a reference cycle through the registry).

use std::sync::Weak;

use crate::error::CoordinatorError;
use crate::identity::Ident;

use super::coordinator::Coordinator;

/// Cloneable subscription handle owned by one registered handler.
#[derive(Clone, Debug)]
pub struct CoordinatorLink {
    coordinator: Weak<Coordinator>,
    handler: Ident,
}

impl CoordinatorLink {
    pub(crate) fn new(coordinator: Weak<Coordinator>, handler: Ident) -> Self {
        Self { coordinator, handler }
    }

    /// Returns the ident of the handler this link belongs to.
    pub fn handler(&self) -> &Ident {
        &self.handler
    }

    /// Returns true while the coordinator is still alive.
    pub fn is_attached(&self) -> bool {
        self.coordinator.strong_count() > 0
    }

    /// Subscribes the owning handler to the given source idents.
    ///
    /// Sources that are not registered yet become pending subscriptions and
    /// resolve when they appear. Fails with
    /// [`CoordinatorError::NotRegistered`] if the handler has been
    /// deregistered or the coordinator is gone.
    pub async fn subscribe(&self, sources: &[Ident]) -> Result<(), CoordinatorError> {
        match self.coordinator.upgrade() {
            Some(coordinator) => coordinator.subscribe_ident(&self.handler, sources).await,
            None => Err(CoordinatorError::NotRegistered { handler: self.handler.clone() }),
        }
    }

    /// Unsubscribes the owning handler from the given source idents.
    ///
    /// Wired pairs are unwired, pending requests are dropped, unknown idents
    /// are ignored.
    pub async fn unsubscribe(&self, sources: &[Ident]) -> Result<(), CoordinatorError> {
        match self.coordinator.upgrade() {
            Some(coordinator) => coordinator.unsubscribe_ident(&self.handler, sources).await,
            None => Err(CoordinatorError::NotRegistered { handler: self.handler.clone() }),
        }
    }
}

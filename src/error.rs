//! Error types used by the telewire coordinator and capabilities.
//!
//! This module defines two main error types:
//!
//! - [`CoordinatorError`] — errors raised by the coordination protocol itself.
//! - [`CapabilityError`] — errors raised by a [`Source`](crate::Source) or
//!   [`Handler`](crate::Handler) capability while creating, installing, or
//!   releasing a buffer manager.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for
//! logging/metrics.

use thiserror::Error;

use crate::identity::Ident;

/// # Errors produced by the coordination protocol.
///
/// These indicate either a caller ordering bug (`NotRegistered`), a defensive
/// rejection of an inconsistent lifecycle (`DuplicateSource`,
/// `DuplicateHandler`), or a wiring step that failed and was rolled back
/// (`Wiring`).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CoordinatorError {
    /// `subscribe`/`unsubscribe` was invoked for a handler that has no
    /// registered manager. Hard failure; no state was mutated.
    #[error("handler {handler} is not registered")]
    NotRegistered {
        /// Ident of the unknown handler.
        handler: Ident,
    },

    /// A second `register_source` call arrived for an ident already present.
    #[error("source {ident} is already registered")]
    DuplicateSource {
        /// Ident of the already-registered source.
        ident: Ident,
    },

    /// A second `register_handler` call arrived for an ident already present.
    #[error("handler {ident} is already registered")]
    DuplicateHandler {
        /// Ident of the already-registered handler.
        ident: Ident,
    },

    /// A wiring step failed; anything already acquired was released and the
    /// pair remains unsubscribed or pending, never half-wired.
    #[error("wiring {source_id} -> {handler_id} failed: {cause}")]
    Wiring {
        /// Ident of the source side of the failed pair.
        source_id: Ident,
        /// Ident of the handler side of the failed pair.
        handler_id: Ident,
        /// The underlying capability failure.
        #[source]
        cause: CapabilityError,
    },
}

impl CoordinatorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use telewire::{CoordinatorError, Ident};
    ///
    /// let err = CoordinatorError::NotRegistered { handler: Ident::from_raw("log|memory") };
    /// assert_eq!(err.as_label(), "handler_not_registered");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            CoordinatorError::NotRegistered { .. } => "handler_not_registered",
            CoordinatorError::DuplicateSource { .. } => "duplicate_source",
            CoordinatorError::DuplicateHandler { .. } => "duplicate_handler",
            CoordinatorError::Wiring { .. } => "wiring_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            CoordinatorError::NotRegistered { handler } => {
                format!("handler not registered: {handler}")
            }
            CoordinatorError::DuplicateSource { ident } => {
                format!("duplicate source registration: {ident}")
            }
            CoordinatorError::DuplicateHandler { ident } => {
                format!("duplicate handler registration: {ident}")
            }
            CoordinatorError::Wiring { source_id, handler_id, cause } => {
                format!("wiring {source_id} -> {handler_id} failed: {cause}")
            }
        }
    }
}

/// # Errors produced by Source/Handler capabilities.
///
/// Raised by `open_buffer`, `install_buffer`, `remove_buffer`, and
/// `close_buffer`. During wiring these are rolled back and propagated as
/// [`CoordinatorError::Wiring`]; during unwiring they are logged and never
/// block bookkeeping cleanup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct CapabilityError {
    /// The underlying failure message.
    message: String,
}

impl CapabilityError {
    /// Creates a capability error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    /// Returns the failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

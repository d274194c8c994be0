//! # Identity resolution for sources and handlers.
//!
//! Every source and handler declares two pieces of metadata: a *kind* (its
//! telemetry type, e.g. `"accesslog"`, `"trace"`) and a *location* (where it
//! runs, e.g. `"memory"`, `"server/default"`). The coordinator never keys on
//! the capability objects themselves; it keys on the [`Ident`] derived from
//! that metadata, rendered as `"<kind>|<location>"`.
//!
//! ## Rules
//! - Two registrations with the same kind and location resolve to the same
//!   [`Ident`]; uniqueness within one process is required.
//! - An [`Ident`] is cheap to clone (`Arc<str>` backed) and is ordered and
//!   hashable, so it can key registry maps and sorted snapshots directly.
//! - Callers that address a source before it exists pass the rendered form
//!   (e.g. `"dummysource|memory"`) via [`Ident::from_raw`].
//!
//! # Example
//! ```
//! use telewire::Ident;
//!
//! let id = Ident::derive("dummysource", "memory");
//! assert_eq!(id.as_str(), "dummysource|memory");
//! assert_eq!(id.kind(), "dummysource");
//! assert_eq!(id.location(), "memory");
//! assert_eq!(id, Ident::from_raw("dummysource|memory"));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::handlers::Handler;
use crate::sources::Source;

/// Separator between the kind and location segments of a rendered ident.
pub const IDENT_SEPARATOR: char = '|';

/// Stable identifier for one source or handler.
///
/// Derived from the capability's declared kind and location; the rendered
/// form is `"<kind>|<location>"`. Cloning is cheap.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ident {
    raw: Arc<str>,
}

impl Ident {
    /// Derives an ident from kind and location metadata.
    ///
    /// The kind must not contain the separator character; the location may
    /// (only the first separator splits the segments).
    pub fn derive(kind: &str, location: &str) -> Self {
        debug_assert!(
            !kind.contains(IDENT_SEPARATOR),
            "ident kind must not contain '{IDENT_SEPARATOR}'"
        );
        let raw: Arc<str> = format!("{kind}{IDENT_SEPARATOR}{location}").into();
        Self { raw }
    }

    /// Wraps an already-rendered ident (`"kind|location"`).
    ///
    /// Used by callers that address a source which may not be registered yet.
    pub fn from_raw(raw: impl Into<Arc<str>>) -> Self {
        Self { raw: raw.into() }
    }

    /// Resolves the ident of a source capability.
    pub fn for_source(source: &dyn Source) -> Self {
        Self::derive(source.kind(), source.location())
    }

    /// Resolves the ident of a handler capability.
    pub fn for_handler(handler: &dyn Handler) -> Self {
        Self::derive(handler.kind(), handler.location())
    }

    /// Returns the rendered form.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns a cheap shared copy of the rendered form, for event fields.
    pub fn as_arc(&self) -> Arc<str> {
        Arc::clone(&self.raw)
    }

    /// Returns the kind segment (everything before the first separator).
    pub fn kind(&self) -> &str {
        match self.raw.split_once(IDENT_SEPARATOR) {
            Some((kind, _)) => kind,
            None => &self.raw,
        }
    }

    /// Returns the location segment (everything after the first separator).
    ///
    /// Empty if the ident carries no separator.
    pub fn location(&self) -> &str {
        match self.raw.split_once(IDENT_SEPARATOR) {
            Some((_, location)) => location,
            None => "",
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ident({})", self.raw)
    }
}

impl From<&Ident> for Ident {
    fn from(ident: &Ident) -> Self {
        ident.clone()
    }
}

//! # Telemetry sources: producer capability and per-source state.
//!
//! This module provides the producer-side types:
//! - [`Source`] - trait for telemetry producers (log, trace, dump emitters)
//! - [`SourceRef`] - shared handle (`Arc<dyn Source>`)
//! - [`SourceManager`] - per-registered-source bookkeeping owned by the
//!   coordinator

mod manager;
mod source;

pub use manager::SourceManager;
pub use source::{Source, SourceRef};

//! Built-in observers shipped with the crate (demo/reference only).

mod log;

pub use log::LogWriter;

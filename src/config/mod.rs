//! Configuration management for aerocount.
//!
//! Layers, lowest precedence first: built-in defaults, the JSON settings
//! file, `AEROCOUNT_*` environment variables, command-line flags. The last
//! two are folded in by [`crate::cli::Cli::apply`].

mod scan;
mod settings;

pub use scan::{ScanConfig, MAX_NAMESPACE_LEN, MAX_SET_LEN};
pub use settings::{AppSettings, Paths};

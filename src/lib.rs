//! # aerocount - Count Records with a Throttled Aerospike Scan
//!
//! aerocount connects to one seed node of an Aerospike cluster, runs a full
//! scan of a namespace/set under a records-per-second ceiling, counts every
//! delivered record and closes the connection again.
//!
//! ## Features
//!
//! - **Exact counting**: records may arrive from many node threads at once;
//!   a lock-free atomic tally never loses an update
//! - **Guaranteed release**: the session is closed on success, on failure and
//!   while unwinding
//! - **Throttle pass-through**: the records-per-second hint reaches the client
//!   untouched (0 = unlimited)
//! - **Layered configuration**: defaults, settings file, environment, flags
//! - **Multiple Output Formats**: Plain text, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use aerocount::client::MemoryCluster;
//! use aerocount::config::ScanConfig;
//! use aerocount::runner::ScanRunner;
//! use aerocount::types::Endpoint;
//!
//! #[tokio::main]
//! async fn main() {
//!     let cluster = MemoryCluster::builder(Endpoint::localhost())
//!         .nodes(4)
//!         .set("test", "demo", 1000)
//!         .build();
//!     let runner = ScanRunner::new(cluster);
//!     let config = ScanConfig::new(Endpoint::localhost(), "test", "demo");
//!
//!     let records = runner.run(&config).await.unwrap();
//!     println!("{} records", records);
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Validated endpoint and throttle newtypes
//! - [`client`] - The database client seam and its backends
//! - [`runner`] - Connect, scan, count, release
//! - [`config`] - Settings file and scan configuration
//! - [`error`] - Error types
//! - [`report`] / [`output`] - Result summary and formatting

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod output;
pub mod report;
pub mod runner;
pub mod types;

// Re-export commonly used types
pub use client::{ClientPolicy, Connector, Record, RecordCallback, ScanPolicy, Session};
pub use config::ScanConfig;
pub use error::{ClientError, CliError, ConfigError, RunError};
pub use report::ScanReport;
pub use runner::{RecordCounter, ScanRunner};
pub use types::{Endpoint, RecordsPerSecond};

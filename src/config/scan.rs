//! The immutable description of one scan run.

use crate::client::ScanPolicy;
use crate::error::{ConfigError, ConfigResult};
use crate::types::{Endpoint, RecordsPerSecond};
use std::time::Duration;

/// Longest namespace name the server accepts.
pub const MAX_NAMESPACE_LEN: usize = 31;
/// Longest set name the server accepts.
pub const MAX_SET_LEN: usize = 63;

/// Where to scan and how fast.
///
/// An empty `set` scans every record in the namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Seed node to connect to.
    pub endpoint: Endpoint,
    /// Namespace to scan.
    pub namespace: String,
    /// Set within the namespace.
    pub set: String,
    /// Throttle hint for the client; zero means unlimited.
    pub records_per_second: RecordsPerSecond,
    /// Scan nodes in parallel.
    pub concurrent_nodes: bool,
    /// Cap on nodes scanned at once (0 = all).
    pub max_concurrent_nodes: usize,
    /// Ask for bin data with each record.
    pub include_bin_data: bool,
    /// Per-socket idle timeout.
    pub socket_timeout: Option<Duration>,
    /// Deadline for the whole scan.
    pub total_timeout: Option<Duration>,
}

impl ScanConfig {
    /// Unthrottled scan of `namespace`/`set` at `endpoint`.
    pub fn new(endpoint: Endpoint, namespace: impl Into<String>, set: impl Into<String>) -> Self {
        Self {
            endpoint,
            namespace: namespace.into(),
            set: set.into(),
            records_per_second: RecordsPerSecond::UNLIMITED,
            concurrent_nodes: true,
            max_concurrent_nodes: 0,
            include_bin_data: false,
            socket_timeout: None,
            total_timeout: None,
        }
    }

    /// Set the records-per-second hint.
    pub fn with_records_per_second(mut self, rate: RecordsPerSecond) -> Self {
        self.records_per_second = rate;
        self
    }

    /// Scan one node at a time.
    pub fn with_sequential_nodes(mut self) -> Self {
        self.concurrent_nodes = false;
        self
    }

    /// Limit how many nodes are scanned at once.
    pub fn with_max_concurrent_nodes(mut self, max: usize) -> Self {
        self.max_concurrent_nodes = max;
        self
    }

    /// Request bin data.
    pub fn with_bin_data(mut self) -> Self {
        self.include_bin_data = true;
        self
    }

    /// Set socket and total timeouts.
    pub fn with_timeouts(mut self, socket: Option<Duration>, total: Option<Duration>) -> Self {
        self.socket_timeout = socket;
        self.total_timeout = total;
        self
    }

    /// Check names against server limits.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.namespace.is_empty() {
            return Err(ConfigError::Invalid("namespace cannot be empty".to_string()));
        }
        if self.namespace.len() > MAX_NAMESPACE_LEN {
            return Err(ConfigError::Invalid(format!(
                "namespace '{}' is longer than {} bytes",
                self.namespace, MAX_NAMESPACE_LEN
            )));
        }
        if self.set.len() > MAX_SET_LEN {
            return Err(ConfigError::Invalid(format!(
                "set '{}' is longer than {} bytes",
                self.set, MAX_SET_LEN
            )));
        }
        Ok(())
    }

    /// Scan options passed through to the client unchanged.
    pub fn scan_policy(&self) -> ScanPolicy {
        ScanPolicy {
            records_per_second: self.records_per_second,
            concurrent_nodes: self.concurrent_nodes,
            max_concurrent_nodes: self.max_concurrent_nodes,
            include_bin_data: self.include_bin_data,
            socket_timeout: self.socket_timeout,
            total_timeout: self.total_timeout,
        }
    }
}

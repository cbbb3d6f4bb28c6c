//! Database client seam.
//!
//! The runner talks to the store only through [`Connector`] and [`Session`],
//! mirroring the external client's `connect`, `scan_all` and `close` calls.
//! Cluster discovery, partition routing and retries stay behind this seam.
//!
//! Two implementations ship with the crate:
//! - [`memory::MemoryCluster`] - an in-process simulated cluster
//! - `aerospike::AerospikeConnector` - the official client (feature `aerospike`)

#[cfg(feature = "aerospike")]
pub mod aerospike;
pub mod memory;
pub mod rate_limiter;

use crate::error::ClientResult;
use crate::types::{Endpoint, RecordsPerSecond};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub use memory::{MemoryCluster, MemorySession};
pub use rate_limiter::Throttle;

/// A record delivered by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// RIPEMD-160 key digest, when the client exposes it.
    pub digest: Option<[u8; 20]>,
    /// Record generation.
    pub generation: u32,
    /// Names of the bins returned (empty when bin data is not requested).
    pub bin_names: Vec<String>,
    /// Node that delivered the record, when known.
    pub node: Option<String>,
}

/// Callback invoked once per delivered record.
///
/// May be called concurrently from several node workers.
pub type RecordCallback = Arc<dyn Fn(Record) + Send + Sync>;

/// User/password pair for clusters with security enabled.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Connection-level options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientPolicy {
    /// Initial connection timeout.
    pub connect_timeout: Duration,
    /// Credentials, if the cluster requires authentication.
    pub credentials: Option<Credentials>,
    /// Fail `connect` when no seed node answers.
    pub fail_if_not_connected: bool,
}

impl Default for ClientPolicy {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            credentials: None,
            fail_if_not_connected: true,
        }
    }
}

/// Scan options handed through to the client unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPolicy {
    /// Delivery ceiling; zero means unlimited.
    pub records_per_second: RecordsPerSecond,
    /// Scan all nodes in parallel rather than one after another.
    pub concurrent_nodes: bool,
    /// Cap on nodes scanned at once when `concurrent_nodes` is set (0 = all).
    pub max_concurrent_nodes: usize,
    /// Return bin data with each record.
    pub include_bin_data: bool,
    /// Per-socket idle timeout.
    pub socket_timeout: Option<Duration>,
    /// Deadline for the whole scan.
    pub total_timeout: Option<Duration>,
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self {
            records_per_second: RecordsPerSecond::UNLIMITED,
            concurrent_nodes: true,
            max_concurrent_nodes: 0,
            include_bin_data: false,
            socket_timeout: None,
            total_timeout: None,
        }
    }
}

impl ScanPolicy {
    /// Number of node workers allowed to deliver at once for `nodes` nodes.
    pub fn parallelism(&self, nodes: usize) -> usize {
        if !self.concurrent_nodes {
            return 1;
        }
        match self.max_concurrent_nodes {
            0 => nodes.max(1),
            cap => cap.min(nodes.max(1)),
        }
    }
}

/// Opens sessions against a cluster endpoint.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Session type produced by this connector.
    type Session: Session;

    /// Short backend name for logs and reports.
    fn name(&self) -> &'static str;

    /// Open a session to the cluster seeded at `endpoint`.
    async fn connect(&self, endpoint: &Endpoint, policy: &ClientPolicy)
        -> ClientResult<Self::Session>;
}

/// An open connection to a cluster.
#[async_trait]
pub trait Session: Send + Sync {
    /// Names of the nodes currently known to the session.
    fn node_names(&self) -> Vec<String>;

    /// Scan every record of `namespace`/`set`, invoking `callback` once per
    /// record. Returns when all node workers have finished.
    async fn scan_all(
        &self,
        policy: &ScanPolicy,
        namespace: &str,
        set: &str,
        callback: RecordCallback,
    ) -> ClientResult<()>;

    /// Release the session.
    fn close(&self);
}

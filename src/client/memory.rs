//! In-process simulated cluster.
//!
//! `MemoryCluster` behaves like a small Aerospike cluster seen through the
//! client seam: records of each namespace/set are spread over N nodes, a scan
//! runs one tokio task per node, the records-per-second hint is honoured with
//! a shared [`Throttle`], and faults can be injected. It also keeps session
//! bookkeeping so callers can check that every session they opened was closed.

use super::{ClientPolicy, Connector, Credentials, Record, RecordCallback, ScanPolicy, Session, Throttle};
use crate::error::{ClientError, ClientResult};
use crate::types::Endpoint;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Records yielded between cooperative yields when no delay is configured.
const YIELD_EVERY: u64 = 64;

#[derive(Debug, Default)]
struct Stats {
    connect_attempts: AtomicUsize,
    sessions_opened: AtomicUsize,
    sessions_closed: AtomicUsize,
    scans_started: AtomicUsize,
}

#[derive(Debug)]
struct ClusterState {
    endpoint: Endpoint,
    nodes: Vec<String>,
    namespaces: HashMap<String, HashMap<String, u64>>,
    refuse_connections: bool,
    credentials: Option<Credentials>,
    fail_after: Option<u64>,
    delivery_delay: Option<Duration>,
    stats: Stats,
    last_scan_policy: Mutex<Option<ScanPolicy>>,
}

impl ClusterState {
    fn record_count(&self, namespace: &str, set: &str) -> ClientResult<u64> {
        let sets = self
            .namespaces
            .get(namespace)
            .ok_or_else(|| ClientError::NamespaceNotFound(namespace.to_string()))?;

        if set.is_empty() {
            Ok(sets.values().sum())
        } else {
            Ok(sets.get(set).copied().unwrap_or(0))
        }
    }

    /// Records owned by node `index` when `total` are spread round-robin.
    fn node_share(&self, index: usize, total: u64) -> u64 {
        let nodes = self.nodes.len() as u64;
        if nodes == 0 {
            return 0;
        }
        let index = index as u64;
        total / nodes + u64::from(index < total % nodes)
    }
}

/// A simulated cluster reachable at one seed endpoint.
///
/// Cloning is cheap and clones share state, so a test can keep a handle for
/// inspection while the runner owns another.
#[derive(Debug, Clone)]
pub struct MemoryCluster {
    state: Arc<ClusterState>,
}

impl MemoryCluster {
    /// Start building a cluster that accepts connections at `endpoint`.
    pub fn builder(endpoint: Endpoint) -> MemoryClusterBuilder {
        MemoryClusterBuilder::new(endpoint)
    }

    /// Seed endpoint.
    pub fn endpoint(&self) -> &Endpoint {
        &self.state.endpoint
    }

    /// Node names.
    pub fn nodes(&self) -> &[String] {
        &self.state.nodes
    }

    /// Number of `connect` calls, successful or not.
    pub fn connect_attempts(&self) -> usize {
        self.state.stats.connect_attempts.load(Ordering::Acquire)
    }

    /// Sessions handed out.
    pub fn sessions_opened(&self) -> usize {
        self.state.stats.sessions_opened.load(Ordering::Acquire)
    }

    /// Sessions released.
    pub fn sessions_closed(&self) -> usize {
        self.state.stats.sessions_closed.load(Ordering::Acquire)
    }

    /// Scans started on any session.
    pub fn scans_started(&self) -> usize {
        self.state.stats.scans_started.load(Ordering::Acquire)
    }

    /// Policy of the most recent scan, as received.
    pub fn last_scan_policy(&self) -> Option<ScanPolicy> {
        self.state
            .last_scan_policy
            .lock()
            .ok()
            .and_then(|slot| slot.clone())
    }
}

#[async_trait]
impl Connector for MemoryCluster {
    type Session = MemorySession;

    fn name(&self) -> &'static str {
        "memory"
    }

    async fn connect(
        &self,
        endpoint: &Endpoint,
        policy: &ClientPolicy,
    ) -> ClientResult<MemorySession> {
        let state = &self.state;
        state.stats.connect_attempts.fetch_add(1, Ordering::AcqRel);

        if state.refuse_connections || *endpoint != state.endpoint {
            return Err(ClientError::ConnectionRefused(endpoint.to_string()));
        }

        if let Some(required) = &state.credentials {
            if policy.credentials.as_ref() != Some(required) {
                let user = policy
                    .credentials
                    .as_ref()
                    .map_or_else(|| "<none>".to_string(), |c| c.user.clone());
                return Err(ClientError::NotAuthenticated(user));
            }
        }

        if state.nodes.is_empty() && policy.fail_if_not_connected {
            return Err(ClientError::ConnectionFailed(format!(
                "no nodes available at {}",
                endpoint
            )));
        }

        state.stats.sessions_opened.fetch_add(1, Ordering::AcqRel);
        debug!(%endpoint, nodes = state.nodes.len(), "memory session opened");

        Ok(MemorySession {
            state: Arc::clone(state),
            closed: AtomicBool::new(false),
        })
    }
}

/// Session on a [`MemoryCluster`].
#[derive(Debug)]
pub struct MemorySession {
    state: Arc<ClusterState>,
    closed: AtomicBool,
}

/// State shared by the node tasks of one scan.
struct Delivery {
    callback: RecordCallback,
    throttle: Option<Throttle>,
    fail_after: Option<u64>,
    delay: Option<Duration>,
    include_bins: bool,
    delivered: AtomicU64,
    aborted: AtomicBool,
}

impl Delivery {
    async fn run_node(&self, node: String, count: u64) -> ClientResult<()> {
        for seq in 0..count {
            if self.aborted.load(Ordering::Acquire) {
                return Ok(());
            }

            if let Some(throttle) = &self.throttle {
                throttle.wait().await;
            }

            let delivered = self.delivered.fetch_add(1, Ordering::AcqRel);
            if let Some(limit) = self.fail_after {
                if delivered >= limit {
                    self.aborted.store(true, Ordering::Release);
                    return Err(ClientError::NodeFailed {
                        node,
                        reason: format!("connection reset after {} records", limit),
                    });
                }
            }

            let record = Record {
                digest: Some(rand::random()),
                generation: 1,
                bin_names: if self.include_bins {
                    vec!["value".to_string()]
                } else {
                    Vec::new()
                },
                node: Some(node.clone()),
            };
            (self.callback)(record);

            match self.delay {
                Some(delay) => tokio::time::sleep(delay).await,
                None if seq % YIELD_EVERY == YIELD_EVERY - 1 => tokio::task::yield_now().await,
                None => {}
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Session for MemorySession {
    fn node_names(&self) -> Vec<String> {
        self.state.nodes.clone()
    }

    async fn scan_all(
        &self,
        policy: &ScanPolicy,
        namespace: &str,
        set: &str,
        callback: RecordCallback,
    ) -> ClientResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ClientError::Other("session is closed".to_string()));
        }

        let state = &self.state;
        state.stats.scans_started.fetch_add(1, Ordering::AcqRel);
        if let Ok(mut slot) = state.last_scan_policy.lock() {
            *slot = Some(policy.clone());
        }

        let total = state.record_count(namespace, set)?;
        let delivery = Arc::new(Delivery {
            callback,
            throttle: Throttle::from_hint(policy.records_per_second),
            fail_after: state.fail_after,
            delay: state.delivery_delay,
            include_bins: policy.include_bin_data,
            delivered: AtomicU64::new(0),
            aborted: AtomicBool::new(false),
        });
        let permits = Arc::new(Semaphore::new(policy.parallelism(state.nodes.len())));

        debug!(
            namespace,
            set,
            total,
            nodes = state.nodes.len(),
            parallelism = policy.parallelism(state.nodes.len()),
            "memory scan started"
        );

        let mut tasks = JoinSet::new();
        for (index, node) in state.nodes.iter().enumerate() {
            let delivery = Arc::clone(&delivery);
            let permits = Arc::clone(&permits);
            let node = node.clone();
            let share = state.node_share(index, total);

            tasks.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| ClientError::Other(e.to_string()))?;
                delivery.run_node(node, share).await
            });
        }

        let drain = async {
            let mut first_error = None;
            while let Some(joined) = tasks.join_next().await {
                let outcome = joined
                    .map_err(|e| ClientError::Other(format!("node task failed: {}", e)))
                    .and_then(|r| r);
                if let Err(err) = outcome {
                    first_error.get_or_insert(err);
                }
            }
            first_error
        };
        let drained = match policy.total_timeout {
            Some(limit) => tokio::time::timeout(limit, drain).await.ok(),
            None => Some(drain.await),
        };

        let Some(first_error) = drained else {
            // No node task may deliver once the scan has returned.
            delivery.aborted.store(true, Ordering::Release);
            tasks.abort_all();
            while tasks.join_next().await.is_some() {}
            warn!(namespace, set, timeout = ?policy.total_timeout, "memory scan timed out");
            return Err(ClientError::Timeout);
        };

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.state.stats.sessions_closed.fetch_add(1, Ordering::AcqRel);
            debug!(endpoint = %self.state.endpoint, "memory session closed");
        }
    }
}

/// Builder for [`MemoryCluster`].
#[derive(Debug)]
pub struct MemoryClusterBuilder {
    endpoint: Endpoint,
    node_count: usize,
    namespaces: HashMap<String, HashMap<String, u64>>,
    refuse_connections: bool,
    credentials: Option<Credentials>,
    fail_after: Option<u64>,
    delivery_delay: Option<Duration>,
}

impl MemoryClusterBuilder {
    fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            node_count: 1,
            namespaces: HashMap::new(),
            refuse_connections: false,
            credentials: None,
            fail_after: None,
            delivery_delay: None,
        }
    }

    /// Number of nodes records are spread across.
    pub fn nodes(mut self, count: usize) -> Self {
        self.node_count = count;
        self
    }

    /// Declare an empty namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespaces.entry(namespace.into()).or_default();
        self
    }

    /// Put `records` records in `namespace`/`set`.
    pub fn set(mut self, namespace: impl Into<String>, set: impl Into<String>, records: u64) -> Self {
        self.namespaces
            .entry(namespace.into())
            .or_default()
            .insert(set.into(), records);
        self
    }

    /// Reject every connection attempt.
    pub fn refuse_connections(mut self) -> Self {
        self.refuse_connections = true;
        self
    }

    /// Require these credentials on connect.
    pub fn require_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Fail the scan once `records` records have been delivered.
    pub fn fail_after(mut self, records: u64) -> Self {
        self.fail_after = Some(records);
        self
    }

    /// Sleep between deliveries on each node.
    pub fn delivery_delay(mut self, delay: Duration) -> Self {
        self.delivery_delay = Some(delay);
        self
    }

    pub fn build(self) -> MemoryCluster {
        let nodes = (0..self.node_count)
            .map(|i| format!("BB9{:013X}", 0x0A00_0000_0000u64 + i as u64))
            .collect();

        MemoryCluster {
            state: Arc::new(ClusterState {
                endpoint: self.endpoint,
                nodes,
                namespaces: self.namespaces,
                refuse_connections: self.refuse_connections,
                credentials: self.credentials,
                fail_after: self.fail_after,
                delivery_delay: self.delivery_delay,
                stats: Stats::default(),
                last_scan_policy: Mutex::new(None),
            }),
        }
    }
}

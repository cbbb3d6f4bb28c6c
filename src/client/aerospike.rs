//! Aerospike backend.
//!
//! Wraps the official blocking client. The client's scan fills a bounded
//! record queue from one thread per node; we drain that queue from one worker
//! thread per node, so the record callback runs concurrently just as the
//! client's own per-node threads would deliver it.
//!
//! The Rust client has no server-side records-per-second knob, so the hint is
//! applied on delivery with a shared [`Throttle`].

use super::{ClientPolicy, Connector, Record, RecordCallback, ScanPolicy, Session, Throttle};
use crate::error::{ClientError, ClientResult};
use crate::types::Endpoint;
use aerospike::{Bins, Client};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::thread;
use tracing::{debug, warn};

/// Connects to a real cluster.
#[derive(Debug, Clone, Copy, Default)]
pub struct AerospikeConnector;

impl AerospikeConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for AerospikeConnector {
    type Session = AerospikeSession;

    fn name(&self) -> &'static str {
        "aerospike"
    }

    async fn connect(
        &self,
        endpoint: &Endpoint,
        policy: &ClientPolicy,
    ) -> ClientResult<AerospikeSession> {
        let mut client_policy = aerospike::ClientPolicy::default();
        client_policy.timeout = Some(policy.connect_timeout);
        client_policy.fail_if_not_connected = policy.fail_if_not_connected;
        if let Some(creds) = &policy.credentials {
            client_policy
                .set_user_password(creds.user.clone(), creds.password.clone())
                .map_err(|e| ClientError::NotAuthenticated(e.to_string()))?;
        }

        let hosts = endpoint.to_string();
        let client = tokio::task::spawn_blocking(move || Client::new(&client_policy, &hosts))
            .await
            .map_err(|e| ClientError::Other(format!("connect task failed: {}", e)))?
            .map_err(|e| classify_connect_error(endpoint, &e.to_string()))?;

        debug!(%endpoint, nodes = client.nodes().len(), "aerospike client connected");

        Ok(AerospikeSession {
            client: Arc::new(client),
        })
    }
}

fn classify_connect_error(endpoint: &Endpoint, message: &str) -> ClientError {
    let lower = message.to_lowercase();
    if lower.contains("refused") {
        ClientError::ConnectionRefused(endpoint.to_string())
    } else if lower.contains("timeout") || lower.contains("timed out") {
        ClientError::Timeout
    } else if lower.contains("authenticat") || lower.contains("password") {
        ClientError::NotAuthenticated(message.to_string())
    } else {
        ClientError::ConnectionFailed(message.to_string())
    }
}

/// Session over a connected [`aerospike::Client`].
pub struct AerospikeSession {
    client: Arc<Client>,
}

#[async_trait]
impl Session for AerospikeSession {
    fn node_names(&self) -> Vec<String> {
        self.client
            .nodes()
            .iter()
            .map(|node| node.name().to_string())
            .collect()
    }

    async fn scan_all(
        &self,
        policy: &ScanPolicy,
        namespace: &str,
        set: &str,
        callback: RecordCallback,
    ) -> ClientResult<()> {
        let mut scan_policy = aerospike::ScanPolicy::default();
        scan_policy.max_concurrent_nodes = if policy.concurrent_nodes {
            policy.max_concurrent_nodes
        } else {
            1
        };
        scan_policy.base_policy.timeout = policy.total_timeout;
        if let Some(socket_timeout) = policy.socket_timeout {
            scan_policy.socket_timeout = socket_timeout.as_millis().min(u32::MAX as u128) as u32;
        }

        let bins = if policy.include_bin_data {
            Bins::All
        } else {
            Bins::None
        };
        let workers = policy.parallelism(self.client.nodes().len());
        let throttle = Throttle::from_hint(policy.records_per_second);
        let client = Arc::clone(&self.client);
        let namespace = namespace.to_string();
        let set = set.to_string();

        tokio::task::spawn_blocking(move || {
            let recordset = client
                .scan(&scan_policy, &namespace, &set, bins)
                .map_err(|e| ClientError::Other(e.to_string()))?;
            let failure: Mutex<Option<ClientError>> = Mutex::new(None);

            debug!(namespace = %namespace, set = %set, workers, "aerospike scan started");

            thread::scope(|scope| {
                for _ in 0..workers {
                    scope.spawn(|| {
                        for item in &*recordset {
                            match item {
                                Ok(record) => {
                                    if let Some(throttle) = &throttle {
                                        throttle.wait_blocking();
                                    }
                                    callback(Record {
                                        digest: record.key.as_ref().map(|key| key.digest),
                                        generation: record.generation,
                                        bin_names: record.bins.keys().cloned().collect(),
                                        node: None,
                                    });
                                }
                                Err(err) => {
                                    if let Ok(mut slot) = failure.lock() {
                                        slot.get_or_insert_with(|| ClientError::Other(err.to_string()));
                                    }
                                    recordset.close();
                                    break;
                                }
                            }
                        }
                    });
                }
            });

            match failure.into_inner() {
                Ok(Some(err)) => Err(err),
                Ok(None) => Ok(()),
                Err(_) => Err(ClientError::Other("scan worker panicked".to_string())),
            }
        })
        .await
        .map_err(|e| ClientError::Other(format!("scan task failed: {}", e)))?
    }

    fn close(&self) {
        if let Err(err) = self.client.close() {
            warn!(error = %err, "failed to close aerospike client");
        } else {
            debug!("aerospike client closed");
        }
    }
}

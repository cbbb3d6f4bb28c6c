//! Scan runner - connect, scan, count, release.
//!
//! The runner owns exactly one session per [`ScanRunner::run`] call. The
//! session lives inside a [`SessionGuard`], whose `Drop` closes it, so it is
//! released on success, on scan failure and while unwinding from a panic.
//! Record delivery is driven by the client's own node workers; the runner
//! only hands it a callback that bumps a shared [`RecordCounter`].

mod counter;

pub use counter::RecordCounter;

use crate::client::{ClientPolicy, Connector, RecordCallback, Session};
use crate::config::ScanConfig;
use crate::error::{RunError, RunResult};
use indicatif::ProgressBar;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Closes the wrapped session when dropped.
pub struct SessionGuard<S: Session> {
    session: S,
}

impl<S: Session> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }
}

impl<S: Session> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: Session> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        self.session.close();
        debug!("session released");
    }
}

/// Runs one counted full scan per call.
pub struct ScanRunner<C: Connector> {
    connector: C,
    client_policy: ClientPolicy,
    progress: Option<ProgressBar>,
}

impl<C: Connector> ScanRunner<C> {
    /// Create a runner over `connector` with the default client policy.
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            client_policy: ClientPolicy::default(),
            progress: None,
        }
    }

    /// Set connection options.
    pub fn with_client_policy(mut self, policy: ClientPolicy) -> Self {
        self.client_policy = policy;
        self
    }

    /// Advance `progress` once per record.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Backend name of the underlying connector.
    pub fn backend(&self) -> &'static str {
        self.connector.name()
    }

    /// Scan `config.namespace`/`config.set` and return the number of records
    /// delivered.
    ///
    /// # Errors
    ///
    /// - [`RunError::Connection`] if no session could be opened. No scan is
    ///   attempted and there is nothing to release.
    /// - [`RunError::Scan`] if delivery fails. The session has already been
    ///   closed when this is returned, and the error carries the count
    ///   reached before the failure.
    pub async fn run(&self, config: &ScanConfig) -> RunResult<u64> {
        let session = self
            .connector
            .connect(&config.endpoint, &self.client_policy)
            .await
            .map_err(|source| RunError::Connection {
                endpoint: config.endpoint.clone(),
                source,
            })?;
        let session = SessionGuard::new(session);

        let policy = config.scan_policy();
        info!(
            backend = self.connector.name(),
            endpoint = %config.endpoint,
            namespace = %config.namespace,
            set = %config.set,
            throttle = %policy.records_per_second,
            nodes = session.node_names().len(),
            "starting scan"
        );

        let counter = Arc::new(RecordCounter::new());
        let callback: RecordCallback = {
            let counter = Arc::clone(&counter);
            let progress = self.progress.clone();
            Arc::new(move |_record| {
                let seen = counter.increment();
                trace!(seen, "record observed");
                if let Some(pb) = &progress {
                    pb.inc(1);
                }
            })
        };

        let start = Instant::now();
        let outcome = session
            .scan_all(&policy, &config.namespace, &config.set, callback)
            .await;
        let total = counter.get();

        // Release before anything is reported to the caller.
        drop(session);

        match outcome {
            Ok(()) => {
                info!(records = total, elapsed = ?start.elapsed(), "scan complete");
                Ok(total)
            }
            Err(source) => {
                warn!(records = total, error = %source, "scan failed");
                Err(RunError::Scan {
                    namespace: config.namespace.clone(),
                    set: config.set.clone(),
                    records_counted: total,
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MemoryCluster, Record, ScanPolicy};
    use crate::error::{ClientError, ClientResult};
    use crate::types::{Endpoint, RecordsPerSecond};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn config(records_per_second: u32) -> ScanConfig {
        ScanConfig::new(Endpoint::localhost(), "test", "demo")
            .with_records_per_second(RecordsPerSecond::new(records_per_second))
    }

    fn cluster(nodes: usize, records: u64) -> MemoryCluster {
        MemoryCluster::builder(Endpoint::localhost())
            .nodes(nodes)
            .set("test", "demo", records)
            .build()
    }

    #[tokio::test]
    async fn test_empty_set_counts_zero() {
        let cluster = cluster(2, 0);
        let runner = ScanRunner::new(cluster.clone());

        assert_eq!(runner.run(&config(0)).await.unwrap(), 0);
        assert_eq!(cluster.sessions_opened(), 1);
        assert_eq!(cluster.sessions_closed(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_thousand_records_four_nodes() {
        let cluster = cluster(4, 1000);
        let runner = ScanRunner::new(cluster.clone());

        assert_eq!(runner.run(&config(0)).await.unwrap(), 1000);
        assert_eq!(cluster.sessions_closed(), 1);
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let cluster = MemoryCluster::builder(Endpoint::localhost())
            .set("test", "demo", 10)
            .refuse_connections()
            .build();
        let runner = ScanRunner::new(cluster.clone());

        let err = runner.run(&config(0)).await.unwrap_err();
        assert!(matches!(
            err,
            RunError::Connection {
                source: ClientError::ConnectionRefused(_),
                ..
            }
        ));
        assert_eq!(cluster.connect_attempts(), 1);
        assert_eq!(cluster.scans_started(), 0);
        assert_eq!(cluster.sessions_opened(), 0);
        assert_eq!(cluster.sessions_closed(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_scan_failure_midway() {
        let cluster = MemoryCluster::builder(Endpoint::localhost())
            .nodes(4)
            .set("test", "demo", 1000)
            .fail_after(500)
            .build();
        let runner = ScanRunner::new(cluster.clone());

        let err = runner.run(&config(0)).await.unwrap_err();
        // The session is already closed by the time the error is visible.
        assert_eq!(cluster.sessions_closed(), 1);
        match err {
            RunError::Scan {
                records_counted,
                ref namespace,
                ref set,
                ..
            } => {
                assert_eq!(records_counted, 500);
                assert_eq!(namespace, "test");
                assert_eq!(set, "demo");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_namespace_releases_session() {
        let cluster = cluster(1, 5);
        let runner = ScanRunner::new(cluster.clone());
        let config = ScanConfig::new(Endpoint::localhost(), "nope", "demo");

        let err = runner.run(&config).await.unwrap_err();
        assert_eq!(err.records_counted(), 0);
        assert_eq!(cluster.sessions_opened(), 1);
        assert_eq!(cluster.sessions_closed(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_total_timeout_is_scan_error() {
        let cluster = cluster(4, 1000);
        let runner = ScanRunner::new(cluster.clone());
        let config = config(20).with_timeouts(None, Some(Duration::from_millis(120)));

        let err = runner.run(&config).await.unwrap_err();
        assert!(matches!(
            err,
            RunError::Scan {
                source: ClientError::Timeout,
                ..
            }
        ));
        assert!(err.records_counted() < 1000);
        assert_eq!(cluster.sessions_opened(), 1);
        assert_eq!(cluster.sessions_closed(), 1);
    }

    #[tokio::test]
    async fn test_unlimited_hint_passed_through() {
        let cluster = cluster(1, 3);
        let runner = ScanRunner::new(cluster.clone());

        runner.run(&config(0)).await.unwrap();
        let policy = cluster.last_scan_policy().unwrap();
        assert_eq!(policy.records_per_second, RecordsPerSecond::UNLIMITED);
        assert!(policy.concurrent_nodes);
    }

    #[tokio::test]
    async fn test_throttle_hint_passed_through() {
        let cluster = cluster(1, 3);
        let runner = ScanRunner::new(cluster.clone());

        assert_eq!(runner.run(&config(5000)).await.unwrap(), 3);
        assert_eq!(
            cluster.last_scan_policy().unwrap().records_per_second,
            RecordsPerSecond::new(5000)
        );
    }

    #[tokio::test]
    async fn test_repeated_runs_each_release() {
        let cluster = cluster(2, 20);
        let runner = ScanRunner::new(cluster.clone());

        for _ in 0..3 {
            assert_eq!(runner.run(&config(0)).await.unwrap(), 20);
        }
        assert_eq!(cluster.sessions_opened(), 3);
        assert_eq!(cluster.sessions_closed(), 3);
    }

    #[tokio::test]
    async fn test_progress_bar_tracks_count() {
        let cluster = cluster(2, 42);
        let progress = ProgressBar::hidden();
        let runner = ScanRunner::new(cluster).with_progress(progress.clone());

        runner.run(&config(0)).await.unwrap();
        assert_eq!(progress.position(), 42);
    }

    /// Session whose scan panics, to check the guard on unwind.
    struct PanickingSession {
        closes: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Session for PanickingSession {
        fn node_names(&self) -> Vec<String> {
            Vec::new()
        }

        async fn scan_all(
            &self,
            _policy: &ScanPolicy,
            _namespace: &str,
            _set: &str,
            callback: RecordCallback,
        ) -> ClientResult<()> {
            callback(Record {
                digest: None,
                generation: 0,
                bin_names: Vec::new(),
                node: None,
            });
            panic!("client bug");
        }

        fn close(&self) {
            self.closes.fetch_add(1, Ordering::AcqRel);
        }
    }

    struct PanickingConnector {
        closes: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Connector for PanickingConnector {
        type Session = PanickingSession;

        fn name(&self) -> &'static str {
            "panicking"
        }

        async fn connect(
            &self,
            _endpoint: &Endpoint,
            _policy: &ClientPolicy,
        ) -> ClientResult<PanickingSession> {
            Ok(PanickingSession {
                closes: Arc::clone(&self.closes),
            })
        }
    }

    #[tokio::test]
    async fn test_session_released_on_panic() {
        let closes = Arc::new(AtomicUsize::new(0));
        let runner = ScanRunner::new(PanickingConnector {
            closes: Arc::clone(&closes),
        });
        let config = config(0);

        let handle = tokio::spawn(async move { runner.run(&config).await });
        assert!(handle.await.unwrap_err().is_panic());
        assert_eq!(closes.load(Ordering::Acquire), 1);
    }
}

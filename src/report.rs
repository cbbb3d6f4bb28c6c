//! Summary of a finished scan run.

use crate::config::ScanConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// What a run counted, where, and how long it took.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Unique identifier for this run.
    pub id: Uuid,
    /// Backend that served the scan.
    pub backend: String,
    /// Seed endpoint, `host:port`.
    pub endpoint: String,
    pub namespace: String,
    pub set: String,
    /// Records delivered.
    pub records: u64,
    /// Throttle hint in effect, 0 for unlimited.
    pub records_per_second: u32,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl ScanReport {
    pub fn new(
        backend: &str,
        config: &ScanConfig,
        records: u64,
        started_at: DateTime<Utc>,
        elapsed: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            backend: backend.to_string(),
            endpoint: config.endpoint.to_string(),
            namespace: config.namespace.clone(),
            set: config.set.clone(),
            records,
            records_per_second: config.records_per_second.as_u32(),
            started_at,
            duration_ms: elapsed.as_millis() as u64,
        }
    }

    /// Short form of the run id (first 8 characters).
    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }

    /// Observed delivery rate.
    pub fn observed_rate(&self) -> f64 {
        if self.duration_ms == 0 {
            return self.records as f64;
        }
        self.records as f64 * 1000.0 / self.duration_ms as f64
    }
}

#[cfg(test)]
pub(crate) fn sample() -> ScanReport {
    use crate::types::{Endpoint, RecordsPerSecond};

    let config = ScanConfig::new(Endpoint::localhost(), "test", "demo")
        .with_records_per_second(RecordsPerSecond::new(250));
    ScanReport::new("memory", &config, 1000, Utc::now(), Duration::from_millis(4000))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_fields() {
        let report = sample();
        assert_eq!(report.endpoint, "127.0.0.1:3000");
        assert_eq!(report.records, 1000);
        assert_eq!(report.records_per_second, 250);
        assert_eq!(report.duration_ms, 4000);
        assert_eq!(report.short_id().len(), 8);
        assert!((report.observed_rate() - 250.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_report_json_shape() {
        let report = sample();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["records"], 1000);
        assert_eq!(value["namespace"], "test");
        assert!(value["started_at"].is_string());
    }
}

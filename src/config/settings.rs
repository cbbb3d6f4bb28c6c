//! Application settings and paths.
//!
//! Settings come from a JSON file in the XDG config directory (or a path
//! given on the command line). Anything absent falls back to the defaults.

use super::ScanConfig;
use crate::client::{ClientPolicy, Credentials};
use crate::error::{ConfigError, ConfigResult};
use crate::types::{Endpoint, RecordsPerSecond, DEFAULT_PORT};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application directory paths following XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/aerocount)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Locate the per-user directories. Nothing is created.
    pub fn discover() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "aerocount", "aerocount")
            .ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Persistent defaults for a scan run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Seed host.
    pub host: String,
    /// Seed port.
    pub port: u16,
    /// Namespace to scan.
    pub namespace: String,
    /// Set to scan (empty for the whole namespace).
    pub set: String,
    /// Throttle hint, 0 for unlimited.
    pub records_per_second: u32,
    /// Connection timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Socket idle timeout in milliseconds, 0 for none.
    pub socket_timeout_ms: u64,
    /// Whole-scan deadline in milliseconds, 0 for none.
    pub total_timeout_ms: u64,
    /// Scan nodes in parallel.
    pub concurrent_nodes: bool,
    /// Cap on parallel nodes, 0 for all.
    pub max_concurrent_nodes: usize,
    /// Fetch bin data with each record.
    pub include_bin_data: bool,
    /// User for clusters with security enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Password for `user`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            namespace: "test".to_string(),
            set: "demo".to_string(),
            records_per_second: 0,
            connect_timeout_ms: 10_000,
            socket_timeout_ms: 0,
            total_timeout_ms: 0,
            concurrent_nodes: true,
            max_concurrent_nodes: 0,
            include_bin_data: false,
            user: None,
            password: None,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location, or defaults if there is none.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::discover()?.settings_file();

        if !file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Build and validate the scan description.
    pub fn scan_config(&self) -> ConfigResult<ScanConfig> {
        let endpoint = Endpoint::new(self.host.clone(), self.port)?;

        let mut config = ScanConfig::new(endpoint, self.namespace.clone(), self.set.clone())
            .with_records_per_second(RecordsPerSecond::new(self.records_per_second))
            .with_max_concurrent_nodes(self.max_concurrent_nodes)
            .with_timeouts(
                millis(self.socket_timeout_ms),
                millis(self.total_timeout_ms),
            );
        if !self.concurrent_nodes {
            config = config.with_sequential_nodes();
        }
        if self.include_bin_data {
            config = config.with_bin_data();
        }

        config.validate()?;
        Ok(config)
    }

    /// Connection options.
    pub fn client_policy(&self) -> ConfigResult<ClientPolicy> {
        let credentials = match (&self.user, &self.password) {
            (Some(user), Some(password)) => Some(Credentials::new(user, password)),
            (Some(user), None) => Some(Credentials::new(user, "")),
            (None, Some(_)) => {
                return Err(ConfigError::Invalid(
                    "password given without a user".to_string(),
                ))
            }
            (None, None) => None,
        };

        Ok(ClientPolicy {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            credentials,
            fail_if_not_connected: true,
        })
    }
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.port, 3000);
        assert_eq!(settings.records_per_second, 0);

        let config = settings.scan_config().unwrap();
        assert_eq!(config.endpoint, Endpoint::localhost());
        assert_eq!(config.namespace, "test");
        assert_eq!(config.set, "demo");
        assert!(config.records_per_second.is_unlimited());
        assert_eq!(config.total_timeout, None);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"host": "db1.internal", "namespace": "bar", "records_per_second": 2000, "total_timeout_ms": 60000}}"#
        )
        .unwrap();

        let settings = AppSettings::load_from(file.path()).unwrap();
        assert_eq!(settings.host, "db1.internal");
        assert_eq!(settings.port, 3000);
        assert_eq!(settings.set, "demo");

        let config = settings.scan_config().unwrap();
        assert_eq!(config.records_per_second, RecordsPerSecond::new(2000));
        assert_eq!(config.total_timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppSettings::load_from(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFailed { .. }));
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = AppSettings::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFormat(_)));
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let settings = AppSettings {
            port: 0,
            ..AppSettings::default()
        };
        assert!(matches!(
            settings.scan_config(),
            Err(ConfigError::Endpoint(_))
        ));
    }

    #[test]
    fn test_client_policy_credentials() {
        let mut settings = AppSettings::default();
        assert!(settings.client_policy().unwrap().credentials.is_none());

        settings.user = Some("admin".to_string());
        settings.password = Some("secret".to_string());
        let policy = settings.client_policy().unwrap();
        assert_eq!(policy.credentials, Some(Credentials::new("admin", "secret")));
        assert_eq!(policy.connect_timeout, Duration::from_secs(10));

        settings.user = None;
        assert!(settings.client_policy().is_err());
    }

    #[test]
    fn test_settings_serialization() {
        let settings = AppSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("password"));
        let parsed: AppSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, settings);
    }
}

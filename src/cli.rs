//! Command-line interface definitions for aerocount.
//!
//! Uses `clap` derive macros for declarative argument parsing. Every scan
//! option is optional here: unset flags leave the settings file value alone.

use crate::config::AppSettings;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Backend used when `--backend` is not given: the real client when it is
/// compiled in, the simulated cluster otherwise.
#[cfg(feature = "aerospike")]
pub const DEFAULT_BACKEND: &str = "aerospike";
#[cfg(not(feature = "aerospike"))]
pub const DEFAULT_BACKEND: &str = "memory";

/// Count the records of an Aerospike namespace/set with a rate-limited full scan.
#[derive(Parser, Debug)]
#[command(name = "aerocount")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Count records in an Aerospike set with a throttled scan", long_about = None)]
pub struct Cli {
    /// Seed node host name or IP address
    #[arg(long, env = "AEROCOUNT_HOST")]
    pub host: Option<String>,

    /// Seed node service port
    #[arg(short = 'p', long, env = "AEROCOUNT_PORT")]
    pub port: Option<u16>,

    /// Namespace to scan
    #[arg(short = 'n', long, env = "AEROCOUNT_NAMESPACE")]
    pub namespace: Option<String>,

    /// Set to scan (empty string scans the whole namespace)
    #[arg(short = 's', long, env = "AEROCOUNT_SET")]
    pub set: Option<String>,

    /// Records per second ceiling (0 = unlimited)
    #[arg(short = 'r', long = "rps", env = "AEROCOUNT_RPS", value_name = "N")]
    pub records_per_second: Option<u32>,

    /// Connection timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub connect_timeout: Option<u64>,

    /// Socket idle timeout in milliseconds (0 = none)
    #[arg(long, value_name = "MS")]
    pub socket_timeout: Option<u64>,

    /// Deadline for the whole scan in milliseconds (0 = none)
    #[arg(long, value_name = "MS")]
    pub total_timeout: Option<u64>,

    /// Scan one node at a time instead of all in parallel
    #[arg(long)]
    pub sequential_nodes: bool,

    /// Maximum nodes scanned in parallel (0 = all)
    #[arg(long, value_name = "N")]
    pub max_concurrent_nodes: Option<usize>,

    /// Fetch bin data with each record
    #[arg(long)]
    pub include_bins: bool,

    /// User for clusters with security enabled
    #[arg(long, env = "AEROCOUNT_USER")]
    pub user: Option<String>,

    /// Password for --user
    #[arg(long, env = "AEROCOUNT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Output format for the result
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,

    /// Show a live record counter while scanning
    #[arg(long)]
    pub progress: bool,

    /// Database backend
    #[arg(long, value_enum, default_value = DEFAULT_BACKEND)]
    pub backend: Backend,

    /// Nodes in the simulated cluster (memory backend)
    #[arg(long, default_value = "4", value_name = "N")]
    pub demo_nodes: usize,

    /// Records in the simulated set (memory backend)
    #[arg(long, default_value = "1000", value_name = "N")]
    pub demo_records: u64,

    /// Path to custom configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Load the settings file named by `--config`, or the default one.
    pub fn load_settings(&self) -> crate::error::ConfigResult<AppSettings> {
        match &self.config {
            Some(path) => AppSettings::load_from(path),
            None => AppSettings::load(),
        }
    }

    /// Fold flags and environment overrides into `settings`.
    pub fn apply(&self, settings: &mut AppSettings) {
        if let Some(host) = &self.host {
            settings.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(namespace) = &self.namespace {
            settings.namespace = namespace.clone();
        }
        if let Some(set) = &self.set {
            settings.set = set.clone();
        }
        if let Some(rps) = self.records_per_second {
            settings.records_per_second = rps;
        }
        if let Some(ms) = self.connect_timeout {
            settings.connect_timeout_ms = ms;
        }
        if let Some(ms) = self.socket_timeout {
            settings.socket_timeout_ms = ms;
        }
        if let Some(ms) = self.total_timeout {
            settings.total_timeout_ms = ms;
        }
        if self.sequential_nodes {
            settings.concurrent_nodes = false;
        }
        if let Some(max) = self.max_concurrent_nodes {
            settings.max_concurrent_nodes = max;
        }
        if self.include_bins {
            settings.include_bin_data = true;
        }
        if let Some(user) = &self.user {
            settings.user = Some(user.clone());
        }
        if let Some(password) = &self.password {
            settings.password = Some(password.clone());
        }
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Where records come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// A real cluster through the Aerospike client (feature `aerospike`)
    Aerospike,
    /// An in-process simulated cluster
    Memory,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("aerocount").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_leave_settings_alone() {
        let cli = parse(&["--backend", "memory"]);
        let mut settings = AppSettings::default();
        cli.apply(&mut settings);
        // Environment may carry AEROCOUNT_* in CI; only check flag-driven fields.
        assert!(settings.concurrent_nodes);
        assert!(!settings.include_bin_data);
        assert_eq!(cli.output, OutputFormat::Plain);
        assert_eq!(cli.backend, Backend::Memory);
    }

    #[test]
    fn test_flags_override_settings() {
        let cli = parse(&[
            "--host",
            "10.0.0.9",
            "-p",
            "3100",
            "-n",
            "bar",
            "-s",
            "users",
            "--rps",
            "500",
            "--total-timeout",
            "30000",
            "--sequential-nodes",
            "--include-bins",
            "-o",
            "json",
        ]);
        let mut settings = AppSettings::default();
        cli.apply(&mut settings);

        assert_eq!(settings.host, "10.0.0.9");
        assert_eq!(settings.port, 3100);
        assert_eq!(settings.namespace, "bar");
        assert_eq!(settings.set, "users");
        assert_eq!(settings.records_per_second, 500);
        assert_eq!(settings.total_timeout_ms, 30_000);
        assert!(!settings.concurrent_nodes);
        assert!(settings.include_bin_data);
        assert_eq!(cli.output, OutputFormat::Json);
    }

    #[test]
    fn test_default_backend_matches_build() {
        let cli = parse(&[]);
        let expected = if cfg!(feature = "aerospike") {
            Backend::Aerospike
        } else {
            Backend::Memory
        };
        assert_eq!(cli.backend, expected);
        // The explicit flag still selects the real client either way.
        assert_eq!(parse(&["--backend", "aerospike"]).backend, Backend::Aerospike);
    }

    #[test]
    fn test_empty_set_allowed() {
        let cli = parse(&["-s", ""]);
        let mut settings = AppSettings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.set, "");
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["aerocount", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_rejects_negative_rps() {
        assert!(Cli::try_parse_from(["aerocount", "--rps", "-5"]).is_err());
    }
}

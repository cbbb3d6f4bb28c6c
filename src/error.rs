//! Error types for aerocount.
//!
//! Uses `thiserror` for ergonomic error definitions.

use crate::types::{Endpoint, EndpointError};
use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by the database client behind the collaborator seam.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Connection refused by {0}")]
    ConnectionRefused(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Operation timed out")]
    Timeout,

    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    #[error("Namespace not found: {0}")]
    NamespaceNotFound(String),

    #[error("Node {node} failed: {reason}")]
    NodeFailed { node: String, reason: String },

    #[error("Cluster changed during scan")]
    ClusterChanged,

    #[error("Client error: {0}")]
    Other(String),
}

/// Result type alias for collaborator operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Terminal failure of one scan run.
#[derive(Error, Debug)]
pub enum RunError {
    /// The endpoint was unreachable or rejected the session. No scan ran.
    #[error("Connection to {endpoint} failed: {source}")]
    Connection {
        endpoint: Endpoint,
        #[source]
        source: ClientError,
    },

    /// Record delivery failed. The session was released before this was returned.
    #[error("Scan of {namespace}.{set} failed after {records_counted} records: {source}")]
    Scan {
        namespace: String,
        set: String,
        records_counted: u64,
        #[source]
        source: ClientError,
    },
}

impl RunError {
    /// Records counted before the failure.
    pub fn records_counted(&self) -> u64 {
        match self {
            Self::Connection { .. } => 0,
            Self::Scan { records_counted, .. } => *records_counted,
        }
    }
}

/// Result type alias for scan runs.
pub type RunResult<T> = Result<T, RunError>;

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine configuration directory")]
    DirectoryNotFound,

    #[error("Failed to read config file {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("Invalid config format: {0}")]
    InvalidFormat(String),

    #[error("Invalid endpoint: {0}")]
    Endpoint(#[from] EndpointError),

    #[error("Invalid scan configuration: {0}")]
    Invalid(String),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level error for the command-line front end.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Run(#[from] RunError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Unsupported(String),
}

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_message_carries_count() {
        let err = RunError::Scan {
            namespace: "test".to_string(),
            set: "demo".to_string(),
            records_counted: 500,
            source: ClientError::NodeFailed {
                node: "BB9".to_string(),
                reason: "socket closed".to_string(),
            },
        };
        assert_eq!(err.records_counted(), 500);
        assert_eq!(
            err.to_string(),
            "Scan of test.demo failed after 500 records: Node BB9 failed: socket closed"
        );
    }

    #[test]
    fn test_connection_error_has_source() {
        use std::error::Error as _;

        let err = RunError::Connection {
            endpoint: Endpoint::localhost(),
            source: ClientError::ConnectionRefused("127.0.0.1:3000".to_string()),
        };
        assert_eq!(err.records_counted(), 0);
        assert!(err.source().is_some());
    }
}

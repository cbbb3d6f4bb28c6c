//! Cluster seed endpoint.
//!
//! An `Endpoint` is a host (name or IP literal) and a non-zero port. It parses
//! from `host:port`, `[v6]:port`, or a bare host with the default service port.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Default Aerospike service port.
pub const DEFAULT_PORT: u16 = 3000;

/// A validated connection target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Create an endpoint, validating host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, EndpointError> {
        let host = host.into();
        let host = host.trim();

        if port == 0 {
            return Err(EndpointError::InvalidPort(port.to_string()));
        }
        if host.parse::<IpAddr>().is_err() && !is_valid_hostname(host) {
            return Err(EndpointError::InvalidHost(host.to_string()));
        }

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    /// The local single-node default, `127.0.0.1:3000`.
    pub fn localhost() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }

    /// Host name or IP literal, without brackets.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Service port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Copy of this endpoint with another port.
    pub fn with_port(&self, port: u16) -> Result<Self, EndpointError> {
        Self::new(self.host.clone(), port)
    }

    fn is_ipv6(&self) -> bool {
        matches!(self.host.parse::<IpAddr>(), Ok(IpAddr::V6(_)))
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::localhost()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ipv6() {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for Endpoint {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EndpointError::Empty);
        }

        // Bracketed IPv6: "[::1]:3000" or "[::1]"
        if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| EndpointError::InvalidFormat(s.to_string()))?;
            let port = match tail {
                "" => DEFAULT_PORT,
                _ => parse_port(
                    tail.strip_prefix(':')
                        .ok_or_else(|| EndpointError::InvalidFormat(s.to_string()))?,
                )?,
            };
            return Self::new(host, port);
        }

        // Bare IPv6 literal carries no port
        if let Ok(ip @ IpAddr::V6(_)) = s.parse::<IpAddr>() {
            return Self::new(ip.to_string(), DEFAULT_PORT);
        }

        match s.rsplit_once(':') {
            Some((host, port)) => Self::new(host, parse_port(port)?),
            None => Self::new(s, DEFAULT_PORT),
        }
    }
}

impl TryFrom<String> for Endpoint {
    type Error = EndpointError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Endpoint> for String {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.to_string()
    }
}

fn parse_port(s: &str) -> Result<u16, EndpointError> {
    match s.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(EndpointError::InvalidPort(s.to_string())),
        Ok(port) => Ok(port),
    }
}

/// Validate a hostname according to RFC 1123.
fn is_valid_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }

    s.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-')
    })
}

/// Error type for endpoint parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    #[error("endpoint is empty")]
    Empty,
    #[error("invalid endpoint format: {0}")]
    InvalidFormat(String),
    #[error("invalid host: {0}")]
    InvalidHost(String),
    #[error("invalid port: {0}")]
    InvalidPort(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_host_and_port() {
        let ep: Endpoint = "db1.example.com:3100".parse().unwrap();
        assert_eq!(ep.host(), "db1.example.com");
        assert_eq!(ep.port(), 3100);
    }

    #[test]
    fn test_parse_defaults_port() {
        let ep: Endpoint = "10.0.0.5".parse().unwrap();
        assert_eq!(ep.port(), DEFAULT_PORT);
        assert_eq!(ep.to_string(), "10.0.0.5:3000");
    }

    #[test]
    fn test_parse_ipv6() {
        let ep: Endpoint = "[::1]:3001".parse().unwrap();
        assert_eq!(ep.host(), "::1");
        assert_eq!(ep.port(), 3001);
        assert_eq!(ep.to_string(), "[::1]:3001");

        let bare: Endpoint = "::1".parse().unwrap();
        assert_eq!(bare.port(), DEFAULT_PORT);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!("".parse::<Endpoint>(), Err(EndpointError::Empty));
        assert!("host:0".parse::<Endpoint>().is_err());
        assert!("host:notaport".parse::<Endpoint>().is_err());
        assert!("bad_host:3000".parse::<Endpoint>().is_err());
        assert!("[::1:3000".parse::<Endpoint>().is_err());
        assert!(Endpoint::new("localhost", 0).is_err());
    }

    #[test]
    fn test_with_port() {
        let ep = Endpoint::localhost().with_port(4000).unwrap();
        assert_eq!(ep.to_string(), "127.0.0.1:4000");
    }

    #[test]
    fn test_serde_as_string() {
        let ep = Endpoint::new("node-a", 3000).unwrap();
        let json = serde_json::to_string(&ep).unwrap();
        assert_eq!(json, "\"node-a:3000\"");
        let back: Endpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ep);
    }
}

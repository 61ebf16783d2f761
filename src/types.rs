//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Closed classification of why a probe failed
///
/// Every failure maps to exactly one kind; faults the classifier does not
/// recognize end up as [`ErrorKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// The probe did not complete within its timeout
    Timeout,
    /// The target name could not be resolved
    HostNotFound,
    /// No route to the target, or every candidate port failed
    NetworkUnreachable,
    /// The platform refused network access to this process
    PermissionDenied,
    /// Anything else
    Other,
}

impl ErrorKind {
    /// All kinds, in declaration order
    pub const ALL: [ErrorKind; 5] = [
        ErrorKind::Timeout,
        ErrorKind::HostNotFound,
        ErrorKind::NetworkUnreachable,
        ErrorKind::PermissionDenied,
        ErrorKind::Other,
    ];

    /// Wire/display name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::HostNotFound => "hostNotFound",
            ErrorKind::NetworkUnreachable => "networkUnreachable",
            ErrorKind::PermissionDenied => "permissionDenied",
            ErrorKind::Other => "other",
        }
    }

    /// Short human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "request timed out",
            ErrorKind::HostNotFound => "host not found",
            ErrorKind::NetworkUnreachable => "network unreachable",
            ErrorKind::PermissionDenied => "permission denied",
            ErrorKind::Other => "unknown error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host to probe: a domain name or a literal IP address
///
/// No validation happens here beyond what the caller does; resolution and
/// connection failures surface later as classified probe failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProbeTarget(String);

impl ProbeTarget {
    pub fn new<S: Into<String>>(host: S) -> Self {
        Self(host.into().trim().to_string())
    }

    pub fn host(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProbeTarget {
    fn from(host: &str) -> Self {
        Self::new(host)
    }
}

impl From<String> for ProbeTarget {
    fn from(host: String) -> Self {
        Self::new(host)
    }
}

/// Which concrete probe strategy is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Direct TCP connect probing
    Native,
    /// HTTP request probing for environments without raw socket access
    HttpOnly,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Native => "native",
            StrategyKind::HttpOnly => "http-only",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy selection requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMode {
    /// Detect socket capability at startup
    #[default]
    Auto,
    /// Force TCP connect probing
    Tcp,
    /// Force HTTP probing
    Http,
}

impl FromStr for ProbeMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(ProbeMode::Auto),
            "tcp" | "native" => Ok(ProbeMode::Tcp),
            "http" | "http-only" => Ok(ProbeMode::Http),
            other => Err(AppError::parse(format!("Invalid probe mode: {} (expected auto, tcp or http)", other))),
        }
    }
}

impl fmt::Display for ProbeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProbeMode::Auto => "auto",
            ProbeMode::Tcp => "tcp",
            ProbeMode::Http => "http",
        };
        f.write_str(name)
    }
}

//! Failure diagnosis model

use crate::types::ErrorKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Environment findings and remediation advice for one failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub timestamp: DateTime<Utc>,
    /// Host whose failure was diagnosed
    pub target: String,
    pub error_kind: ErrorKind,
    pub error_message: String,
    /// A probe to the reference host succeeded
    pub has_network_permission: bool,
    /// A direct connection on the alternate protocol port succeeded
    pub alternate_protocol_supported: bool,
    /// Coarse description of the probing environment, e.g. `native (linux)`
    pub network_type: String,
    /// The target accepted a direct connection on some candidate port
    pub target_reachable: bool,
    /// Ordered from generic to most specific
    pub suggestions: Vec<String>,
}

impl Diagnosis {
    /// Whether the environment checks point at the local side rather than the target
    pub fn is_local_problem(&self) -> bool {
        !self.has_network_permission || !self.alternate_protocol_supported
    }
}

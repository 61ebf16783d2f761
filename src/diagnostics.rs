//! Failure diagnosis: environment checks and remediation suggestions
//!
//! After a failed session the caller can ask why. The diagnostician runs a
//! short series of environment checks against a well-known reference host
//! and the original target, then combines their outcomes with the failure
//! kind into an ordered list of suggestions. Every check is bounded by its
//! own timeout and a failed check is a finding, never an error.

use crate::classifier::Fault;
use crate::defaults;
use crate::logging::Logger;
use crate::models::Diagnosis;
use crate::probe::ProbeStrategy;
use crate::types::{ErrorKind, ProbeTarget};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Parameters of the environment checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticsConfig {
    /// Host expected to be reachable from any working network
    pub reference_host: String,
    /// Deadline for the network permission probe
    pub permission_check_timeout: Duration,
    /// Port used to test direct connections to the reference host
    pub alternate_protocol_port: u16,
    pub alternate_protocol_timeout: Duration,
    /// Ports tried, in order, when checking whether the target answers at all
    pub target_ports: Vec<u16>,
    /// Deadline per target port
    pub port_check_timeout: Duration,
    /// Payload size for the permission probe
    pub packet_size: usize,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            reference_host: defaults::REFERENCE_HOST.to_string(),
            permission_check_timeout: defaults::PERMISSION_CHECK_TIMEOUT,
            alternate_protocol_port: defaults::ALTERNATE_PROTOCOL_PORT,
            alternate_protocol_timeout: defaults::DIRECT_CHECK_TIMEOUT,
            target_ports: defaults::CANDIDATE_PORTS.to_vec(),
            port_check_timeout: defaults::DIRECT_CHECK_TIMEOUT,
            packet_size: defaults::DEFAULT_PACKET_SIZE,
        }
    }
}

impl DiagnosticsConfig {
    pub fn with_reference_host(mut self, host: impl Into<String>) -> Self {
        self.reference_host = host.into();
        self
    }

    pub fn with_alternate_protocol_port(mut self, port: u16) -> Self {
        self.alternate_protocol_port = port;
        self
    }

    pub fn with_target_ports(mut self, ports: Vec<u16>) -> Self {
        self.target_ports = ports;
        self
    }

    pub fn with_packet_size(mut self, packet_size: usize) -> Self {
        self.packet_size = packet_size.min(defaults::MAX_PACKET_SIZE);
        self
    }
}

/// Result of one environment check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum CheckOutcome {
    Passed { latency_ms: u64 },
    Failed { kind: ErrorKind, reason: String },
}

impl CheckOutcome {
    fn passed(latency: Duration) -> Self {
        Self::Passed {
            latency_ms: u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
        }
    }

    fn failed(fault: &Fault) -> Self {
        Self::Failed {
            kind: fault.kind(),
            reason: fault.message().to_string(),
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed { .. })
    }
}

/// Everything the checks found, before it is flattened into a [`Diagnosis`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentChecks {
    pub network_permission: CheckOutcome,
    pub alternate_protocol: CheckOutcome,
    pub network_type: String,
    pub target_reachability: CheckOutcome,
}

/// Runs environment checks and turns a failure into advice
pub struct FailureDiagnostician {
    strategy: Arc<dyn ProbeStrategy>,
    config: DiagnosticsConfig,
    logger: Logger,
}

impl FailureDiagnostician {
    pub fn new(strategy: Arc<dyn ProbeStrategy>, config: DiagnosticsConfig, logger: Logger) -> Self {
        Self {
            strategy,
            config,
            logger,
        }
    }

    pub fn config(&self) -> &DiagnosticsConfig {
        &self.config
    }

    /// Diagnose one failure. Never fails; unknown environment state reads as `false`.
    pub async fn diagnose(&self, error_kind: ErrorKind, error_message: &str, target: &ProbeTarget) -> Diagnosis {
        self.logger
            .info(&format!("Diagnosing {} failure for {}", error_kind, target))
            .field("error_kind", error_kind)
            .field("error_message", error_message)
            .log()
            .await;

        let checks = self.run_environment_checks(target).await;
        crate::log_debug!(self.logger, "Environment checks finished for {}", target);

        let has_network_permission = checks.network_permission.is_passed();
        let alternate_protocol_supported = checks.alternate_protocol.is_passed();
        let target_reachable = checks.target_reachability.is_passed();

        Diagnosis {
            timestamp: Utc::now(),
            target: target.host().to_string(),
            error_kind,
            error_message: error_message.to_string(),
            has_network_permission,
            alternate_protocol_supported,
            network_type: checks.network_type,
            target_reachable,
            suggestions: build_suggestions(
                error_kind,
                has_network_permission,
                alternate_protocol_supported,
                target_reachable,
            ),
        }
    }

    /// Run the four checks in order
    pub async fn run_environment_checks(&self, target: &ProbeTarget) -> EnvironmentChecks {
        let network_permission = self.check_network_permission().await;
        self.report("network permission", &network_permission).await;

        let alternate_protocol = self.check_alternate_protocol().await;
        self.report("alternate protocol", &alternate_protocol).await;

        let network_type = self.network_type();

        let target_reachability = self.check_target_reachability(target).await;
        self.report("target reachability", &target_reachability).await;

        EnvironmentChecks {
            network_permission,
            alternate_protocol,
            network_type,
            target_reachability,
        }
    }

    /// One strategy probe to the reference host
    pub async fn check_network_permission(&self) -> CheckOutcome {
        let reference = ProbeTarget::new(self.config.reference_host.as_str());
        let result = self
            .strategy
            .probe(&reference, self.config.permission_check_timeout, self.config.packet_size)
            .await;

        match (result.latency(), result.error_kind()) {
            (Some(latency), _) => CheckOutcome::passed(latency),
            (None, kind) => CheckOutcome::Failed {
                kind: kind.unwrap_or(ErrorKind::Other),
                reason: result.error_message().unwrap_or_default().to_string(),
            },
        }
    }

    /// Direct connection to the reference host on the alternate protocol port
    pub async fn check_alternate_protocol(&self) -> CheckOutcome {
        match self
            .strategy
            .connect(
                &self.config.reference_host,
                self.config.alternate_protocol_port,
                self.config.alternate_protocol_timeout,
            )
            .await
        {
            Ok(latency) => CheckOutcome::passed(latency),
            Err(fault) => CheckOutcome::failed(&fault),
        }
    }

    /// Coarse tag such as `native (linux)` or `http-only (android)`
    pub fn network_type(&self) -> String {
        format!("{} ({})", self.strategy.kind(), std::env::consts::OS)
    }

    /// Direct connection to the target on each candidate port; first success wins
    pub async fn check_target_reachability(&self, target: &ProbeTarget) -> CheckOutcome {
        let mut reasons = Vec::new();
        let mut last_kind = ErrorKind::Other;

        for &port in &self.config.target_ports {
            match self
                .strategy
                .connect(target.host(), port, self.config.port_check_timeout)
                .await
            {
                Ok(latency) => return CheckOutcome::passed(latency),
                Err(fault) => {
                    last_kind = fault.kind();
                    reasons.push(format!("{}: {}", port, fault));
                }
            }
        }

        CheckOutcome::Failed {
            kind: last_kind,
            reason: if reasons.is_empty() {
                "no ports to check".to_string()
            } else {
                reasons.join("; ")
            },
        }
    }

    async fn report(&self, check: &str, outcome: &CheckOutcome) {
        match outcome {
            CheckOutcome::Passed { latency_ms } => {
                self.logger
                    .debug(&format!("Check passed: {}", check))
                    .field("latency_ms", latency_ms)
                    .log()
                    .await;
            }
            CheckOutcome::Failed { kind, reason } => {
                self.logger
                    .warn(&format!("Check failed: {}", check))
                    .field("kind", kind)
                    .field("reason", reason)
                    .log()
                    .await;
            }
        }
    }
}

/// Ordered suggestions: generic first, then kind-specific, then environment-specific
pub fn build_suggestions(
    error_kind: ErrorKind,
    has_network_permission: bool,
    alternate_protocol_supported: bool,
    target_reachable: bool,
) -> Vec<String> {
    let mut suggestions: Vec<&str> = vec![
        "Check that this device is connected to a network (Wi-Fi, Ethernet or mobile data)",
        "Restart the application and try again",
    ];

    match error_kind {
        ErrorKind::Timeout => suggestions.extend([
            "Increase the timeout; the target may be slow to respond",
            "Check the quality and stability of your network connection",
            "Try again from a different network",
        ]),
        ErrorKind::HostNotFound => suggestions.extend([
            "Check that the host name is spelled correctly",
            "Check your DNS settings or switch to another DNS server",
            "Try the target's IP address instead of its name",
        ]),
        ErrorKind::NetworkUnreachable => suggestions.extend([
            "Check your local network configuration",
            "Restart your router or access point",
            "Contact your network provider if the problem persists",
        ]),
        ErrorKind::PermissionDenied => suggestions.extend([
            "Grant this application network access in your system settings",
            "Check firewall or security software that may block outgoing connections",
        ]),
        ErrorKind::Other => suggestions.extend([
            "Review the error details for more information",
            "Try again later",
        ]),
    }

    if !has_network_permission {
        suggestions.push("Network access appears to be blocked for this application; grant it network permission");
    }
    if !alternate_protocol_supported {
        suggestions.push("Direct connections appear to be restricted on this network; try a different network");
    }
    if !target_reachable {
        suggestions.push("The target server may be down or overloaded");
        suggestions.push("Verify that the service on the target is running and listening");
    }

    suggestions.into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::retry::test_support::{ScriptedStrategy, Step};
    use crate::logging::LogLevel;
    use crate::types::StrategyKind;

    fn diagnostician(strategy: ScriptedStrategy) -> FailureDiagnostician {
        FailureDiagnostician::new(Arc::new(strategy), DiagnosticsConfig::default(), Logger::silent("TEST"))
    }

    #[test]
    fn test_default_config() {
        let config = DiagnosticsConfig::default();
        assert_eq!(config.reference_host, "8.8.8.8");
        assert_eq!(config.permission_check_timeout, Duration::from_secs(3));
        assert_eq!(config.alternate_protocol_port, 53);
        assert_eq!(config.alternate_protocol_timeout, Duration::from_secs(2));
        assert_eq!(config.target_ports, vec![80, 443, 53]);
        assert_eq!(config.port_check_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_suggestion_order() {
        let suggestions = build_suggestions(ErrorKind::HostNotFound, true, true, true);
        assert_eq!(suggestions.len(), 5);
        assert!(suggestions[0].contains("connected to a network"));
        assert!(suggestions[1].contains("Restart the application"));
        assert!(suggestions[2].contains("spelled correctly"));
        assert!(suggestions[3].contains("DNS"));
        assert!(suggestions[4].contains("IP address"));
    }

    #[test]
    fn test_conditional_suggestions_follow_kind_specific_ones() {
        let suggestions = build_suggestions(ErrorKind::Other, false, false, false);
        assert_eq!(suggestions.len(), 8);
        assert!(suggestions[4].contains("network permission"));
        assert!(suggestions[5].contains("different network"));
        assert!(suggestions[6].contains("server may be down"));
        assert!(suggestions[7].contains("service on the target is running"));
    }

    #[test]
    fn test_every_kind_has_at_least_two_suggestions_beyond_generic() {
        for kind in ErrorKind::ALL {
            assert!(build_suggestions(kind, true, true, true).len() >= 4, "{}", kind);
        }
    }

    #[tokio::test]
    async fn test_healthy_environment_target_down() {
        let strategy = ScriptedStrategy::always(Step::Ok(20)).with_open_ports(vec![53]);
        let diagnosis = diagnostician(strategy)
            .diagnose(ErrorKind::Timeout, "connect timeout", &ProbeTarget::new("10.0.0.1"))
            .await;

        assert!(diagnosis.has_network_permission);
        assert!(diagnosis.alternate_protocol_supported);
        // Port 53 is in the target list too
        assert!(diagnosis.target_reachable);
        assert_eq!(diagnosis.error_kind, ErrorKind::Timeout);
        assert_eq!(diagnosis.error_message, "connect timeout");
        assert_eq!(diagnosis.network_type, format!("native ({})", std::env::consts::OS));
    }

    #[tokio::test]
    async fn test_restricted_environment() {
        let strategy = ScriptedStrategy::always(Step::Fail(ErrorKind::PermissionDenied))
            .with_kind(StrategyKind::HttpOnly);
        let diagnosis = diagnostician(strategy)
            .diagnose(ErrorKind::PermissionDenied, "denied", &ProbeTarget::new("example.com"))
            .await;

        assert!(!diagnosis.has_network_permission);
        assert!(!diagnosis.alternate_protocol_supported);
        assert!(!diagnosis.target_reachable);
        assert!(diagnosis.network_type.starts_with("http-only ("));
        assert!(diagnosis.is_local_problem());
        assert_eq!(diagnosis.suggestions.len(), 2 + 2 + 4);
    }

    #[tokio::test]
    async fn test_target_reachability_first_success_wins() {
        let strategy = ScriptedStrategy::always(Step::Ok(1)).with_open_ports(vec![443]);
        let outcome = diagnostician(strategy)
            .check_target_reachability(&ProbeTarget::new("example.com"))
            .await;

        assert_eq!(outcome, CheckOutcome::Passed { latency_ms: 5 });
    }

    #[tokio::test]
    async fn test_failed_checks_are_logged_as_warnings() {
        let (logger, buffer) = Logger::capturing("TEST", LogLevel::Warn);
        let strategy = ScriptedStrategy::always(Step::Fail(ErrorKind::Timeout));
        let diagnostician = FailureDiagnostician::new(Arc::new(strategy), DiagnosticsConfig::default(), logger);

        let checks = diagnostician.run_environment_checks(&ProbeTarget::new("example.com")).await;

        assert!(matches!(
            checks.network_permission,
            CheckOutcome::Failed { kind: ErrorKind::Timeout, .. }
        ));
        assert!(matches!(
            checks.target_reachability,
            CheckOutcome::Failed { kind: ErrorKind::Other, .. }
        ));
        let entries = buffer.lock().unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.level == LogLevel::Warn));
        assert!(entries[0].field("reason").is_some());
    }

    #[test]
    fn test_check_outcome_serialization() {
        let outcome = CheckOutcome::Failed {
            kind: ErrorKind::HostNotFound,
            reason: "lookup failed".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "failed");
        assert_eq!(json["kind"], "hostNotFound");
    }
}

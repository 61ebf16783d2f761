//! Network Probe Doctor
//!
//! A connectivity diagnostic engine: probes a host over TCP or HTTP,
//! classifies failures into a closed set of kinds, retries transient
//! failures, summarises a session statistically and turns a failure into a
//! diagnosis with remediation suggestions.

pub mod app;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod probe;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use classifier::{classify, Fault, FaultCode};
pub use diagnostics::{CheckOutcome, DiagnosticsConfig, EnvironmentChecks, FailureDiagnostician};
pub use engine::NetworkDiagnosticEngine;
pub use error::{AppError, Result};
pub use executor::{NoProgress, PingOrchestrator, ProgressSink, RetryingProbeRunner};
pub use models::{Config, Diagnosis, ProbeConfig, ProbeResult, Statistics};
pub use output::{ColoredFormatter, OutputFormatter, OutputFormatterFactory, PlainFormatter};
pub use probe::{HttpProbeStrategy, ProbeStrategy, TcpProbeStrategy};
pub use stats::StatisticsAnalyzer;
pub use types::{ErrorKind, ProbeMode, ProbeTarget, StrategyKind};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_TARGET: &str = "8.8.8.8";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
    pub const DEFAULT_ATTEMPTS: u32 = 4;
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);
    pub const DEFAULT_PACKET_SIZE: usize = 64;
    /// Largest UDP payload over IPv4; kept as the cap for parity with ICMP ping
    pub const MAX_PACKET_SIZE: usize = 65_507;
    pub const DEFAULT_RETRIES: u32 = 2;
    pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(2);
    /// HTTP, HTTPS, DNS
    pub const CANDIDATE_PORTS: [u16; 3] = [80, 443, 53];

    pub const REFERENCE_HOST: &str = "8.8.8.8";
    pub const PERMISSION_CHECK_TIMEOUT: Duration = Duration::from_secs(3);
    pub const ALTERNATE_PROTOCOL_PORT: u16 = 53;
    pub const DIRECT_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

    pub const DEFAULT_ENABLE_COLOR: bool = true;
}

//! Application configuration data model and validation

use crate::defaults;
use crate::diagnostics::DiagnosticsConfig;
use crate::models::ProbeConfig;
use crate::types::{AppError, ProbeMode, ProbeTarget, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const MAX_ATTEMPTS: u32 = 1000;
pub const MAX_TIMEOUT_SECONDS: u64 = 300;
pub const MAX_INTERVAL_MS: u64 = 60_000;
pub const MAX_RETRIES: u32 = 10;
pub const MAX_RETRY_INTERVAL_MS: u64 = 60_000;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Host to probe
    #[serde(default = "default_target")]
    pub target: String,

    /// Per-probe timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_seconds: u64,

    /// Number of attempts in a session
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Pause between attempts
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Filler bytes per probe
    #[serde(default = "default_packet_size")]
    pub packet_size: usize,

    /// Retries per attempt
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Pause between retries
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    /// Probe strategy selection
    #[serde(default)]
    pub probe_mode: ProbeMode,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,

    /// Emit a JSON document instead of text
    #[serde(default)]
    pub json: bool,

    /// Diagnose the last failure after the session
    #[serde(default)]
    pub diagnose: bool,

    /// Only report whether the network is reachable
    #[serde(default)]
    pub check: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: default_target(),
            timeout_seconds: default_timeout_secs(),
            attempts: default_attempts(),
            interval_ms: default_interval_ms(),
            packet_size: default_packet_size(),
            retries: default_retries(),
            retry_interval_ms: default_retry_interval_ms(),
            probe_mode: ProbeMode::default(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
            json: false,
            diagnose: false,
            check: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn probe_target(&self) -> ProbeTarget {
        ProbeTarget::new(self.target.as_str())
    }

    /// Validate the configuration and return the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.target.trim().is_empty() {
            return Err(AppError::validation("Target host cannot be empty"));
        }

        if self.target.trim().chars().any(char::is_whitespace) {
            return Err(AppError::validation(format!(
                "Target host '{}' must not contain whitespace",
                self.target.trim()
            )));
        }

        if self.attempts == 0 || self.attempts > MAX_ATTEMPTS {
            return Err(AppError::validation(format!(
                "Attempt count must be between 1 and {}, got {}",
                MAX_ATTEMPTS, self.attempts
            )));
        }

        if self.timeout_seconds == 0 || self.timeout_seconds > MAX_TIMEOUT_SECONDS {
            return Err(AppError::validation(format!(
                "Timeout must be between 1 and {} seconds, got {}",
                MAX_TIMEOUT_SECONDS, self.timeout_seconds
            )));
        }

        if self.interval_ms > MAX_INTERVAL_MS {
            return Err(AppError::validation(format!(
                "Interval cannot exceed {}ms, got {}",
                MAX_INTERVAL_MS, self.interval_ms
            )));
        }

        if self.packet_size > defaults::MAX_PACKET_SIZE {
            return Err(AppError::validation(format!(
                "Packet size cannot exceed {} bytes, got {}",
                defaults::MAX_PACKET_SIZE,
                self.packet_size
            )));
        }

        if self.retries > MAX_RETRIES {
            return Err(AppError::validation(format!(
                "Retries cannot exceed {}, got {}",
                MAX_RETRIES, self.retries
            )));
        }

        if self.retry_interval_ms > MAX_RETRY_INTERVAL_MS {
            return Err(AppError::validation(format!(
                "Retry interval cannot exceed {}ms, got {}",
                MAX_RETRY_INTERVAL_MS, self.retry_interval_ms
            )));
        }

        Ok(())
    }

    /// Merge values from `PROBE_*` environment variables and `ENABLE_COLOR`
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(target) = std::env::var("PROBE_TARGET") {
            if !target.trim().is_empty() {
                self.target = target.trim().to_string();
            }
        }

        if let Some(attempts) = env_value("PROBE_ATTEMPTS")? {
            self.attempts = attempts;
        }

        if let Some(timeout) = env_value("PROBE_TIMEOUT_SECONDS")? {
            self.timeout_seconds = timeout;
        }

        if let Some(interval) = env_value("PROBE_INTERVAL_MS")? {
            self.interval_ms = interval;
        }

        if let Some(size) = env_value("PROBE_PACKET_SIZE")? {
            self.packet_size = size;
        }

        if let Some(retries) = env_value("PROBE_RETRIES")? {
            self.retries = retries;
        }

        if let Some(interval) = env_value("PROBE_RETRY_INTERVAL_MS")? {
            self.retry_interval_ms = interval;
        }

        if let Some(mode) = env_value("PROBE_MODE")? {
            self.probe_mode = mode;
        }

        if let Some(enable_color) = env_value("ENABLE_COLOR")? {
            self.enable_color = enable_color;
        }

        Ok(())
    }

    /// Engine-side probe parameters for this configuration
    pub fn probe_config(&self) -> ProbeConfig {
        ProbeConfig::new()
            .with_timeout(self.timeout())
            .with_attempts(self.attempts)
            .with_interval(Duration::from_millis(self.interval_ms))
            .with_packet_size(self.packet_size)
            .with_retries(self.retries)
            .with_retry_interval(Duration::from_millis(self.retry_interval_ms))
    }

    /// Diagnostic check parameters for this configuration
    pub fn diagnostics_config(&self) -> DiagnosticsConfig {
        DiagnosticsConfig::default().with_packet_size(self.packet_size)
    }
}

/// Parse an optional environment variable, naming it in the error
fn env_value<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, raw, e))),
        Err(_) => Ok(None),
    }
}

// Default value functions for serde
fn default_target() -> String {
    defaults::DEFAULT_TARGET.to_string()
}

fn default_timeout_secs() -> u64 {
    defaults::DEFAULT_TIMEOUT.as_secs()
}

fn default_attempts() -> u32 {
    defaults::DEFAULT_ATTEMPTS
}

fn default_interval_ms() -> u64 {
    defaults::DEFAULT_INTERVAL.as_millis() as u64
}

fn default_packet_size() -> usize {
    defaults::DEFAULT_PACKET_SIZE
}

fn default_retries() -> u32 {
    defaults::DEFAULT_RETRIES
}

fn default_retry_interval_ms() -> u64 {
    defaults::DEFAULT_RETRY_INTERVAL.as_millis() as u64
}

fn default_enable_color() -> bool {
    defaults::DEFAULT_ENABLE_COLOR
}

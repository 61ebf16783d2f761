//! Probe configuration and single-probe result models

use crate::classifier::{classify, Fault};
use crate::defaults;
use crate::types::ErrorKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Parameters of a ping session
///
/// Built once through the `with_*` methods and never changed while a session
/// runs. Out-of-range values are corrected on the way in: zero attempts
/// become one and the packet size is capped at [`defaults::MAX_PACKET_SIZE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeConfig {
    #[serde(rename = "timeout_ms", serialize_with = "as_millis")]
    timeout: Duration,
    attempts: u32,
    #[serde(rename = "interval_ms", serialize_with = "as_millis")]
    interval: Duration,
    packet_size: usize,
    retries: u32,
    #[serde(rename = "retry_interval_ms", serialize_with = "as_millis")]
    retry_interval: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: defaults::DEFAULT_TIMEOUT,
            attempts: defaults::DEFAULT_ATTEMPTS,
            interval: defaults::DEFAULT_INTERVAL,
            packet_size: defaults::DEFAULT_PACKET_SIZE,
            retries: defaults::DEFAULT_RETRIES,
            retry_interval: defaults::DEFAULT_RETRY_INTERVAL,
        }
    }
}

impl ProbeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_packet_size(mut self, packet_size: usize) -> Self {
        self.packet_size = packet_size.min(defaults::MAX_PACKET_SIZE);
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }

    /// Per-probe deadline
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Number of logical attempts (each may hide retries)
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Pause between logical attempts
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Filler bytes sent per probe
    pub fn packet_size(&self) -> usize {
        self.packet_size
    }

    /// Extra probes allowed per attempt after a failure
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Pause between retries of one attempt
    pub fn retry_interval(&self) -> Duration {
        self.retry_interval
    }
}

fn as_millis<S: serde::Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

/// Outcome of one logical attempt
///
/// Latency is present exactly when the attempt succeeded; error kind and
/// message are present exactly when it failed. The constructors are the only
/// way to build one, so these hold for every value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    target: String,
    success: bool,
    latency_ms: Option<u64>,
    error_kind: Option<ErrorKind>,
    error_message: Option<String>,
    timestamp: DateTime<Utc>,
}

impl ProbeResult {
    /// Successful probe with the measured round trip
    pub fn success(target: impl Into<String>, latency: Duration) -> Self {
        Self {
            target: target.into(),
            success: true,
            latency_ms: Some(u64::try_from(latency.as_millis()).unwrap_or(u64::MAX)),
            error_kind: None,
            error_message: None,
            timestamp: Utc::now(),
        }
    }

    /// Failed probe with an already classified kind
    pub fn failure(target: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            success: false,
            latency_ms: None,
            error_kind: Some(kind),
            error_message: Some(message.into()),
            timestamp: Utc::now(),
        }
    }

    /// Failed probe classified from a raw fault
    pub fn from_fault(target: impl Into<String>, fault: &Fault) -> Self {
        Self::failure(target, classify(fault), fault.message())
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn latency_millis(&self) -> Option<u64> {
        self.latency_ms
    }

    pub fn latency(&self) -> Option<Duration> {
        self.latency_ms.map(Duration::from_millis)
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error_kind
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// When the attempt completed
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

//! Core formatting trait and the plain text implementation

use crate::{
    error::Result,
    models::{Diagnosis, ProbeConfig, ProbeResult, Statistics},
    types::{ProbeTarget, StrategyKind},
};
use std::fmt::Write as _;

/// Renders session events and summaries as terminal text
pub trait OutputFormatter: Send + Sync {
    /// Banner printed before the first attempt
    fn format_header(&self, target: &ProbeTarget, strategy: StrategyKind, config: &ProbeConfig) -> Result<String>;

    /// One line per completed attempt; `sequence` starts at 1
    fn format_attempt(&self, sequence: u32, result: &ProbeResult) -> Result<String>;

    /// Session summary block
    fn format_statistics(&self, target: &ProbeTarget, stats: &Statistics) -> Result<String>;

    /// Diagnosis block with environment findings and suggestions
    fn format_diagnosis(&self, diagnosis: &Diagnosis) -> Result<String>;

    /// Verdict of a connectivity check
    fn format_connectivity(&self, connected: bool, reference: &str) -> Result<String>;

    fn format_error(&self, error: &str) -> Result<String>;

    fn format_warning(&self, warning: &str) -> Result<String>;

    fn format_success(&self, message: &str) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Include failure messages and the error histogram
    pub verbose_mode: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
        }
    }
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FormattingOptions {
        &self.options
    }
}

/// `12 ms`, or `1.25 s` from one second up
pub(crate) fn format_latency(ms: f64) -> String {
    if ms >= 1000.0 {
        format!("{:.2} s", ms / 1000.0)
    } else if ms.fract() == 0.0 {
        format!("{} ms", ms)
    } else {
        format!("{:.1} ms", ms)
    }
}

/// `timeout=2, other=1`
pub(crate) fn format_histogram(stats: &Statistics) -> String {
    stats
        .error_kind_histogram
        .iter()
        .map(|(kind, count)| format!("{}={}", kind, count))
        .collect::<Vec<_>>()
        .join(", ")
}

impl OutputFormatter for PlainFormatter {
    fn format_header(&self, target: &ProbeTarget, strategy: StrategyKind, config: &ProbeConfig) -> Result<String> {
        Ok(format!(
            "PROBE {} ({} strategy): {} attempts, {} bytes, timeout {}s",
            target,
            strategy,
            config.attempts(),
            config.packet_size(),
            config.timeout().as_secs()
        ))
    }

    fn format_attempt(&self, sequence: u32, result: &ProbeResult) -> Result<String> {
        match result.latency_millis() {
            Some(ms) => Ok(format!("#{} {}: time={}", sequence, result.target(), format_latency(ms as f64))),
            None => {
                let kind = result.error_kind().map(|k| k.as_str()).unwrap_or("other");
                let mut line = format!("#{} {}: failed ({})", sequence, result.target(), kind);
                if self.options.verbose_mode {
                    if let Some(message) = result.error_message() {
                        write!(line, " - {}", message)?;
                    }
                }
                Ok(line)
            }
        }
    }

    fn format_statistics(&self, target: &ProbeTarget, stats: &Statistics) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "--- {} probe statistics ---", target)?;
        write!(
            output,
            "{} attempted, {} succeeded, {:.1}% loss",
            stats.total, stats.success_count, stats.loss_rate_percent
        )?;

        if let (Some(min), Some(avg), Some(max)) = (stats.min_latency_ms, stats.avg_latency_ms, stats.max_latency_ms) {
            write!(output, "\nlatency min/avg/max = {}/{:.1}/{} ms", min, avg, max)?;
        }

        if !stats.error_kind_histogram.is_empty() && (self.options.verbose_mode || stats.success_count == 0) {
            write!(output, "\nfailures: {}", format_histogram(stats))?;
        }

        Ok(output)
    }

    fn format_diagnosis(&self, diagnosis: &Diagnosis) -> Result<String> {
        let mut output = String::new();
        let yes_no = |flag: bool| if flag { "yes" } else { "no" };

        writeln!(output, "Diagnosis for {}:", diagnosis.target)?;
        writeln!(output, "  Error:            {} ({})", diagnosis.error_kind.description(), diagnosis.error_message)?;
        writeln!(output, "  Network access:   {}", yes_no(diagnosis.has_network_permission))?;
        writeln!(output, "  Direct TCP:       {}", yes_no(diagnosis.alternate_protocol_supported))?;
        writeln!(output, "  Environment:      {}", diagnosis.network_type)?;
        writeln!(output, "  Target reachable: {}", yes_no(diagnosis.target_reachable))?;
        write!(output, "Suggestions:")?;
        for (index, suggestion) in diagnosis.suggestions.iter().enumerate() {
            write!(output, "\n  {}. {}", index + 1, suggestion)?;
        }

        Ok(output)
    }

    fn format_connectivity(&self, connected: bool, reference: &str) -> Result<String> {
        Ok(if connected {
            format!("Network is reachable (probe to {} succeeded)", reference)
        } else {
            format!("Network is NOT reachable (probe to {} failed)", reference)
        })
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("Error: {}", error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("Warning: {}", warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::analyze;
    use crate::types::ErrorKind;
    use chrono::Utc;
    use std::time::Duration;

    fn formatter(verbose: bool) -> PlainFormatter {
        PlainFormatter::new(FormattingOptions {
            enable_color: false,
            verbose_mode: verbose,
        })
    }

    #[test]
    fn test_format_latency() {
        assert_eq!(format_latency(12.0), "12 ms");
        assert_eq!(format_latency(12.5), "12.5 ms");
        assert_eq!(format_latency(1250.0), "1.25 s");
    }

    #[test]
    fn test_header() {
        let header = formatter(false)
            .format_header(&ProbeTarget::new("example.com"), StrategyKind::Native, &ProbeConfig::new())
            .unwrap();
        assert_eq!(header, "PROBE example.com (native strategy): 4 attempts, 64 bytes, timeout 5s");
    }

    #[test]
    fn test_attempt_lines() {
        let ok = ProbeResult::success("example.com", Duration::from_millis(23));
        let failed = ProbeResult::failure("example.com", ErrorKind::Timeout, "connect timeout after 5000ms");

        assert_eq!(formatter(false).format_attempt(1, &ok).unwrap(), "#1 example.com: time=23 ms");
        assert_eq!(formatter(false).format_attempt(2, &failed).unwrap(), "#2 example.com: failed (timeout)");
        assert_eq!(
            formatter(true).format_attempt(2, &failed).unwrap(),
            "#2 example.com: failed (timeout) - connect timeout after 5000ms"
        );
    }

    #[test]
    fn test_statistics_block() {
        let results = vec![
            ProbeResult::success("h", Duration::from_millis(10)),
            ProbeResult::failure("h", ErrorKind::Timeout, "t"),
            ProbeResult::success("h", Duration::from_millis(15)),
        ];
        let block = formatter(true)
            .format_statistics(&ProbeTarget::new("h"), &analyze(&results))
            .unwrap();

        assert!(block.starts_with("--- h probe statistics ---\n"));
        assert!(block.contains("3 attempted, 2 succeeded, 33.3% loss"));
        assert!(block.contains("latency min/avg/max = 10/12.5/15 ms"));
        assert!(block.contains("failures: timeout=1"));
    }

    #[test]
    fn test_statistics_block_all_failed_shows_failures() {
        let results = vec![ProbeResult::failure("h", ErrorKind::HostNotFound, "x")];
        let block = formatter(false)
            .format_statistics(&ProbeTarget::new("h"), &analyze(&results))
            .unwrap();

        assert!(block.contains("100.0% loss"));
        assert!(!block.contains("latency"));
        assert!(block.contains("failures: hostNotFound=1"));
    }

    #[test]
    fn test_diagnosis_block() {
        let diagnosis = Diagnosis {
            timestamp: Utc::now(),
            target: "example.com".to_string(),
            error_kind: ErrorKind::Timeout,
            error_message: "connect timeout".to_string(),
            has_network_permission: true,
            alternate_protocol_supported: false,
            network_type: "native (linux)".to_string(),
            target_reachable: false,
            suggestions: vec!["first".to_string(), "second".to_string()],
        };

        let block = formatter(false).format_diagnosis(&diagnosis).unwrap();
        assert!(block.contains("Diagnosis for example.com:"));
        assert!(block.contains("Network access:   yes"));
        assert!(block.contains("Direct TCP:       no"));
        assert!(block.contains("Suggestions:\n  1. first\n  2. second"));
    }

    #[test]
    fn test_connectivity() {
        let f = formatter(false);
        assert!(f.format_connectivity(true, "8.8.8.8").unwrap().contains("is reachable"));
        assert!(f.format_connectivity(false, "8.8.8.8").unwrap().contains("NOT reachable"));
    }
}

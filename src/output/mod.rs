//! Output formatting and display system
//!
//! Text output goes through an [`OutputFormatter`]; `--json` output is a
//! single [`SessionReport`] document.

mod colored;
mod formatter;

pub use colored::{ColorScheme, ColoredFormatter, PerformanceLevel};
pub use formatter::{FormattingOptions, OutputFormatter, PlainFormatter};

use crate::{
    error::Result,
    models::{Diagnosis, ProbeConfig, ProbeResult, Statistics},
    types::{ProbeTarget, StrategyKind},
};
use serde::Serialize;

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }

    /// Create a plain text formatter for scripts/logs
    pub fn create_plain_formatter() -> Box<dyn OutputFormatter> {
        Self::create_formatter(false, true)
    }
}

/// Everything a session produced, as emitted by `--json`
#[derive(Debug, Serialize)]
pub struct SessionReport<'a> {
    pub target: &'a ProbeTarget,
    pub strategy: StrategyKind,
    pub config: &'a ProbeConfig,
    pub results: &'a [ProbeResult],
    pub statistics: &'a Statistics,
    /// Set only when diagnosis was requested and an attempt failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<&'a Diagnosis>,
    /// The run was interrupted before all attempts completed
    pub cancelled: bool,
}

impl SessionReport<'_> {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Result of `--check`, as emitted by `--json`
#[derive(Debug, Serialize)]
pub struct ConnectivityReport<'a> {
    pub reference_host: &'a str,
    pub strategy: StrategyKind,
    pub connected: bool,
}

impl ConnectivityReport<'_> {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

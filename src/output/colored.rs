//! Colored formatter implementation with terminal color support

use super::formatter::{format_histogram, format_latency, FormattingOptions, OutputFormatter};
use crate::{
    error::Result,
    models::{Diagnosis, ProbeConfig, ProbeResult, Statistics},
    types::{ProbeTarget, StrategyKind},
};
use colored::*;
use std::fmt::Write as _;

/// Latency bands used for color coding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceLevel {
    Excellent, // < 50ms
    Good,      // 50-100ms
    Fair,      // 100-300ms
    Poor,      // 300-1000ms
    VeryPoor,  // > 1000ms
}

impl PerformanceLevel {
    pub fn from_latency(ms: f64) -> Self {
        if ms < 50.0 {
            Self::Excellent
        } else if ms < 100.0 {
            Self::Good
        } else if ms < 300.0 {
            Self::Fair
        } else if ms < 1000.0 {
            Self::Poor
        } else {
            Self::VeryPoor
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Magenta,
            Self::VeryPoor => Color::Red,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very Poor",
        }
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            info: Color::Cyan,
            muted: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self::with_color_scheme(options, ColorScheme::default())
    }

    pub fn with_color_scheme(options: FormattingOptions, color_scheme: ColorScheme) -> Self {
        Self { options, color_scheme }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    fn bold(&self, text: &str, color: Color) -> ColoredString {
        self.colorize(text, color).bold()
    }

    fn latency(&self, ms: f64) -> ColoredString {
        self.colorize(&format_latency(ms), PerformanceLevel::from_latency(ms).color())
    }

    fn loss_color(&self, loss: f64) -> Color {
        if loss == 0.0 {
            self.color_scheme.success
        } else if loss < 100.0 {
            self.color_scheme.warning
        } else {
            self.color_scheme.error
        }
    }

    fn flag(&self, value: bool) -> ColoredString {
        if value {
            self.colorize("yes", self.color_scheme.success)
        } else {
            self.colorize("no", self.color_scheme.error)
        }
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_header(&self, target: &ProbeTarget, strategy: StrategyKind, config: &ProbeConfig) -> Result<String> {
        Ok(format!(
            "{} {} {}",
            self.bold("PROBE", self.color_scheme.header),
            self.bold(target.host(), self.color_scheme.info),
            self.colorize(
                &format!(
                    "({} strategy): {} attempts, {} bytes, timeout {}s",
                    strategy,
                    config.attempts(),
                    config.packet_size(),
                    config.timeout().as_secs()
                ),
                self.color_scheme.muted
            )
        ))
    }

    fn format_attempt(&self, sequence: u32, result: &ProbeResult) -> Result<String> {
        let prefix = self.colorize(&format!("#{}", sequence), self.color_scheme.muted);
        match result.latency_millis() {
            Some(ms) => Ok(format!(
                "{} {} {}: time={}",
                prefix,
                self.colorize("✓", self.color_scheme.success),
                result.target(),
                self.latency(ms as f64)
            )),
            None => {
                let kind = result.error_kind().map(|k| k.as_str()).unwrap_or("other");
                let mut line = format!(
                    "{} {} {}: {}",
                    prefix,
                    self.colorize("✗", self.color_scheme.error),
                    result.target(),
                    self.colorize(&format!("failed ({})", kind), self.color_scheme.error)
                );
                if self.options.verbose_mode {
                    if let Some(message) = result.error_message() {
                        write!(line, " {}", self.colorize(&format!("- {}", message), self.color_scheme.muted))?;
                    }
                }
                Ok(line)
            }
        }
    }

    fn format_statistics(&self, target: &ProbeTarget, stats: &Statistics) -> Result<String> {
        let mut output = String::new();

        writeln!(
            output,
            "{}",
            self.bold(&format!("--- {} probe statistics ---", target), self.color_scheme.header)
        )?;
        write!(
            output,
            "{} attempted, {} succeeded, {}",
            stats.total,
            stats.success_count,
            self.bold(
                &format!("{:.1}% loss", stats.loss_rate_percent),
                self.loss_color(stats.loss_rate_percent)
            )
        )?;

        if let (Some(min), Some(avg), Some(max)) = (stats.min_latency_ms, stats.avg_latency_ms, stats.max_latency_ms) {
            let level = PerformanceLevel::from_latency(avg);
            write!(
                output,
                "\nlatency min/avg/max = {}/{}/{} ms {}",
                min,
                self.colorize(&format!("{:.1}", avg), level.color()),
                max,
                self.colorize(&format!("[{}]", level.description()), level.color())
            )?;
        }

        if !stats.error_kind_histogram.is_empty() && (self.options.verbose_mode || stats.success_count == 0) {
            write!(
                output,
                "\nfailures: {}",
                self.colorize(&format_histogram(stats), self.color_scheme.error)
            )?;
        }

        Ok(output)
    }

    fn format_diagnosis(&self, diagnosis: &Diagnosis) -> Result<String> {
        let mut output = String::new();

        writeln!(
            output,
            "{}",
            self.bold(&format!("Diagnosis for {}:", diagnosis.target), self.color_scheme.header)
        )?;
        writeln!(
            output,
            "  Error:            {} {}",
            self.colorize(diagnosis.error_kind.description(), self.color_scheme.error),
            self.colorize(&format!("({})", diagnosis.error_message), self.color_scheme.muted)
        )?;
        writeln!(output, "  Network access:   {}", self.flag(diagnosis.has_network_permission))?;
        writeln!(output, "  Direct TCP:       {}", self.flag(diagnosis.alternate_protocol_supported))?;
        writeln!(output, "  Environment:      {}", diagnosis.network_type)?;
        writeln!(output, "  Target reachable: {}", self.flag(diagnosis.target_reachable))?;
        write!(output, "{}", self.bold("Suggestions:", self.color_scheme.header))?;
        for (index, suggestion) in diagnosis.suggestions.iter().enumerate() {
            write!(
                output,
                "\n  {} {}",
                self.colorize(&format!("{}.", index + 1), self.color_scheme.info),
                suggestion
            )?;
        }

        Ok(output)
    }

    fn format_connectivity(&self, connected: bool, reference: &str) -> Result<String> {
        Ok(if connected {
            format!(
                "{} {}",
                self.colorize("✓", self.color_scheme.success),
                self.colorize(
                    &format!("Network is reachable (probe to {} succeeded)", reference),
                    self.color_scheme.success
                )
            )
        } else {
            format!(
                "{} {}",
                self.colorize("✗", self.color_scheme.error),
                self.colorize(
                    &format!("Network is NOT reachable (probe to {} failed)", reference),
                    self.color_scheme.error
                )
            )
        })
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("{} {}", self.bold("Error:", self.color_scheme.error), error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("{} {}", self.bold("Warning:", self.color_scheme.warning), warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(self.colorize(message, self.color_scheme.success).to_string())
    }
}

//! Command-line interface

use crate::types::ProbeMode;
use clap::Parser;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("GIT_COMMIT"),
    "\nbuilt:  ",
    env!("BUILD_TIME"),
    "\ntarget: ",
    env!("TARGET_TRIPLE"),
);

/// Network Probe Doctor - probe a host, summarise the session and diagnose failures
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "netdiag")]
#[command(version, long_version = LONG_VERSION, about, long_about = None)]
pub struct Cli {
    /// Host to probe (name or IP literal)
    #[arg(value_name = "TARGET")]
    pub target: Option<String>,

    /// Number of attempts in the session
    #[arg(short = 'c', long)]
    pub count: Option<u32>,

    /// Per-probe timeout in seconds
    #[arg(short, long, value_parser = parse_timeout)]
    pub timeout: Option<u64>,

    /// Pause between attempts in milliseconds
    #[arg(short, long, value_name = "MS")]
    pub interval: Option<u64>,

    /// Filler bytes sent with each probe
    #[arg(short = 's', long, value_name = "BYTES")]
    pub size: Option<usize>,

    /// Retries per attempt before it counts as failed
    #[arg(short, long)]
    pub retries: Option<u32>,

    /// Pause between retries in milliseconds
    #[arg(long, value_name = "MS")]
    pub retry_interval: Option<u64>,

    /// Probe strategy: auto, tcp or http
    #[arg(long)]
    pub mode: Option<ProbeMode>,

    /// Diagnose the most recent failure after the session
    #[arg(long)]
    pub diagnose: bool,

    /// Only check whether the network is reachable
    #[arg(long, conflicts_with = "diagnose")]
    pub check: bool,

    /// Emit a JSON document instead of text
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Print the supported environment variables and exit
    #[arg(long)]
    pub env_help: bool,

    /// Print an example .env file and exit
    #[arg(long)]
    pub env_example: bool,
}

impl Cli {
    /// Whether colors should be used, before config layering
    pub fn use_colors(&self) -> bool {
        !self.no_color && !self.json && supports_color()
    }

    /// Human-readable list of the options given on the command line
    pub fn get_config_summary(&self) -> String {
        let mut summary = String::from("Command-line overrides:\n");
        let mut push = |name: &str, value: Option<String>| {
            if let Some(value) = value {
                summary.push_str(&format!("  {}: {}\n", name, value));
            }
        };

        push("Target", self.target.clone());
        push("Attempts", self.count.map(|v| v.to_string()));
        push("Timeout", self.timeout.map(|v| format!("{}s", v)));
        push("Interval", self.interval.map(|v| format!("{}ms", v)));
        push("Packet size", self.size.map(|v| format!("{} bytes", v)));
        push("Retries", self.retries.map(|v| v.to_string()));
        push("Retry interval", self.retry_interval.map(|v| format!("{}ms", v)));
        push("Mode", self.mode.map(|v| v.to_string()));

        summary
    }
}

/// Parse a timeout in whole seconds (1-300)
fn parse_timeout(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid timeout: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid timeout: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Timeout must be greater than 0".to_string())
            } else if secs > crate::models::config::MAX_TIMEOUT_SECONDS {
                Err("Timeout cannot exceed 300 seconds".to_string())
            } else {
                Ok(secs)
            }
        })
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    cfg!(unix)
}

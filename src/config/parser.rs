//! Configuration parsing from CLI arguments and environment variables

use crate::{cli::Cli, config::env::EnvManager, error::Result, models::Config};
use std::path::PathBuf;

/// Combines defaults, the env file, environment variables and CLI arguments
pub struct ConfigParser {
    cli: Cli,
    env_file: PathBuf,
}

impl ConfigParser {
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            env_file: PathBuf::from(".env"),
        }
    }

    /// Read env defaults from `path` instead of `./.env`
    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = path.into();
        self
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        EnvManager::load_env_file_from(&self.env_file)?;
        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config);
        config.validate()?;

        Ok(config)
    }

    fn apply_cli_overrides(&self, config: &mut Config) {
        let cli = &self.cli;

        if let Some(ref target) = cli.target {
            config.target = target.trim().to_string();
        }
        if let Some(count) = cli.count {
            config.attempts = count;
        }
        if let Some(timeout) = cli.timeout {
            config.timeout_seconds = timeout;
        }
        if let Some(interval) = cli.interval {
            config.interval_ms = interval;
        }
        if let Some(size) = cli.size {
            config.packet_size = size;
        }
        if let Some(retries) = cli.retries {
            config.retries = retries;
        }
        if let Some(retry_interval) = cli.retry_interval {
            config.retry_interval_ms = retry_interval;
        }
        if let Some(mode) = cli.mode {
            config.probe_mode = mode;
        }

        // Covers --no-color, --json and terminals without color support
        if !cli.use_colors() {
            config.enable_color = false;
        }

        // CLI-only switches
        config.verbose = cli.verbose;
        config.debug = cli.debug;
        config.json = cli.json;
        config.diagnose = cli.diagnose;
        config.check = cli.check;
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    [
        format!("Target: {}", config.target),
        format!("Mode: {}", config.probe_mode),
        format!("Attempts: {}", config.attempts),
        format!("Timeout: {}s", config.timeout_seconds),
        format!("Interval: {}ms", config.interval_ms),
        format!("Packet size: {} bytes", config.packet_size),
        format!("Retries: {} (every {}ms)", config.retries, config.retry_interval_ms),
        format!("Color Output: {}", config.enable_color),
        format!("Verbose: {}", config.verbose),
        format!("Debug: {}", config.debug),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProbeMode;
    use clap::Parser;
    use std::env;
    use std::io::Write;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: [&str; 9] = [
        "PROBE_TARGET",
        "PROBE_ATTEMPTS",
        "PROBE_TIMEOUT_SECONDS",
        "PROBE_INTERVAL_MS",
        "PROBE_PACKET_SIZE",
        "PROBE_RETRIES",
        "PROBE_RETRY_INTERVAL_MS",
        "PROBE_MODE",
        "ENABLE_COLOR",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn parser(args: &[&str], dir: &tempfile::TempDir) -> ConfigParser {
        let mut argv = vec!["netdiag"];
        argv.extend_from_slice(args);
        ConfigParser::new(Cli::parse_from(argv)).with_env_file(dir.path().join(".env"))
    }

    #[test]
    fn test_defaults_without_env_or_args() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = tempfile::tempdir().unwrap();

        let config = parser(&[], &dir).parse().unwrap();
        assert_eq!(config.target, crate::defaults::DEFAULT_TARGET);
        assert_eq!(config.attempts, crate::defaults::DEFAULT_ATTEMPTS);
        assert_eq!(config.probe_mode, ProbeMode::Auto);
        assert!(!config.json);
    }

    #[test]
    fn test_cli_overrides() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = tempfile::tempdir().unwrap();

        let config = parser(
            &["example.com", "-c", "10", "-t", "5", "-r", "0", "--mode", "tcp", "--no-color", "--verbose"],
            &dir,
        )
        .parse()
        .unwrap();

        assert_eq!(config.target, "example.com");
        assert_eq!(config.attempts, 10);
        assert_eq!(config.timeout_seconds, 5);
        assert_eq!(config.retries, 0);
        assert_eq!(config.probe_mode, ProbeMode::Tcp);
        assert!(!config.enable_color);
        assert!(config.verbose);
    }

    #[test]
    fn test_env_vars_then_cli_precedence() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = tempfile::tempdir().unwrap();

        env::set_var("PROBE_ATTEMPTS", "8");
        env::set_var("PROBE_MODE", "http");
        let config = parser(&["-c", "12"], &dir).parse().unwrap();
        clear_env();

        assert_eq!(config.attempts, 12);
        assert_eq!(config.probe_mode, ProbeMode::Http);
    }

    #[test]
    fn test_env_file_is_loaded() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join(".env")).unwrap();
        writeln!(file, "PROBE_TARGET=from-file.example").unwrap();
        writeln!(file, "PROBE_RETRIES=7").unwrap();

        let config = parser(&[], &dir).parse().unwrap();
        clear_env();

        assert_eq!(config.target, "from-file.example");
        assert_eq!(config.retries, 7);
    }

    #[test]
    fn test_invalid_env_value_is_config_error() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = tempfile::tempdir().unwrap();

        env::set_var("PROBE_ATTEMPTS", "many");
        let result = parser(&[], &dir).parse();
        clear_env();

        let error = result.unwrap_err();
        assert_eq!(error.category(), "CONFIG");
        assert!(error.to_string().contains("PROBE_ATTEMPTS"));
    }

    #[test]
    fn test_out_of_range_cli_value_fails_validation() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = tempfile::tempdir().unwrap();

        let error = parser(&["-c", "0"], &dir).parse().unwrap_err();
        assert_eq!(error.category(), "VALIDATION");
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_json_disables_color() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = tempfile::tempdir().unwrap();

        let config = parser(&["--json"], &dir).parse().unwrap();
        assert!(config.json);
        assert!(!config.enable_color);
    }

    #[test]
    fn test_config_summary() {
        let summary = display_config_summary(&Config::default());
        assert!(summary.contains("Target: 8.8.8.8"));
        assert!(summary.contains("Attempts: 4"));
        assert!(summary.contains("Mode: auto"));
    }
}

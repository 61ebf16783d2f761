//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use crate::models::config::{MAX_ATTEMPTS, MAX_INTERVAL_MS, MAX_RETRIES, MAX_RETRY_INTERVAL_MS, MAX_TIMEOUT_SECONDS};
use crate::types::ProbeMode;
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load an env file; returns whether one was found
    ///
    /// Variables already present in the process environment win over the file.
    pub fn load_env_file_from(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }

        dotenv::from_path(path)
            .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;
        Ok(true)
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        r#"# Network Probe Doctor Configuration
#
# Values here are defaults for netdiag; command-line arguments override them,
# and variables already set in the environment override this file.

# Host to probe (name or IP literal)
# PROBE_TARGET=8.8.8.8

# Number of attempts per session (1-1000)
# PROBE_ATTEMPTS=4

# Per-probe timeout in seconds (1-300)
# PROBE_TIMEOUT_SECONDS=5

# Pause between attempts in milliseconds (0-60000)
# PROBE_INTERVAL_MS=1000

# Filler bytes sent with each probe (0-65507)
# PROBE_PACKET_SIZE=64

# Retries per attempt before it counts as failed (0-10)
# PROBE_RETRIES=2

# Pause between retries in milliseconds (0-60000)
# PROBE_RETRY_INTERVAL_MS=2000

# Probe strategy: auto, tcp or http
# PROBE_MODE=auto

# Enable colored output (true/false)
# ENABLE_COLOR=true

# Example: a quick check through a proxy-only network
# PROBE_MODE=http
# PROBE_ATTEMPTS=2
# PROBE_RETRIES=0
"#
        .to_string()
    }

    /// Validate one variable's value before it is merged
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "PROBE_TARGET" => {
                if value.is_empty() || value.chars().any(char::is_whitespace) {
                    return Err(AppError::config(format!("Invalid PROBE_TARGET value '{}'", value)));
                }
            }
            "PROBE_ATTEMPTS" => {
                let attempts: u32 = parse_var(key, value)?;
                if attempts == 0 || attempts > MAX_ATTEMPTS {
                    return Err(AppError::config(format!(
                        "PROBE_ATTEMPTS must be between 1 and {}, got: {}",
                        MAX_ATTEMPTS, attempts
                    )));
                }
            }
            "PROBE_TIMEOUT_SECONDS" => {
                let timeout: u64 = parse_var(key, value)?;
                if timeout == 0 || timeout > MAX_TIMEOUT_SECONDS {
                    return Err(AppError::config(format!(
                        "PROBE_TIMEOUT_SECONDS must be between 1 and {}, got: {}",
                        MAX_TIMEOUT_SECONDS, timeout
                    )));
                }
            }
            "PROBE_INTERVAL_MS" => check_max(key, parse_var(key, value)?, MAX_INTERVAL_MS)?,
            "PROBE_RETRY_INTERVAL_MS" => check_max(key, parse_var(key, value)?, MAX_RETRY_INTERVAL_MS)?,
            "PROBE_RETRIES" => check_max(key, parse_var(key, value)?, u64::from(MAX_RETRIES))?,
            "PROBE_PACKET_SIZE" => check_max(key, parse_var(key, value)?, crate::defaults::MAX_PACKET_SIZE as u64)?,
            "PROBE_MODE" => {
                value
                    .parse::<ProbeMode>()
                    .map_err(|e| AppError::config(format!("Invalid PROBE_MODE value '{}': {}", value, e)))?;
            }
            "ENABLE_COLOR" => {
                parse_var::<bool>(key, value)?;
            }
            _ => {
                // Unknown variable, ignore
            }
        }

        Ok(())
    }

    /// Supported variables as (name, description, example)
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("PROBE_TARGET", "Host to probe", "example.com"),
            ("PROBE_ATTEMPTS", "Attempts per session (1-1000)", "4"),
            ("PROBE_TIMEOUT_SECONDS", "Per-probe timeout in seconds (1-300)", "5"),
            ("PROBE_INTERVAL_MS", "Pause between attempts in ms", "1000"),
            ("PROBE_PACKET_SIZE", "Filler bytes per probe", "64"),
            ("PROBE_RETRIES", "Retries per attempt (0-10)", "2"),
            ("PROBE_RETRY_INTERVAL_MS", "Pause between retries in ms", "2000"),
            ("PROBE_MODE", "Probe strategy (auto, tcp, http)", "auto"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<24} {}\n", var, description));
            help.push_str(&format!("  {:<24} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Validate the lines of an env file without loading it
    pub fn check_env_file(path: &Path) -> Result<Option<Vec<String>>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        let mut warnings = Vec::new();

        for line in content.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                if let Err(e) = Self::validate_env_var(key.trim(), value) {
                    warnings.push(format!("Line '{}': {}", line, e));
                }
            }
        }

        Ok(Some(warnings))
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))
}

fn check_max(key: &str, value: u64, max: u64) -> Result<()> {
    if value > max {
        return Err(AppError::config(format!("{} cannot exceed {}, got: {}", key, max, value)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_example_content_lists_every_variable() {
        let content = EnvManager::create_example_env_content();
        for (name, _, _) in EnvManager::get_supported_env_vars() {
            assert!(content.contains(&format!("{}=", name)), "missing {}", name);
        }
    }

    #[test]
    fn test_validate_env_var() {
        assert!(EnvManager::validate_env_var("PROBE_TARGET", "example.com").is_ok());
        assert!(EnvManager::validate_env_var("PROBE_ATTEMPTS", "10").is_ok());
        assert!(EnvManager::validate_env_var("PROBE_TIMEOUT_SECONDS", "300").is_ok());
        assert!(EnvManager::validate_env_var("PROBE_INTERVAL_MS", "0").is_ok());
        assert!(EnvManager::validate_env_var("PROBE_RETRIES", "10").is_ok());
        assert!(EnvManager::validate_env_var("PROBE_PACKET_SIZE", "65507").is_ok());
        assert!(EnvManager::validate_env_var("PROBE_MODE", "http-only").is_ok());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "false").is_ok());
        assert!(EnvManager::validate_env_var("SOMETHING_ELSE", "anything").is_ok());

        assert!(EnvManager::validate_env_var("PROBE_TARGET", "  ").is_err());
        assert!(EnvManager::validate_env_var("PROBE_ATTEMPTS", "0").is_err());
        assert!(EnvManager::validate_env_var("PROBE_ATTEMPTS", "1001").is_err());
        assert!(EnvManager::validate_env_var("PROBE_TIMEOUT_SECONDS", "0").is_err());
        assert!(EnvManager::validate_env_var("PROBE_INTERVAL_MS", "60001").is_err());
        assert!(EnvManager::validate_env_var("PROBE_RETRIES", "11").is_err());
        assert!(EnvManager::validate_env_var("PROBE_PACKET_SIZE", "65508").is_err());
        assert!(EnvManager::validate_env_var("PROBE_MODE", "icmp").is_err());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "maybe").is_err());
        assert!(EnvManager::validate_env_var("PROBE_ATTEMPTS", "-1").is_err());
    }

    #[test]
    fn test_display_env_help() {
        let help = EnvManager::display_env_help();
        assert!(help.contains("Supported Environment Variables:"));
        assert!(help.contains("PROBE_RETRY_INTERVAL_MS"));
        assert!(help.contains("Configuration Priority"));
    }

    #[test]
    fn test_check_env_file_reports_bad_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file, "PROBE_ATTEMPTS=4").unwrap();
        writeln!(file, "PROBE_MODE=icmp").unwrap();
        writeln!(file).unwrap();

        let warnings = EnvManager::check_env_file(file.path()).unwrap().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("PROBE_MODE"));
    }

    #[test]
    fn test_missing_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.env");
        assert!(EnvManager::check_env_file(&path).unwrap().is_none());
        assert!(!EnvManager::load_env_file_from(&path).unwrap());
    }
}

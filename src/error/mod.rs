//! Error handling for the connectivity diagnostic tool
//!
//! Network faults met while probing are never surfaced through this type;
//! they become data on [`crate::models::ProbeResult`]. `AppError` covers the
//! ambient failures around the engine: configuration, argument parsing,
//! output serialization and the CLI's final verdict.

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Parsing errors (arguments, JSON, environment values)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Connectivity verdicts reported by the CLI (failed attempts, no network)
    #[error("Network error: {0}")]
    Network(String),

    /// I/O errors (file operations, terminal output)
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Validation(_) => "VALIDATION",
            Self::Parse(_) => "PARSE",
            Self::Network(_) => "NETWORK",
            Self::Io(_) => "IO",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Whether running the command again might give a different outcome
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Get user-friendly error message with suggestions
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Config(msg) => {
                format!("Configuration problem: {}\n\nSuggestion: Check your .env file, PROBE_* variables or command line arguments.", msg)
            }
            Self::Validation(msg) => {
                format!("Invalid input: {}\n\nSuggestion: Run with --help to see the accepted ranges for each option.", msg)
            }
            Self::Parse(msg) => {
                format!("Failed to parse value: {}\n\nSuggestion: Check the format of the value you supplied.", msg)
            }
            Self::Network(msg) => {
                format!("Connectivity problem: {}\n\nSuggestion: Re-run with --diagnose for a detailed diagnosis.", msg)
            }
            Self::Io(msg) => {
                format!("I/O operation failed: {}\n\nSuggestion: Check file permissions and that the terminal is still attached.", msg)
            }
            Self::Internal(msg) => {
                format!("Internal error: {}\n\nThis is likely a bug. Please report this issue with the error details.", msg)
            }
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => 1,
            Self::Network(_) => 2,
            Self::Io(_) => 5,
            Self::Internal(_) => 99,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Validation(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Network(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Io(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<std::fmt::Error> for AppError {
    fn from(error: std::fmt::Error) -> Self {
        Self::io(format!("Failed to format output: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON error: {}", error))
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

impl From<std::num::ParseFloatError> for AppError {
    fn from(error: std::num::ParseFloatError) -> Self {
        Self::parse(format!("Float parse error: {}", error))
    }
}

impl From<std::str::ParseBoolError> for AppError {
    fn from(error: std::str::ParseBoolError) -> Self {
        Self::parse(format!("Boolean parse error: {}", error))
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Error context trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    /// Add static context to an error
    fn context(self, message: &'static str) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<AppError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        // Keep the original variant so exit codes survive the added context
        self.map_err(|e| match e.into() {
            AppError::Config(msg) => AppError::Config(format!("{}: {}", f(), msg)),
            AppError::Validation(msg) => AppError::Validation(format!("{}: {}", f(), msg)),
            AppError::Parse(msg) => AppError::Parse(format!("{}: {}", f(), msg)),
            AppError::Network(msg) => AppError::Network(format!("{}: {}", f(), msg)),
            AppError::Io(msg) => AppError::Io(format!("{}: {}", f(), msg)),
            AppError::Internal(msg) => AppError::Internal(format!("{}: {}", f(), msg)),
        })
    }

    fn context(self, message: &'static str) -> Result<T> {
        self.with_context(|| message.to_string())
    }
}

/// Error reporter for user feedback on stderr
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    /// Create a new error reporter
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Report an error to the user
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", self.render(error));
    }

    /// Render what [`report_error`](Self::report_error) prints
    pub fn render(&self, error: &AppError) -> String {
        let mut out = error.format_for_console(self.use_color);

        if self.verbose {
            out.push_str("\n\n");
            out.push_str(&error.user_friendly_message());

            if error.is_recoverable() {
                let hint = "This might be temporary. You can try running the command again.";
                out.push_str("\n\n");
                if self.use_color {
                    use colored::Colorize;
                    out.push_str(&hint.green().to_string());
                } else {
                    out.push_str(hint);
                }
            }
        }

        out
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

//! Structured logging for the diagnostic engine
//!
//! Loggers are plain values handed to the components that need them; there
//! is no global logger. This module provides:
//! - Structured log entries with levels, free-form fields and correlation IDs
//! - Console, JSON and compact renderings
//! - A capture output so tests can assert on what was logged
//! - A factory that hands out named loggers sharing one session

use crate::classifier::Fault;
use crate::error::{AppError, Result};
use crate::models::{Config, ProbeResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Trace level - most detailed
    Trace = 0,
    /// Debug level - detailed information for debugging
    Debug = 1,
    /// Info level - general application information
    Info = 2,
    /// Warning level - potentially harmful situations
    Warn = 3,
    /// Error level - error events but application can continue
    Error = 4,
    /// Fatal level - severe error events that cause application termination
    Fatal = 5,
}

impl LogLevel {
    /// Get log level name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Get ANSI color code for console output
    pub fn color_code(&self) -> &'static str {
        match self {
            LogLevel::Trace => "\x1b[37m",
            LogLevel::Debug => "\x1b[36m",
            LogLevel::Info => "\x1b[32m",
            LogLevel::Warn => "\x1b[33m",
            LogLevel::Error => "\x1b[31m",
            LogLevel::Fatal => "\x1b[35m",
        }
    }

    /// Reset ANSI color code
    pub fn reset_code() -> &'static str {
        "\x1b[0m"
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(AppError::parse(format!("Invalid log level: {}", s))),
        }
    }
}

/// Log entry structure for structured logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Timestamp when log entry was created
    pub timestamp: DateTime<Utc>,
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Logger name/component
    pub logger: String,
    /// Correlation ID for tracking related events
    pub correlation_id: Option<String>,
    /// Additional structured fields
    pub fields: BTreeMap<String, serde_json::Value>,
    /// File and line information
    pub location: Option<LogLocation>,
}

impl LogEntry {
    /// Look up a structured field by name
    pub fn field(&self, key: &str) -> Option<&serde_json::Value> {
        self.fields.get(key)
    }
}

/// Source code location information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLocation {
    pub file: String,
    pub line: u32,
    pub module: Option<String>,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// JSON format for structured logging
    Json,
    /// Compact single-line format
    Compact,
}

/// In-memory sink shared between a capturing logger and its reader
pub type LogBuffer = Arc<Mutex<Vec<LogEntry>>>;

/// Where rendered entries go
#[derive(Debug, Clone, Default)]
pub enum LogOutput {
    /// Rendered to stderr, keeping stdout free for command output
    #[default]
    Console,
    /// Dropped
    Silent,
    /// Stored unrendered in a shared buffer
    Capture(LogBuffer),
}

/// Shared logging context for correlation and session tracking
#[derive(Debug, Default)]
struct LogContext {
    session_id: Option<String>,
    current_correlation_id: Option<String>,
    context_fields: BTreeMap<String, serde_json::Value>,
}

/// Structured logger
///
/// Cloning is cheap; clones share the session context and the output.
#[derive(Debug, Clone)]
pub struct Logger {
    min_level: LogLevel,
    use_color: bool,
    include_location: bool,
    format: LogFormat,
    name: String,
    output: LogOutput,
    context: Arc<RwLock<LogContext>>,
}

impl Logger {
    /// Create a new logger writing to the console at info level
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            min_level: LogLevel::Info,
            use_color: true,
            include_location: false,
            format: LogFormat::Console,
            name: name.into(),
            output: LogOutput::Console,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Create a logger with levels and colors taken from the configuration
    pub fn with_config(name: impl Into<String>, config: &Config) -> Self {
        let min_level = if config.debug {
            LogLevel::Debug
        } else if config.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };

        Self {
            min_level,
            use_color: config.enable_color,
            include_location: config.debug,
            format: if config.debug { LogFormat::Json } else { LogFormat::Console },
            ..Self::new(name)
        }
    }

    /// Logger that discards everything
    pub fn silent(name: impl Into<String>) -> Self {
        Self::new(name).with_output(LogOutput::Silent)
    }

    /// Logger that records every entry at or above `min_level`
    pub fn capturing(name: impl Into<String>, min_level: LogLevel) -> (Self, LogBuffer) {
        let buffer: LogBuffer = Arc::new(Mutex::new(Vec::new()));
        let mut logger = Self::new(name).with_output(LogOutput::Capture(Arc::clone(&buffer)));
        logger.set_level(min_level);
        (logger, buffer)
    }

    /// Replace the output sink
    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    /// Same output and session, different component name
    pub fn named(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set minimum log level
    pub fn set_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    /// Set output format
    pub fn set_format(&mut self, format: LogFormat) {
        self.format = format;
    }

    /// Enable or disable colored output
    pub fn set_color(&mut self, use_color: bool) {
        self.use_color = use_color;
    }

    /// Set session correlation ID
    pub async fn set_session_id(&self, session_id: String) {
        let mut context = self.context.write().await;
        context.session_id = Some(session_id);
    }

    /// Add context field for all subsequent log entries
    pub async fn add_context_field<T: Serialize>(&self, key: String, value: T) {
        if let Ok(json_value) = serde_json::to_value(value) {
            let mut context = self.context.write().await;
            context.context_fields.insert(key, json_value);
        }
    }

    /// Start a correlated operation and return its correlation ID
    pub async fn start_operation(&self, operation_name: &str) -> String {
        let correlation_id = Uuid::new_v4().to_string();
        {
            let mut context = self.context.write().await;
            context.current_correlation_id = Some(correlation_id.clone());
        }

        self.debug(&format!("Started operation: {}", operation_name))
            .correlation_id(&correlation_id)
            .field("operation", operation_name)
            .field("operation_type", "start")
            .log()
            .await;

        correlation_id
    }

    /// End a correlated operation
    pub async fn end_operation(&self, correlation_id: &str, operation_name: &str, success: bool) {
        self.debug(&format!("Completed operation: {} (success: {})", operation_name, success))
            .correlation_id(correlation_id)
            .field("operation", operation_name)
            .field("operation_type", "end")
            .field("success", success)
            .log()
            .await;

        let mut context = self.context.write().await;
        if context.current_correlation_id.as_deref() == Some(correlation_id) {
            context.current_correlation_id = None;
        }
    }

    /// Create a log entry builder
    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn trace(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Trace, message)
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    /// Check if a log level would be output
    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    async fn write_entry(&self, mut entry: LogEntry) {
        if !self.would_log(entry.level) || matches!(self.output, LogOutput::Silent) {
            return;
        }

        {
            let context = self.context.read().await;
            if let Some(session_id) = &context.session_id {
                entry
                    .fields
                    .insert("session_id".to_string(), serde_json::Value::String(session_id.clone()));
            }
            if entry.correlation_id.is_none() {
                entry.correlation_id = context.current_correlation_id.clone();
            }
            for (key, value) in &context.context_fields {
                entry.fields.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }

        match &self.output {
            LogOutput::Console => {
                let rendered = self.render(&entry);
                let _ = writeln!(io::stderr(), "{}", rendered);
            }
            LogOutput::Capture(buffer) => {
                // A poisoned buffer only means a test already panicked
                if let Ok(mut entries) = buffer.lock() {
                    entries.push(entry);
                }
            }
            LogOutput::Silent => {}
        }
    }

    /// Render an entry in this logger's format
    pub fn render(&self, entry: &LogEntry) -> String {
        match self.format {
            LogFormat::Console => self.format_console(entry),
            LogFormat::Json => self.format_json(entry),
            LogFormat::Compact => self.format_compact(entry),
        }
    }

    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let level_str = entry.level.as_str();

        let formatted_level = if self.use_color {
            format!("{}{:>5}{}", entry.level.color_code(), level_str, LogLevel::reset_code())
        } else {
            format!("{:>5}", level_str)
        };

        let mut output = format!("{} {} [{}] {}", timestamp, formatted_level, entry.logger, entry.message);

        if let Some(correlation_id) = &entry.correlation_id {
            let short: String = correlation_id.chars().take(8).collect();
            output.push_str(&format!(" [{}]", short));
        }

        if !entry.fields.is_empty() {
            let fields_str: Vec<String> = entry.fields.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            output.push_str(&format!(" {{{}}}", fields_str.join(", ")));
        }

        if self.include_location {
            if let Some(location) = &entry.location {
                output.push_str(&format!(" @ {}:{}", location.file, location.line));
            }
        }

        output
    }

    fn format_json(&self, entry: &LogEntry) -> String {
        match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(_) => format!(
                "{{\"error\": \"Failed to serialize log entry\", \"message\": {:?}}}",
                entry.message
            ),
        }
    }

    fn format_compact(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%H:%M:%S");
        format!(
            "{} {} {}: {}",
            timestamp,
            entry.level.as_str().chars().next().unwrap_or('?'),
            entry.logger,
            entry.message
        )
    }
}

/// Builder pattern for creating log entries
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                correlation_id: None,
                fields: BTreeMap::new(),
                location: None,
            },
        }
    }

    /// Add a correlation ID
    pub fn correlation_id(mut self, id: &str) -> Self {
        self.entry.correlation_id = Some(id.to_string());
        self
    }

    /// Add a structured field
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    /// Add location information
    pub fn location(mut self, file: &str, line: u32, module: Option<&str>) -> Self {
        self.entry.location = Some(LogLocation {
            file: file.to_string(),
            line,
            module: module.map(String::from),
        });
        self
    }

    /// Attach the outcome of a single probe
    pub fn probe_result(self, result: &ProbeResult) -> Self {
        self.field("target", result.target())
            .field("success", result.is_success())
            .field("latency_ms", result.latency_millis())
            .field("error_kind", result.error_kind())
            .field("error_message", result.error_message())
    }

    /// Attach a raw fault before classification
    pub fn fault(self, fault: &Fault) -> Self {
        self.field("fault_code", fault.code().map(|code| code.to_string()))
            .field("fault_message", fault.message())
    }

    /// Add error information
    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_recoverable", error.is_recoverable())
            .field("error_exit_code", error.exit_code())
    }

    /// Finalize and write the log entry
    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }
}

/// Hands out named loggers that share one session ID and output
pub struct LoggerFactory {
    config: Config,
    session_id: String,
    output: LogOutput,
}

impl LoggerFactory {
    /// Create a new logger factory
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session_id: Uuid::new_v4().to_string(),
            output: LogOutput::Console,
        }
    }

    /// Route every logger from this factory to `output`
    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    /// Create a logger with a specific name
    pub async fn create_logger(&self, name: &str) -> Logger {
        let logger = Logger::with_config(name, &self.config).with_output(self.output.clone());
        logger.set_session_id(self.session_id.clone()).await;
        logger
    }

    /// Get session ID
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Debug entry tagged with the call site
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

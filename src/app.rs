//! Main application orchestration and execution

use crate::{
    cli::Cli,
    config::{display_config_summary, load_config, EnvManager},
    engine::NetworkDiagnosticEngine,
    error::{AppError, ErrorContext, Result},
    logging::{LogOutput, Logger, LoggerFactory},
    models::{Config, Diagnosis, ProbeResult},
    output::{ConnectivityReport, OutputFormatter, OutputFormatterFactory, SessionReport},
};
use std::io::Write;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Main application struct that coordinates all components
pub struct App {
    config: Config,
    cli_summary: String,
    log_output: LogOutput,
}

impl App {
    /// Load the layered configuration for `cli`
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let cli_summary = cli.get_config_summary();
        let config = load_config(cli)?;
        Ok(Self {
            config,
            cli_summary,
            log_output: LogOutput::Console,
        })
    }

    /// Application over an already validated configuration
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cli_summary: String::new(),
            log_output: LogOutput::Console,
        }
    }

    pub fn with_log_output(mut self, output: LogOutput) -> Self {
        self.log_output = output;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the application until the session ends or Ctrl-C is pressed
    pub async fn run(self) -> Result<()> {
        let factory = LoggerFactory::new(self.config.clone()).with_output(self.log_output.clone());
        let logger = factory.create_logger("APP").await;
        logger.add_context_field("target".to_string(), &self.config.target).await;

        logger
            .debug(&format!("{} v{} starting", crate::PKG_NAME, crate::VERSION))
            .field("commit", env!("GIT_COMMIT"))
            .field("target_triple", env!("TARGET_TRIPLE"))
            .log()
            .await;
        if !self.cli_summary.is_empty() {
            logger.debug(self.cli_summary.trim_end()).log().await;
        }
        logger
            .debug(&format!("Configuration:\n{}", display_config_summary(&self.config)))
            .log()
            .await;

        let engine = NetworkDiagnosticEngine::with_diagnostics(
            self.config.probe_mode,
            self.config.diagnostics_config(),
            factory.create_logger("ENGINE").await,
        );

        let cancel = CancellationToken::new();
        let watcher = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            })
        };

        let outcome = self.run_with_engine(&engine, &logger, &cancel).await;
        watcher.abort();

        if let Err(ref e) = outcome {
            logger.debug("Run finished with error").error_info(e).log().await;
        }
        outcome
    }

    /// Run the configured command against `engine`
    pub async fn run_with_engine(
        &self,
        engine: &NetworkDiagnosticEngine,
        logger: &Logger,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let formatter = OutputFormatterFactory::create_formatter(self.config.enable_color, self.config.verbose);

        if self.config.check {
            self.run_check(engine, formatter.as_ref()).await
        } else {
            self.run_session(engine, formatter.as_ref(), logger, cancel).await
        }
    }

    async fn run_check(&self, engine: &NetworkDiagnosticEngine, formatter: &dyn OutputFormatter) -> Result<()> {
        let reference = engine.diagnostics_config().reference_host.clone();
        let connected = engine.is_network_connected().await;

        if self.config.json {
            let report = ConnectivityReport {
                reference_host: &reference,
                strategy: engine.strategy_kind(),
                connected,
            };
            emit(&report.to_json()?)?;
        } else {
            emit(&formatter.format_connectivity(connected, &reference)?)?;
        }

        if connected {
            Ok(())
        } else {
            Err(AppError::network(format!("No network connectivity (probe to {} failed)", reference)))
        }
    }

    async fn run_session(
        &self,
        engine: &NetworkDiagnosticEngine,
        formatter: &dyn OutputFormatter,
        logger: &Logger,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let target = self.config.probe_target();
        let probe_config = self.config.probe_config();
        let text = !self.config.json;

        if text {
            emit(&formatter.format_header(&target, engine.strategy_kind(), &probe_config)?)?;
        }

        let results = engine
            .ping_with_cancel(
                &target,
                &probe_config,
                |sequence: u32, result: &ProbeResult| {
                    if text {
                        let line = formatter
                            .format_attempt(sequence, result)
                            .unwrap_or_else(|e| e.to_string());
                        // A closed stdout must not abort the session
                        let _ = emit(&line);
                    }
                },
                cancel,
            )
            .await;

        let cancelled = cancel.is_cancelled() && results.len() < probe_config.attempts() as usize;
        if cancelled {
            logger
                .warn("Session interrupted")
                .field("completed", results.len())
                .field("requested", probe_config.attempts())
                .log()
                .await;
        }

        let statistics = engine.analyze_ping_results(&results);
        let diagnosis = if self.config.diagnose {
            self.diagnose_last_failure(engine, &results).await
        } else {
            None
        };

        if self.config.json {
            let report = SessionReport {
                target: &target,
                strategy: engine.strategy_kind(),
                config: &probe_config,
                results: &results,
                statistics: &statistics,
                diagnosis: diagnosis.as_ref(),
                cancelled,
            };
            emit(&report.to_json()?)?;
        } else {
            emit("")?;
            emit(&formatter.format_statistics(&target, &statistics)?)?;
            if let Some(ref diagnosis) = diagnosis {
                emit("")?;
                emit(&formatter.format_diagnosis(diagnosis)?)?;
            } else if self.config.diagnose && statistics.failed_count == 0 {
                emit(&formatter.format_success("All attempts succeeded; nothing to diagnose")?)?;
            }
        }

        if statistics.is_empty() {
            return Err(AppError::network(format!("No attempts to {} completed", target)));
        }
        if statistics.failed_count > 0 {
            return Err(AppError::network(format!(
                "{} of {} attempts to {} failed",
                statistics.failed_count, statistics.total, target
            )));
        }
        Ok(())
    }

    /// Diagnose the most recent failed attempt, if any
    async fn diagnose_last_failure(&self, engine: &NetworkDiagnosticEngine, results: &[ProbeResult]) -> Option<Diagnosis> {
        let failure = results.iter().rev().find(|r| !r.is_success())?;
        let kind = failure.error_kind()?;
        let message = failure.error_message().unwrap_or_default();

        Some(
            engine
                .diagnose_failure(kind, message, &self.config.probe_target())
                .await,
        )
    }
}

/// Supported environment variables, plus warnings for a local `.env`
pub fn env_help() -> Result<String> {
    let mut help = EnvManager::display_env_help();

    if let Some(warnings) = EnvManager::check_env_file(Path::new(".env")).context("Failed to check .env file")? {
        if warnings.is_empty() {
            help.push_str("\n.env file found, no problems detected\n");
        } else {
            help.push_str("\nProblems in .env:\n");
            for warning in warnings {
                help.push_str(&format!("  {}\n", warning));
            }
        }
    }

    Ok(help)
}

/// Write one line to stdout
pub fn emit(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", text).context("Failed to write output")
}

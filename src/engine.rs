//! Engine facade
//!
//! [`NetworkDiagnosticEngine`] wires the probe strategy, retry runner,
//! session orchestrator, statistics and diagnostician together behind the
//! calls a front end needs. It holds no presentation or storage concerns.

use crate::diagnostics::{DiagnosticsConfig, FailureDiagnostician};
use crate::executor::{NoProgress, PingOrchestrator, ProgressSink, RetryingProbeRunner};
use crate::logging::Logger;
use crate::models::{Diagnosis, ProbeConfig, ProbeResult, Statistics};
use crate::probe::{self, ProbeStrategy};
use crate::stats;
use crate::types::{ErrorKind, ProbeMode, ProbeTarget, StrategyKind};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct NetworkDiagnosticEngine {
    strategy: Arc<dyn ProbeStrategy>,
    orchestrator: PingOrchestrator,
    diagnostician: FailureDiagnostician,
    logger: Logger,
}

impl NetworkDiagnosticEngine {
    /// Engine using the strategy `mode` selects and default diagnostics
    pub fn new(mode: ProbeMode, logger: Logger) -> Self {
        Self::with_diagnostics(mode, DiagnosticsConfig::default(), logger)
    }

    pub fn with_diagnostics(mode: ProbeMode, diagnostics: DiagnosticsConfig, logger: Logger) -> Self {
        let strategy = probe::select_strategy(mode, &logger);
        Self::with_strategy(strategy, diagnostics, logger)
    }

    /// Engine around an explicit strategy
    pub fn with_strategy(strategy: Arc<dyn ProbeStrategy>, diagnostics: DiagnosticsConfig, logger: Logger) -> Self {
        let runner = RetryingProbeRunner::new(Arc::clone(&strategy), logger.named("RETRY"));
        let orchestrator = PingOrchestrator::new(runner, logger.named("PING"));
        let diagnostician = FailureDiagnostician::new(Arc::clone(&strategy), diagnostics, logger.named("DIAG"));

        Self {
            strategy,
            orchestrator,
            diagnostician,
            logger,
        }
    }

    pub fn strategy_kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    pub fn diagnostics_config(&self) -> &DiagnosticsConfig {
        self.diagnostician.config()
    }

    /// Run a full session; `on_progress` sees each attempt as it completes
    pub async fn ping<P>(&self, target: &ProbeTarget, config: &ProbeConfig, on_progress: P) -> Vec<ProbeResult>
    where
        P: ProgressSink,
    {
        self.ping_with_cancel(target, config, on_progress, &CancellationToken::new())
            .await
    }

    /// Run a session that stops early once `cancel` fires
    pub async fn ping_with_cancel<P>(
        &self,
        target: &ProbeTarget,
        config: &ProbeConfig,
        on_progress: P,
        cancel: &CancellationToken,
    ) -> Vec<ProbeResult>
    where
        P: ProgressSink,
    {
        self.orchestrator.ping(target, config, on_progress, cancel).await
    }

    /// Run a session with no progress reporting
    pub async fn ping_silently(&self, target: &ProbeTarget, config: &ProbeConfig) -> Vec<ProbeResult> {
        self.ping(target, config, NoProgress).await
    }

    pub fn analyze_ping_results(&self, results: &[ProbeResult]) -> Statistics {
        stats::analyze(results)
    }

    pub async fn diagnose_failure(&self, error_kind: ErrorKind, error_message: &str, target: &ProbeTarget) -> Diagnosis {
        self.diagnostician.diagnose(error_kind, error_message, target).await
    }

    /// Whether one probe to the reference host succeeds
    pub async fn is_network_connected(&self) -> bool {
        let config = self.diagnostician.config();
        let reference = ProbeTarget::new(config.reference_host.as_str());
        let result = self
            .strategy
            .probe(&reference, config.permission_check_timeout, config.packet_size)
            .await;

        self.logger
            .debug("Connectivity check finished")
            .probe_result(&result)
            .log()
            .await;

        result.is_success()
    }
}

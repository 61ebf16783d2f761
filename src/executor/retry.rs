//! Per-attempt retry wrapper around a probe strategy

use crate::logging::Logger;
use crate::models::{ProbeConfig, ProbeResult};
use crate::probe::ProbeStrategy;
use crate::types::ProbeTarget;
use std::sync::Arc;

/// Turns one logical attempt into up to `retries + 1` physical probes
///
/// The first success ends the attempt and earlier failures are discarded.
/// When every probe fails, the most recent failure is the attempt's result.
pub struct RetryingProbeRunner {
    strategy: Arc<dyn ProbeStrategy>,
    logger: Logger,
}

impl RetryingProbeRunner {
    pub fn new(strategy: Arc<dyn ProbeStrategy>, logger: Logger) -> Self {
        Self { strategy, logger }
    }

    pub fn strategy(&self) -> &Arc<dyn ProbeStrategy> {
        &self.strategy
    }

    pub async fn run_with_retry(&self, target: &ProbeTarget, config: &ProbeConfig) -> ProbeResult {
        let mut result = self.probe_once(target, config).await;

        for retry in 1..=config.retries() {
            if result.is_success() {
                break;
            }

            self.logger
                .debug(&format!("Retrying {} ({}/{})", target, retry, config.retries()))
                .field("retry", retry)
                .field("retry_interval_ms", config.retry_interval().as_millis() as u64)
                .probe_result(&result)
                .log()
                .await;

            tokio::time::sleep(config.retry_interval()).await;
            result = self.probe_once(target, config).await;
        }

        result
    }

    async fn probe_once(&self, target: &ProbeTarget, config: &ProbeConfig) -> ProbeResult {
        self.strategy
            .probe(target, config.timeout(), config.packet_size())
            .await
    }
}

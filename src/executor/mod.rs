//! Ping session execution
//!
//! This module contains the sequential session loop:
//! - [`RetryingProbeRunner`] turns one logical attempt into bounded retries
//! - [`PingOrchestrator`] runs the configured number of attempts in order,
//!   reporting progress after each and honouring cancellation between them

pub mod retry;

pub use retry::RetryingProbeRunner;

use crate::logging::Logger;
use crate::models::{ProbeConfig, ProbeResult};
use crate::types::ProbeTarget;
use tokio_util::sync::CancellationToken;

/// Upper bound on the result slots reserved before a session starts
const MAX_RESERVED_RESULTS: u32 = 1024;

/// Receives each attempt's result as soon as it is known
pub trait ProgressSink: Send {
    fn on_attempt(&mut self, attempt: u32, result: &ProbeResult);
}

impl<F> ProgressSink for F
where
    F: FnMut(u32, &ProbeResult) + Send,
{
    fn on_attempt(&mut self, attempt: u32, result: &ProbeResult) {
        self(attempt, result)
    }
}

/// Sink for callers that only want the final list
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_attempt(&mut self, _attempt: u32, _result: &ProbeResult) {}
}

/// Runs a whole ping session against one target
pub struct PingOrchestrator {
    runner: RetryingProbeRunner,
    logger: Logger,
}

impl PingOrchestrator {
    pub fn new(runner: RetryingProbeRunner, logger: Logger) -> Self {
        Self { runner, logger }
    }

    pub fn runner(&self) -> &RetryingProbeRunner {
        &self.runner
    }

    /// Run `config.attempts()` attempts in order and return their results
    ///
    /// There is no fail-fast: a failed attempt never skips the rest. The
    /// token is checked before each attempt and during the pause between
    /// attempts; an attempt already in flight always finishes, so a
    /// cancelled session returns the results gathered so far.
    pub async fn ping<P>(
        &self,
        target: &ProbeTarget,
        config: &ProbeConfig,
        mut progress: P,
        cancel: &CancellationToken,
    ) -> Vec<ProbeResult>
    where
        P: ProgressSink,
    {
        let attempts = config.attempts();
        let mut results = Vec::with_capacity(attempts.min(MAX_RESERVED_RESULTS) as usize);
        let correlation_id = self.logger.start_operation("ping").await;

        self.logger
            .info(&format!("Pinging {} ({} attempts)", target, attempts))
            .field("config", config)
            .field("strategy", self.runner.strategy().kind().as_str())
            .log()
            .await;

        for attempt in 1..=attempts {
            if cancel.is_cancelled() {
                self.logger
                    .info(&format!("Ping cancelled before attempt {}", attempt))
                    .field("completed", results.len())
                    .log()
                    .await;
                break;
            }

            let result = self.runner.run_with_retry(target, config).await;
            self.logger
                .debug(&format!("Attempt {}/{} finished", attempt, attempts))
                .probe_result(&result)
                .log()
                .await;

            progress.on_attempt(attempt, &result);
            results.push(result);

            if attempt < attempts {
                tokio::select! {
                    _ = tokio::time::sleep(config.interval()) => {}
                    _ = cancel.cancelled() => {}
                }
            }
        }

        let succeeded = results.iter().filter(|r| r.is_success()).count();
        self.logger
            .end_operation(&correlation_id, "ping", succeeded == results.len())
            .await;

        results
    }
}

#[cfg(test)]
mod tests {
    use super::retry::test_support::{ScriptedStrategy, Step};
    use super::*;
    use crate::types::ErrorKind;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn orchestrator(strategy: Arc<ScriptedStrategy>) -> PingOrchestrator {
        let logger = Logger::silent("TEST");
        PingOrchestrator::new(RetryingProbeRunner::new(strategy, logger.clone()), logger)
    }

    fn config(attempts: u32) -> ProbeConfig {
        ProbeConfig::new()
            .with_attempts(attempts)
            .with_interval(Duration::from_secs(1))
            .with_retries(0)
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_count_matches_attempts() {
        let strategy = Arc::new(ScriptedStrategy::always(Step::Ok(10)));
        let results = orchestrator(strategy)
            .ping(&ProbeTarget::new("h"), &config(4), NoProgress, &CancellationToken::new())
            .await;

        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.is_success()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_fail_fast_and_ordered_progress() {
        let strategy = Arc::new(ScriptedStrategy::new(vec![
            Step::Fail(ErrorKind::Timeout),
            Step::Ok(20),
            Step::Fail(ErrorKind::Other),
        ]));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);

        let results = orchestrator(strategy)
            .ping(
                &ProbeTarget::new("h"),
                &config(3),
                move |attempt: u32, result: &ProbeResult| {
                    sink_seen.lock().unwrap().push((attempt, result.is_success()));
                },
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(results.len(), 3);
        assert_eq!(*seen.lock().unwrap(), vec![(1, false), (2, true), (3, false)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_only_between_attempts() {
        let strategy = Arc::new(ScriptedStrategy::always(Step::Ok(1)));
        let started = tokio::time::Instant::now();

        orchestrator(strategy)
            .ping(&ProbeTarget::new("h"), &config(3), NoProgress, &CancellationToken::new())
            .await;

        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_start_returns_empty() {
        let strategy = Arc::new(ScriptedStrategy::always(Step::Ok(1)));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let results = orchestrator(strategy.clone())
            .ping(&ProbeTarget::new("h"), &config(5), NoProgress, &cancel)
            .await;

        assert!(results.is_empty());
        assert_eq!(strategy.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_attempt_count_does_not_reserve_up_front() {
        let strategy = Arc::new(ScriptedStrategy::always(Step::Ok(1)));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let config = ProbeConfig::new().with_attempts(u32::MAX);

        let results = orchestrator(strategy.clone())
            .ping(&ProbeTarget::new("h"), &config, NoProgress, &cancel)
            .await;

        assert!(results.is_empty());
        assert_eq!(strategy.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_wait_keeps_partial_results() {
        let strategy = Arc::new(ScriptedStrategy::always(Step::Ok(1)));
        let cancel = CancellationToken::new();
        let sink_cancel = cancel.clone();

        let results = orchestrator(strategy.clone())
            .ping(
                &ProbeTarget::new("h"),
                &config(10),
                move |attempt: u32, _result: &ProbeResult| {
                    if attempt == 2 {
                        sink_cancel.cancel();
                    }
                },
                &cancel,
            )
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(strategy.calls(), 2);
    }
}

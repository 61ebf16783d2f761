//! Statistics over the results of a ping session

use crate::models::{ProbeResult, Statistics};
use std::collections::BTreeMap;

/// Reduces a result list to a [`Statistics`] summary
///
/// Pure and stateless; an empty list yields the zeroed summary.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatisticsAnalyzer;

impl StatisticsAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, results: &[ProbeResult]) -> Statistics {
        analyze(results)
    }
}

/// Summarise `results`: counts, loss rate, latency range and failure histogram
pub fn analyze(results: &[ProbeResult]) -> Statistics {
    if results.is_empty() {
        return Statistics::default();
    }

    let total = results.len();
    let latencies: Vec<u64> = results.iter().filter_map(ProbeResult::latency_millis).collect();
    let success_count = results.iter().filter(|r| r.is_success()).count();
    let failed_count = total - success_count;

    let mut error_kind_histogram = BTreeMap::new();
    for kind in results.iter().filter(|r| !r.is_success()).filter_map(ProbeResult::error_kind) {
        *error_kind_histogram.entry(kind).or_insert(0) += 1;
    }

    let avg_latency_ms = if latencies.is_empty() {
        None
    } else {
        let sum: u128 = latencies.iter().map(|&ms| u128::from(ms)).sum();
        Some(round1(sum as f64 / latencies.len() as f64))
    };

    Statistics {
        total,
        success_count,
        failed_count,
        loss_rate_percent: round1(failed_count as f64 / total as f64 * 100.0),
        min_latency_ms: latencies.iter().copied().min(),
        max_latency_ms: latencies.iter().copied().max(),
        avg_latency_ms,
        error_kind_histogram,
    }
}

/// Round half away from zero to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

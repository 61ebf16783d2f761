//! Aggregate statistics over a ping session

use crate::types::ErrorKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary of a list of probe results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Number of results summarised
    pub total: usize,
    pub success_count: usize,
    pub failed_count: usize,
    /// Share of failed results, 0.0..=100.0, one decimal
    pub loss_rate_percent: f64,
    /// Latency aggregates over successful results only
    pub min_latency_ms: Option<u64>,
    pub max_latency_ms: Option<u64>,
    /// One decimal
    pub avg_latency_ms: Option<f64>,
    /// Failure count per kind; kinds that never occurred are absent
    pub error_kind_histogram: BTreeMap<ErrorKind, usize>,
}

impl Statistics {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Share of successful results, one decimal
    pub fn success_rate_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            ((100.0 - self.loss_rate_percent) * 10.0).round() / 10.0
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.total > 0 && self.failed_count == 0
    }

    /// Most frequent failure kind; ties go to the kind declared first
    pub fn dominant_error_kind(&self) -> Option<ErrorKind> {
        let mut dominant: Option<(ErrorKind, usize)> = None;
        for (&kind, &count) in &self.error_kind_histogram {
            if dominant.map_or(true, |(_, best)| count > best) {
                dominant = Some((kind, count));
            }
        }
        dominant.map(|(kind, _)| kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate_complements_loss() {
        let stats = Statistics {
            total: 3,
            success_count: 2,
            failed_count: 1,
            loss_rate_percent: 33.3,
            ..Default::default()
        };
        assert_eq!(stats.success_rate_percent(), 66.7);
        assert!(!stats.all_succeeded());
        assert_eq!(Statistics::default().success_rate_percent(), 0.0);
    }

    #[test]
    fn test_dominant_error_kind() {
        let mut histogram = BTreeMap::new();
        histogram.insert(ErrorKind::Other, 2);
        histogram.insert(ErrorKind::Timeout, 2);
        histogram.insert(ErrorKind::HostNotFound, 1);

        let stats = Statistics {
            error_kind_histogram: histogram,
            ..Default::default()
        };
        assert_eq!(stats.dominant_error_kind(), Some(ErrorKind::Timeout));
        assert_eq!(Statistics::default().dominant_error_kind(), None);
    }

    #[test]
    fn test_histogram_serializes_with_kind_names() {
        let mut stats = Statistics::default();
        stats.error_kind_histogram.insert(ErrorKind::NetworkUnreachable, 3);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["error_kind_histogram"]["networkUnreachable"], 3);
    }
}

//! Check Recorder - append-only log of predictions
//!
//! The engine writes through [`CheckRecorder`] on a best-effort basis;
//! the read side exposes one aggregation used for summary statistics.

pub mod memory;

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::PredictionResult;

pub use memory::MemoryRecorder;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Persisted form of a prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRecord {
    #[serde(flatten)]
    pub result: PredictionResult,
    /// Raw vector keyed by schema name
    pub features: BTreeMap<String, f64>,
}

/// Summary over every recorded check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckStats {
    pub total_checks: i64,
    pub phishing_detected: i64,
    pub legitimate: i64,
    pub recent_24h: i64,
    pub phishing_rate: f64,
}

impl CheckStats {
    pub fn from_counts(total: i64, phishing: i64, legitimate: i64, recent: i64) -> Self {
        Self {
            total_checks: total,
            phishing_detected: phishing,
            legitimate,
            recent_24h: recent,
            phishing_rate: phishing_rate(phishing, total),
        }
    }
}

/// Percentage of phishing checks, two decimals; 0 when nothing was checked
pub fn phishing_rate(phishing: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    round2(phishing as f64 / total as f64 * 100.0)
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ============================================================================
// RECORDER TRAIT
// ============================================================================

#[async_trait]
pub trait CheckRecorder: Send + Sync {
    /// Append one check
    async fn record(&self, record: &CheckRecord) -> Result<(), RecorderError>;

    /// Counts over all checks; `recent_24h` covers the trailing `window`
    async fn aggregate(&self, window: Duration) -> Result<CheckStats, RecorderError>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_with_no_checks() {
        assert_eq!(phishing_rate(0, 0), 0.0);
        assert_eq!(CheckStats::from_counts(0, 0, 0, 0).phishing_rate, 0.0);
    }

    #[test]
    fn test_rate_rounding() {
        assert_eq!(phishing_rate(1, 3), 33.33);
        assert_eq!(phishing_rate(2, 3), 66.67);
        assert_eq!(phishing_rate(5, 5), 100.0);
        assert_eq!(phishing_rate(0, 7), 0.0);
    }

    #[test]
    fn test_stats_from_counts() {
        let stats = CheckStats::from_counts(8, 2, 6, 3);
        assert_eq!(stats.total_checks, 8);
        assert_eq!(stats.phishing_detected, 2);
        assert_eq!(stats.legitimate, 6);
        assert_eq!(stats.recent_24h, 3);
        assert_eq!(stats.phishing_rate, 25.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(80.0), 80.0);
        assert_eq!(round2(12.345_6), 12.35);
        assert_eq!(round2(0.004), 0.0);
    }
}

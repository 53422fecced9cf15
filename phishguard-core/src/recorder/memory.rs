//! In-memory recorder, for tests and local runs without a database

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use super::{CheckRecord, CheckRecorder, CheckStats, RecorderError};
use crate::constants::{LABEL_LEGITIMATE, LABEL_PHISHING};

#[derive(Debug, Default)]
pub struct MemoryRecorder {
    records: RwLock<Vec<CheckRecord>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn snapshot(&self) -> Vec<CheckRecord> {
        self.records.read().clone()
    }
}

#[async_trait]
impl CheckRecorder for MemoryRecorder {
    async fn record(&self, record: &CheckRecord) -> Result<(), RecorderError> {
        self.records.write().push(record.clone());
        Ok(())
    }

    async fn aggregate(&self, window: Duration) -> Result<CheckStats, RecorderError> {
        let window = chrono::Duration::from_std(window)
            .map_err(|e| RecorderError::Storage(format!("invalid window: {}", e)))?;
        let since = Utc::now() - window;

        let records = self.records.read();
        let count = |label: &str| {
            records
                .iter()
                .filter(|r| r.result.prediction == label)
                .count() as i64
        };
        let recent = records
            .iter()
            .filter(|r| r.result.checked_at >= since)
            .count() as i64;

        Ok(CheckStats::from_counts(
            records.len() as i64,
            count(LABEL_PHISHING),
            count(LABEL_LEGITIMATE),
            recent,
        ))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

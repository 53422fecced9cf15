//! URL check model

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Row};
use uuid::Uuid;

use phishguard_core::constants::{LABEL_LEGITIMATE, LABEL_PHISHING};
use phishguard_core::recorder::{CheckRecord, CheckStats, RecorderError};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UrlCheck {
    pub id: Uuid,
    pub url: String,
    pub prediction: String,
    pub confidence: Option<f64>,
    pub phishing_probability: Option<f64>,
    pub signals: serde_json::Value,
    pub features: serde_json::Value,
    pub user_id: String,
    pub checked_at: DateTime<Utc>,
}

impl UrlCheck {
    /// Row form of a recorded prediction, with a fresh id
    pub fn from_record(record: &CheckRecord) -> Result<Self, RecorderError> {
        let result = &record.result;
        Ok(Self {
            id: Uuid::new_v4(),
            url: result.url.clone(),
            prediction: result.prediction.clone(),
            confidence: result.confidence,
            phishing_probability: result.phishing_probability,
            signals: serde_json::to_value(&result.signals)?,
            features: serde_json::to_value(&record.features)?,
            user_id: result.user.clone(),
            checked_at: result.checked_at,
        })
    }

    pub async fn insert(&self, pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO url_checks (id, url, prediction, confidence, phishing_probability, signals, features, user_id, checked_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#
        )
        .bind(self.id)
        .bind(&self.url)
        .bind(&self.prediction)
        .bind(self.confidence)
        .bind(self.phishing_probability)
        .bind(&self.signals)
        .bind(&self.features)
        .bind(&self.user_id)
        .bind(self.checked_at)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Totals over the whole table, `recent` over the trailing window
    pub async fn stats(pool: &PgPool, window: chrono::Duration) -> Result<CheckStats, sqlx::Error> {
        let since = Utc::now() - window;

        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) as total,
                COUNT(*) FILTER (WHERE prediction = $1) as phishing,
                COUNT(*) FILTER (WHERE prediction = $2) as legitimate,
                COUNT(*) FILTER (WHERE checked_at >= $3) as recent
            FROM url_checks
            "#
        )
        .bind(LABEL_PHISHING)
        .bind(LABEL_LEGITIMATE)
        .bind(since)
        .fetch_one(pool)
        .await?;

        Ok(CheckStats::from_counts(
            row.get("total"),
            row.get("phishing"),
            row.get("legitimate"),
            row.get("recent"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phishguard_core::PredictionResult;
    use std::collections::BTreeMap;

    #[test]
    fn test_row_from_record() {
        let mut features = BTreeMap::new();
        features.insert("having_IP_Address".to_string(), 1.0);
        features.insert("DNSRecord".to_string(), -1.0);

        let record = CheckRecord {
            result: PredictionResult {
                url: "http://198.51.100.7/login".to_string(),
                prediction: "phishing".to_string(),
                confidence: Some(91.5),
                phishing_probability: Some(91.5),
                signals: vec!["having_IP_Address".to_string()],
                checked_at: Utc::now(),
                user: "anonymous".to_string(),
            },
            features,
        };

        let row = UrlCheck::from_record(&record).unwrap();
        assert_eq!(row.url, record.result.url);
        assert_eq!(row.user_id, "anonymous");
        assert_eq!(row.signals, serde_json::json!(["having_IP_Address"]));
        assert_eq!(row.features["having_IP_Address"], serde_json::json!(1.0));
        assert_eq!(row.features["DNSRecord"], serde_json::json!(-1.0));
        assert_eq!(row.checked_at, record.result.checked_at);
    }
}

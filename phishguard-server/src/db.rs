//! Database module - PostgreSQL connection, migrations and the check recorder

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

use phishguard_core::recorder::{CheckRecord, CheckRecorder, CheckStats, RecorderError};

use crate::models::UrlCheck;

/// Give up on the database after this long at startup
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Create database connection pool
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(CONNECT_TIMEOUT)
        .connect(database_url)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA_SQL)
        .execute(pool)
        .await?;

    tracing::info!("Database schema applied successfully");
    Ok(())
}

/// Connect and migrate; `None` disables persistence for the process
pub async fn connect(database_url: &str) -> Option<PgPool> {
    let pool = match create_pool(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!("Database connection failed, persistence disabled: {}", e);
            return None;
        }
    };

    if let Err(e) = run_migrations(&pool).await {
        tracing::warn!("Database migrations failed, persistence disabled: {}", e);
        return None;
    }

    Some(pool)
}

/// Database schema SQL
const SCHEMA_SQL: &str = r#"
-- URL checks (one row per completed prediction)
CREATE TABLE IF NOT EXISTS url_checks (
    id UUID PRIMARY KEY,
    url TEXT NOT NULL,
    prediction VARCHAR(20) NOT NULL,
    confidence DOUBLE PRECISION,
    phishing_probability DOUBLE PRECISION,
    signals JSONB NOT NULL DEFAULT '[]',
    features JSONB NOT NULL DEFAULT '{}',
    user_id VARCHAR(255) NOT NULL DEFAULT 'anonymous',
    checked_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_url_checks_checked_at ON url_checks(checked_at);
CREATE INDEX IF NOT EXISTS idx_url_checks_prediction ON url_checks(prediction);
"#;

// ============================================================================
// POSTGRES RECORDER
// ============================================================================

/// [`CheckRecorder`] backed by the `url_checks` table
#[derive(Debug, Clone)]
pub struct PgCheckRecorder {
    pool: PgPool,
}

impl PgCheckRecorder {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn storage(err: sqlx::Error) -> RecorderError {
    RecorderError::Storage(err.to_string())
}

#[async_trait]
impl CheckRecorder for PgCheckRecorder {
    async fn record(&self, record: &CheckRecord) -> Result<(), RecorderError> {
        let check = UrlCheck::from_record(record)?;
        check.insert(&self.pool).await.map_err(storage)?;
        tracing::debug!("Recorded check {} for {}", check.id, check.url);
        Ok(())
    }

    async fn aggregate(&self, window: Duration) -> Result<CheckStats, RecorderError> {
        let window = chrono::Duration::from_std(window)
            .map_err(|e| RecorderError::Storage(format!("invalid window: {}", e)))?;
        UrlCheck::stats(&self.pool, window).await.map_err(storage)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

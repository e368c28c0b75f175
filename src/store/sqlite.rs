use std::time::Duration;

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use super::{now_millis, CsrfRecord, CsrfTokenStore, RateCounterStore, StoreError};

/// Durable counter store for multi-instance deployments.
///
/// One row per key holding the JSON-encoded stamp list. `expires_at` is a
/// backstop honored on read and swept by the periodic cleanup; the window
/// filter in the limiter remains the source of truth.
#[derive(Clone)]
pub struct SqliteCounterStore {
    pool: SqlitePool,
}

impl SqliteCounterStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RateCounterStore for SqliteCounterStore {
    async fn get(&self, key: &str) -> Result<Vec<i64>, StoreError> {
        let row = sqlx::query("SELECT stamps, expires_at FROM rate_counters WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => {
                if r.get::<i64, _>("expires_at") <= now_millis() {
                    return Ok(Vec::new());
                }
                let stamps: Vec<i64> = serde_json::from_str(&r.get::<String, _>("stamps"))?;
                Ok(stamps)
            }
            None => Ok(Vec::new()),
        }
    }

    async fn set(&self, key: &str, stamps: &[i64], ttl: Duration) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(stamps)?;
        let expires_at = now_millis() + ttl.as_millis() as i64;
        sqlx::query(
            r#"INSERT INTO rate_counters (key, stamps, expires_at) VALUES (?1, ?2, ?3)
               ON CONFLICT(key) DO UPDATE SET stamps = excluded.stamps, expires_at = excluded.expires_at"#,
        )
        .bind(key)
        .bind(encoded)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn cleanup(&self) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM rate_counters WHERE expires_at <= ?1")
            .bind(now_millis())
            .execute(&self.pool)
            .await?;
        if res.rows_affected() > 0 {
            tracing::debug!("Swept {} expired rate counter rows", res.rows_affected());
        }
        Ok(())
    }
}

/// CSRF token store backed by the application database.
#[derive(Clone)]
pub struct SqliteCsrfStore {
    pool: SqlitePool,
}

impl SqliteCsrfStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CsrfTokenStore for SqliteCsrfStore {
    async fn find(&self, subject_id: &str) -> Result<Option<CsrfRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT subject_id, token, created_at, updated_at FROM csrf_tokens WHERE subject_id = ?1",
        )
        .bind(subject_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| CsrfRecord {
            subject_id: r.get::<String, _>("subject_id"),
            token: r.get::<String, _>("token"),
            created_at: r.get::<i64, _>("created_at"),
            updated_at: r.get::<i64, _>("updated_at"),
        }))
    }

    async fn upsert(&self, subject_id: &str, token: &str) -> Result<CsrfRecord, StoreError> {
        let now = now_millis();
        sqlx::query(
            r#"INSERT INTO csrf_tokens (subject_id, token, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?3)
               ON CONFLICT(subject_id) DO UPDATE SET token = excluded.token, updated_at = excluded.updated_at"#,
        )
        .bind(subject_id)
        .bind(token)
        .bind(now)
        .execute(&self.pool)
        .await?;

        // Re-read so `created_at` reflects the first issuance on updates.
        self.find(subject_id).await?.ok_or_else(|| {
            StoreError::Other(format!("csrf record for '{}' vanished after upsert", subject_id))
        })
    }
}

//! Pluggable stores behind the access-control middleware.
//!
//! The CSRF guard and the rate limiter never talk to a concrete backend;
//! they go through the traits defined here. Which implementation is wired
//! in is decided once, at startup, from configuration (see
//! [`crate::state::AppState::new`]).

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by store implementations.
///
/// How a failure is treated is the caller's decision: the CSRF guard
/// swallows read errors (fail closed), the rate limiter swallows every
/// error (fail open), and CSRF writes propagate it (fail loud).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("{0}")]
    Other(String),
}

/// The anti-forgery token currently issued to one subject.
///
/// One record per subject, overwritten (never duplicated) on reissue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfRecord {
    pub subject_id: String,
    pub token: String,
    /// Unix millis of first issuance.
    pub created_at: i64,
    /// Unix millis of the latest (re)issuance.
    pub updated_at: i64,
}

/// Storage for per-subject CSRF tokens.
#[async_trait]
pub trait CsrfTokenStore: Send + Sync {
    /// Looks up the record for a subject, if any.
    async fn find(&self, subject_id: &str) -> Result<Option<CsrfRecord>, StoreError>;

    /// Creates the record for a subject, or overwrites its token and
    /// `updated_at` if one exists. Keyed by subject; never duplicates.
    async fn upsert(&self, subject_id: &str, token: &str) -> Result<CsrfRecord, StoreError>;
}

/// Storage for sliding-window attempt timestamps, keyed by
/// `"{address}:{operation}"`.
#[async_trait]
pub trait RateCounterStore: Send + Sync {
    /// Returns the recorded attempt stamps for a key (empty if none).
    async fn get(&self, key: &str) -> Result<Vec<i64>, StoreError>;

    /// Replaces the stamps for a key. `ttl` is a backstop for durable
    /// backends; the window filter on read is what actually bounds the data.
    async fn set(&self, key: &str, stamps: &[i64], ttl: Duration) -> Result<(), StoreError>;

    /// Drops entries the window filter would discard anyway. Driven by a
    /// periodic task; never changes admission decisions.
    async fn cleanup(&self) -> Result<(), StoreError>;
}

/// Current time as Unix milliseconds, the stamp format shared by all
/// counter stores.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

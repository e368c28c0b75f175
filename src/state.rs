use std::{sync::Arc, time::Duration};

use crate::auth::password::PasswordHasher;
use crate::config::AppConfig;
use crate::metrics::Metrics;
use crate::middleware::RateLimiter;
use crate::store::{
    memory::MemoryCounterStore,
    sqlite::{SqliteCounterStore, SqliteCsrfStore},
    CsrfTokenStore, RateCounterStore,
};

/// The shared application state.
///
/// Holds everything handlers and middleware need across requests. Cloning
/// is cheap; all fields are handles.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool.
    pub db: sqlx::SqlitePool,
    /// The application configuration.
    pub config: Arc<AppConfig>,
    /// The operational counters.
    pub metrics: Metrics,
    /// The rate limiter guarding the API operations.
    pub rate_limiter: RateLimiter,
    /// The counter store behind the limiter, kept for the periodic
    /// cleanup task in `main`.
    pub counter_store: Arc<dyn RateCounterStore>,
    /// The per-subject CSRF token store.
    pub csrf: Arc<dyn CsrfTokenStore>,
    /// The password hasher used by signup and login.
    pub hasher: PasswordHasher,
}

impl AppState {
    /// Creates a new `AppState` with initialized components.
    ///
    /// The rate-counter store is selected here, once, from the
    /// `rate_limit.shared_store` flag: the process-local map for a single
    /// instance, the SQLite-backed store when several instances must see
    /// the same window. The limiter itself only ever sees the trait.
    pub fn new(db: sqlx::SqlitePool, config: AppConfig) -> anyhow::Result<Self> {
        let window = Duration::from_secs(config.rate_limit.window_seconds);
        let counter_store: Arc<dyn RateCounterStore> = if config.rate_limit.shared_store {
            Arc::new(SqliteCounterStore::new(db.clone()))
        } else {
            Arc::new(MemoryCounterStore::new(window))
        };
        let rate_limiter = RateLimiter::from_config(&config.rate_limit, counter_store.clone());
        let csrf: Arc<dyn CsrfTokenStore> = Arc::new(SqliteCsrfStore::new(db.clone()));
        let hasher = PasswordHasher::with_params(
            config.auth.argon2_memory_kib,
            config.auth.argon2_iterations,
            config.auth.argon2_parallelism,
        )?;

        Ok(Self {
            db,
            config: Arc::new(config),
            metrics: Metrics::new(),
            rate_limiter,
            counter_store,
            csrf,
            hasher,
        })
    }
}

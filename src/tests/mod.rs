//! Integration and unit tests for the BankWacht application.
//!
//! ## Test Modules
//!
//! - **api_tests**: End-to-end tests for the guarded API (auth chain,
//!   CSRF flow, rate limiting)
//! - **store_tests**: SQLite-backed CSRF and rate-counter store tests
//! - **health_api_tests**: Health check endpoint tests
//! - **config_tests**: Configuration loading and validation tests
//! - **error_tests**: Error mapping and validation helper tests

pub mod config_tests;
pub mod error_tests;
pub mod health_api_tests;

use std::collections::HashMap;

use sqlx::sqlite::SqlitePoolOptions;

use crate::config::{
    AppConfig, AuthConfig, DatabaseConfig, RateLimitConfig, SecurityConfig, ServerConfig,
};
use crate::state::AppState;

/// A config mirroring the development profile, with cheap Argon2
/// parameters so the tests stay fast.
pub fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig { host: "127.0.0.1".to_string(), port: 8085 },
        database: DatabaseConfig { url: "sqlite::memory:".to_string() },
        auth: AuthConfig {
            jwt_secret: "integration-test-secret".to_string(),
            token_ttl_seconds: 3600,
            argon2_memory_kib: 8,
            argon2_iterations: 1,
            argon2_parallelism: 1,
        },
        rate_limit: RateLimitConfig {
            shared_store: false,
            window_seconds: 60,
            default_max: 1000,
            cleanup_interval_seconds: 300,
            operations: HashMap::from([
                ("login".to_string(), 100),
                ("signup".to_string(), 50),
                ("profile_update".to_string(), 300),
            ]),
        },
        security: Some(SecurityConfig::default()),
    }
}

/// Fresh state over an in-memory database.
pub async fn test_state() -> AppState {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    crate::db::init_db(&pool).await.unwrap();
    AppState::new(pool, test_config()).unwrap()
}

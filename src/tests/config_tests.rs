use uuid::Uuid;

use super::test_config;
use crate::config::{self, AppConfig};

#[test]
fn default_config_is_the_dev_profile() {
    let cfg = AppConfig::default();

    assert_eq!(cfg.server.host, "127.0.0.1");
    assert_eq!(cfg.server.port, 8085);
    assert_eq!(cfg.database.url, "sqlite://data/bankwacht.db");

    // Development profile: process-local counters, generous limits.
    assert!(!cfg.rate_limit.shared_store);
    assert_eq!(cfg.rate_limit.window_seconds, 60);
    assert_eq!(cfg.rate_limit.default_max, 1000);
    assert_eq!(cfg.rate_limit.operations.get("login"), Some(&100));
    assert_eq!(cfg.rate_limit.operations.get("signup"), Some(&50));
    assert_eq!(cfg.rate_limit.operations.get("profile_update"), Some(&300));

    assert!(cfg.auth.jwt_secret.len() >= 16);
    assert!(cfg.auth.token_ttl_seconds > 0);
}

#[test]
fn valid_config_passes_validation() {
    assert!(config::validate(&AppConfig::default()).is_ok());
    assert!(config::validate(&test_config()).is_ok());
}

#[test]
fn validation_rejects_bad_values() {
    let mut cfg = test_config();
    cfg.server.port = 0;
    assert!(config::validate(&cfg).is_err());

    let mut cfg = test_config();
    cfg.auth.jwt_secret = "short".to_string();
    assert!(config::validate(&cfg).is_err());

    let mut cfg = test_config();
    cfg.rate_limit.window_seconds = 0;
    assert!(config::validate(&cfg).is_err());

    let mut cfg = test_config();
    cfg.rate_limit.default_max = 0;
    assert!(config::validate(&cfg).is_err());

    let mut cfg = test_config();
    cfg.rate_limit.operations.insert("login".to_string(), 0);
    assert!(config::validate(&cfg).is_err());
}

#[test]
fn ensure_sqlite_parent_dir_creates_directories() {
    let base = std::env::temp_dir().join(format!("bankwacht_test_cfg_{}", Uuid::new_v4()));
    let db_path = base.join("nested").join("test.db");
    let url = format!("sqlite://{}", db_path.to_string_lossy());

    // Cleanup just in case
    let _ = std::fs::remove_dir_all(&base);
    assert!(!db_path.parent().unwrap().exists());

    config::ensure_sqlite_parent_dir(&url).unwrap();
    assert!(db_path.parent().unwrap().exists());

    let _ = std::fs::remove_dir_all(&base);
}

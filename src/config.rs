use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_seconds: u64,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    pub argon2_parallelism: u32,
}

/// Rate limiting profile. `shared_store = false` keeps counters in process
/// memory (single instance / development); `true` keeps them in the shared
/// SQLite store so several instances see the same window.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub shared_store: bool,
    pub window_seconds: u64,
    pub default_max: u32,
    pub cleanup_interval_seconds: u64,
    #[serde(default)]
    pub operations: HashMap<String, u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SecurityConfig {
    pub enable_hsts: Option<bool>,
    pub hsts_max_age: Option<u64>,
    pub hsts_include_subdomains: Option<bool>,
    pub csp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitConfig,
    pub security: Option<SecurityConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        // Fallback: parse the embedded default TOML
        let defaults: &str = include_str!("../config/default.toml");
        match ::config::Config::builder()
            .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
            .build()
        {
            Ok(cfg) => match cfg.try_deserialize() {
                Ok(app_cfg) => app_cfg,
                Err(e) => {
                    eprintln!("FATAL: Failed to deserialize default config: {}", e);
                    panic!("Failed to deserialize default config: {}", e);
                }
            },
            Err(e) => {
                eprintln!("FATAL: Failed to parse default config: {}", e);
                panic!("Failed to parse default config: {}", e);
            }
        }
    }
}

pub fn load() -> anyhow::Result<AppConfig> {
    // Load .env first (optional)
    let _ = dotenvy::dotenv();

    let defaults: &str = include_str!("../config/default.toml");
    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
        // Optional local file: bankwacht.toml (in CWD)
        .add_source(::config::File::with_name("bankwacht").required(false));

    if let Ok(custom_path) = std::env::var("BANKWACHT_CONFIG") {
        builder = builder.add_source(::config::File::with_name(&custom_path).required(false));
    }
    // Environment variables last to have highest precedence
    builder = builder.add_source(::config::Environment::with_prefix("BANKWACHT").separator("__"));

    let cfg = builder.build()?;
    let app_cfg: AppConfig = cfg.try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

pub(crate) fn validate(cfg: &AppConfig) -> anyhow::Result<()> {
    // Server
    if cfg.server.port == 0 {
        return Err(anyhow::anyhow!("invalid server.port: {}", cfg.server.port));
    }
    #[cfg(unix)]
    if cfg.server.port < 1024 {
        tracing::warn!("Using privileged port {} - may require elevated permissions", cfg.server.port);
    }

    // Auth
    if cfg.auth.jwt_secret.len() < 16 {
        return Err(anyhow::anyhow!("auth.jwt_secret must be at least 16 characters"));
    }
    if cfg.auth.token_ttl_seconds == 0 {
        return Err(anyhow::anyhow!("auth.token_ttl_seconds must be > 0"));
    }
    if cfg.auth.argon2_memory_kib < 8 {
        return Err(anyhow::anyhow!("auth.argon2_memory_kib must be >= 8"));
    }
    if cfg.auth.argon2_iterations == 0 || cfg.auth.argon2_parallelism == 0 {
        return Err(anyhow::anyhow!("auth.argon2_iterations and auth.argon2_parallelism must be > 0"));
    }

    // Rate limiting
    if cfg.rate_limit.window_seconds == 0 {
        return Err(anyhow::anyhow!("rate_limit.window_seconds must be > 0"));
    }
    if cfg.rate_limit.default_max == 0 {
        return Err(anyhow::anyhow!("rate_limit.default_max must be > 0"));
    }
    if cfg.rate_limit.cleanup_interval_seconds == 0 {
        return Err(anyhow::anyhow!("rate_limit.cleanup_interval_seconds must be > 0"));
    }
    for (op, max) in &cfg.rate_limit.operations {
        if *max == 0 {
            return Err(anyhow::anyhow!("rate_limit.operations.{} must be > 0", op));
        }
    }

    Ok(())
}

pub fn ensure_sqlite_parent_dir(url: &str) -> anyhow::Result<()> {
    if let Some(path) = url.strip_prefix("sqlite://") {
        let p = Path::new(path);
        if let Some(parent) = p.parent() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

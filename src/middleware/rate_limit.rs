use axum::{
    extract::{connect_info::ConnectInfo, Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::Duration,
};

use super::ip::client_addr;
use crate::config::RateLimitConfig;
use crate::error::AppError;
use crate::state::AppState;
use crate::store::{now_millis, RateCounterStore, StoreError};

/// Outcome of an admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Blocked {
        /// How long the caller should wait before retrying.
        retry_after: Duration,
    },
}

/// Sliding-window rate limiter over a pluggable counter store.
///
/// Each (address, operation) key maps to the timestamps of its recent
/// attempts. On every check the stored stamps are filtered to the
/// trailing window; stale entries are never deleted except through this
/// filter or the store's own expiry. Which store backs the limiter is
/// decided at construction (see [`crate::state::AppState::new`]), not by
/// environment branching in here.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateCounterStore>,
    window: Duration,
    default_max: u32,
    operation_max: HashMap<String, u32>,
    // Serializes each admission's read-modify-write within this process.
    // Instances sharing the durable store still race across processes;
    // the window is best-effort there.
    gate: Arc<tokio::sync::Mutex<()>>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateCounterStore>, window: Duration, default_max: u32) -> Self {
        Self {
            store,
            window,
            default_max,
            operation_max: HashMap::new(),
            gate: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Adds or replaces per-operation maximums.
    pub fn with_limits(mut self, limits: impl IntoIterator<Item = (String, u32)>) -> Self {
        self.operation_max.extend(limits);
        self
    }

    pub fn from_config(cfg: &RateLimitConfig, store: Arc<dyn RateCounterStore>) -> Self {
        Self::new(store, Duration::from_secs(cfg.window_seconds), cfg.default_max)
            .with_limits(cfg.operations.clone())
    }

    /// The maximum for an operation, falling back to the default for
    /// unrecognized kinds.
    pub fn max_for(&self, operation: &str) -> u32 {
        self.operation_max.get(operation).copied().unwrap_or(self.default_max)
    }

    /// Checks whether one more `operation` attempt from `addr` fits into
    /// the current window, recording it if so.
    ///
    /// Fail-open contract: a broken limiter must never take the service
    /// down with it. Any error while computing admission is logged and
    /// the request is admitted unthrottled. This is deliberately the
    /// opposite of the CSRF guard's fail-closed reads.
    pub async fn admit(&self, addr: IpAddr, operation: &str) -> RateDecision {
        match self.try_admit(addr, operation).await {
            Ok(decision) => decision,
            Err(e) => {
                tracing::error!(
                    "Rate limiter degraded ({}:{}), admitting request: {}",
                    addr,
                    operation,
                    e
                );
                RateDecision::Allowed
            }
        }
    }

    async fn try_admit(&self, addr: IpAddr, operation: &str) -> Result<RateDecision, StoreError> {
        let _guard = self.gate.lock().await;
        let now = now_millis();
        let window_ms = self.window.as_millis() as i64;
        let key = format!("{}:{}", addr, operation);

        let stamps = self.store.get(&key).await?;
        let cutoff = now - window_ms;
        let mut recent: Vec<i64> = stamps.into_iter().filter(|&t| t > cutoff).collect();

        if recent.len() >= self.max_for(operation) as usize {
            // The window frees up when the oldest recorded attempt ages out.
            let oldest = recent.iter().copied().min().unwrap_or(now);
            let retry_ms = (oldest + window_ms - now).max(0) as u64;
            return Ok(RateDecision::Blocked { retry_after: Duration::from_millis(retry_ms) });
        }

        recent.push(now);
        // TTL equal to the window: a backstop for the durable store, the
        // read-side filter stays authoritative.
        self.store.set(&key, &recent, self.window).await?;
        Ok(RateDecision::Allowed)
    }
}

/// Axum middleware enforcing the limiter on every request it wraps.
///
/// The operation kind is derived from method and path; kinds without a
/// configured maximum share the default one.
pub async fn rate_limit_middleware(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let transport = req.extensions().get::<ConnectInfo<SocketAddr>>().map(|info| info.0.ip());
    let addr = client_addr(req.headers(), transport);
    let operation = operation_kind(req.method(), req.uri().path());

    match state.rate_limiter.admit(addr, operation).await {
        RateDecision::Allowed => next.run(req).await,
        RateDecision::Blocked { retry_after } => {
            state.metrics.inc_rate_limited();
            let retry_after_seconds = retry_after.as_secs().max(1);
            tracing::info!("Rate limited {} for '{}', retry in {}s", addr, operation, retry_after_seconds);
            AppError::RateLimited { retry_after_seconds }.into_response()
        }
    }
}

/// Maps a route to the operation kind counted against its quota.
pub fn operation_kind(method: &Method, path: &str) -> &'static str {
    match (method.as_str(), path) {
        ("POST", "/auth/login") => "login",
        ("POST", "/auth/signup") => "signup",
        ("POST", "/auth/csrf") => "csrf_issue",
        ("PUT", "/users/me") => "profile_update",
        _ => "default",
    }
}

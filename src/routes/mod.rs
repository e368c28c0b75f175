//! HTTP route handlers for the BankWacht API.
//!
//! Each sub-module handles a specific domain of functionality:
//!
//! - `auth`: signup, login, and CSRF token issuance
//! - `users`: profile endpoints for the authenticated subject
//! - `accounts`: account and transaction listings
//! - `health`: health check and system status endpoints

pub mod accounts;
pub mod auth;
pub mod health;
pub mod users;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::middleware;
use crate::state::AppState;

/// Builds the API router with the access-control chain wired in.
///
/// Protected routes run, in order: bearer-token verification, the CSRF
/// guard (mutating methods only), then rate limiting - a request that
/// fails one stage never reaches the next. The public auth endpoints are
/// rate-limited by operation kind but need no credential.
pub fn api_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/metrics", get(health::metrics))
        .route("/metrics/prometheus", get(health::metrics_prometheus))
        .route("/version", get(health::version));

    let credentials = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .layer(from_fn_with_state(state.clone(), middleware::rate_limit::rate_limit_middleware));

    // Token issuance cannot demand the token it hands out: authenticated
    // and rate-limited, but outside the CSRF guard.
    let csrf_issue = Router::new()
        .route("/auth/csrf", post(auth::issue_csrf))
        .layer(from_fn_with_state(state.clone(), middleware::rate_limit::rate_limit_middleware))
        .layer(from_fn_with_state(state.clone(), middleware::auth::require_auth));

    // Layers run outermost-last: auth first, then CSRF, then the limiter.
    let protected = Router::new()
        .route("/users/me", get(users::me).put(users::update_me))
        .route("/accounts", get(accounts::list_accounts))
        .route("/accounts/{id}/transactions", get(accounts::list_transactions))
        .layer(from_fn_with_state(state.clone(), middleware::rate_limit::rate_limit_middleware))
        .layer(from_fn_with_state(state.clone(), middleware::csrf::csrf_guard))
        .layer(from_fn_with_state(state.clone(), middleware::auth::require_auth));

    Router::new()
        .merge(public)
        .merge(credentials)
        .merge(csrf_issue)
        .merge(protected)
        .with_state(state)
}

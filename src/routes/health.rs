use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

// Health check endpoint - lightweight, no store access
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

// Readiness probe: checks DB connectivity with timeout protection
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let query = sqlx::query("SELECT 1").fetch_one(&state.db);
    match tokio::time::timeout(std::time::Duration::from_secs(5), query).await {
        Ok(Ok(_)) => (StatusCode::OK, "ready").into_response(),
        Ok(Err(e)) => (StatusCode::SERVICE_UNAVAILABLE, format!("not ready: {}", e)).into_response(),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "not ready: timeout").into_response(),
    }
}

// Metrics endpoint: returns JSON snapshot
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.metrics.get_snapshot();
    Json(snapshot)
}

// Prometheus-compatible text exposition format
pub async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    let m = state.metrics.get_snapshot();
    let body = format!(
        "# HELP bankwacht_signups Total signups\n# TYPE bankwacht_signups counter\nbankwacht_signups {}\n\
# HELP bankwacht_logins_succeeded Successful logins\n# TYPE bankwacht_logins_succeeded counter\nbankwacht_logins_succeeded {}\n\
# HELP bankwacht_logins_failed Failed logins\n# TYPE bankwacht_logins_failed counter\nbankwacht_logins_failed {}\n\
# HELP bankwacht_profile_updates Profile updates\n# TYPE bankwacht_profile_updates counter\nbankwacht_profile_updates {}\n\
# HELP bankwacht_auth_rejections Requests rejected by the token verifier\n# TYPE bankwacht_auth_rejections counter\nbankwacht_auth_rejections {}\n\
# HELP bankwacht_csrf_rejections Requests rejected by the CSRF guard\n# TYPE bankwacht_csrf_rejections counter\nbankwacht_csrf_rejections {}\n\
# HELP bankwacht_rate_limited Requests rejected by the rate limiter\n# TYPE bankwacht_rate_limited counter\nbankwacht_rate_limited {}\n\
# HELP bankwacht_uptime_seconds Uptime seconds\n# TYPE bankwacht_uptime_seconds gauge\nbankwacht_uptime_seconds {}\n",
        m.signups,
        m.logins_succeeded,
        m.logins_failed,
        m.profile_updates,
        m.auth_rejections,
        m.csrf_rejections,
        m.rate_limited,
        m.uptime_seconds,
    );
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

// Version/Build info endpoint (JSON)
pub async fn version() -> impl IntoResponse {
    let body = serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "package": {
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "authors": env!("CARGO_PKG_AUTHORS"),
            "license": env!("CARGO_PKG_LICENSE"),
        },
        "build": {
            "profile": if cfg!(debug_assertions) { "debug" } else { "release" },
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
        }
    });
    (StatusCode::OK, Json(body))
}

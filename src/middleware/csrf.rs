//! Cross-Site Request Forgery (CSRF) protection middleware.
//!
//! Double-submit check for state-changing requests: the token presented
//! in the `X-CSRF-Token` header must exactly match the one stored for the
//! authenticated subject. Tokens are issued at login and via
//! `POST /auth/csrf`; issuance overwrites the stored value, so only the
//! most recent token is ever accepted.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::store::CsrfTokenStore;
use crate::types::AuthContext;

pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// CSRF guard for state-changing operations.
///
/// Runs strictly after authentication; non-mutating methods pass through
/// untouched. Must never run before `require_auth` - without an
/// [`AuthContext`] every mutating request is rejected.
pub async fn csrf_guard(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if matches!(req.method().as_str(), "POST" | "PUT" | "DELETE" | "PATCH") {
        let ctx = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or(AppError::AuthHeaderMissing)?;
        let presented = req
            .headers()
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        if let Err(e) = check_csrf(state.csrf.as_ref(), &ctx.subject_id, presented.as_deref()).await
        {
            state.metrics.inc_csrf_rejections();
            return Err(e);
        }
    }
    Ok(next.run(req).await)
}

/// Compares the presented token against the stored one.
///
/// A store failure on this read path is swallowed and treated as "no
/// token stored", which rejects the request: the guard fails closed. The
/// comparison is exact string equality, no normalization.
pub async fn check_csrf(
    store: &dyn CsrfTokenStore,
    subject_id: &str,
    presented: Option<&str>,
) -> AppResult<()> {
    let presented = match presented {
        Some(token) if !token.is_empty() => token,
        _ => return Err(AppError::CsrfTokenMissing),
    };

    let stored = match store.find(subject_id).await {
        Ok(record) => record.map(|r| r.token),
        Err(e) => {
            tracing::warn!("CSRF store read failed for subject {}: {}", subject_id, e);
            None
        }
    };

    match stored {
        Some(token) if token == presented => Ok(()),
        _ => Err(AppError::CsrfTokenInvalid),
    }
}

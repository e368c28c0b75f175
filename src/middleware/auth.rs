use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::auth::jwt;
use crate::error::AppError;
use crate::state::AppState;
use crate::types::AuthContext;

const BEARER_PREFIX: &str = "Bearer ";

/// Middleware that verifies the bearer credential and attaches the caller
/// identity to the request.
///
/// Rejections are split three ways so clients can tell them apart: a
/// missing or non-Bearer `Authorization` header fails before any
/// verification is attempted; a bad signature or expired token fails
/// verification; a verified token without a usable subject fails the
/// payload check. On success an [`AuthContext`] is inserted into the
/// request extensions for the CSRF guard and the handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let raw = match req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
    {
        Some(token) => token,
        None => {
            state.metrics.inc_auth_rejections();
            return Err(AppError::AuthHeaderMissing);
        }
    };

    let claims = match jwt::decode_token(raw, &state.config.auth.jwt_secret) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!("Bearer token rejected: {}", e);
            state.metrics.inc_auth_rejections();
            return Err(AppError::TokenInvalid);
        }
    };

    if claims.sub.trim().is_empty() {
        state.metrics.inc_auth_rejections();
        return Err(AppError::TokenPayloadInvalid);
    }

    req.extensions_mut().insert(AuthContext { subject_id: claims.sub });
    Ok(next.run(req).await)
}

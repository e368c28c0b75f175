use axum::{extract::State, response::IntoResponse, Extension, Json};

use super::auth::fetch_user;
use crate::error::{validation, AppError, AppResult};
use crate::state::AppState;
use crate::types::{AuthContext, UpdateProfileRequest};

pub async fn me(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> AppResult<impl IntoResponse> {
    let user = fetch_user(&state, &ctx.subject_id).await?;
    Ok(Json(user))
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<impl IntoResponse> {
    if req.name.is_none() && req.email.is_none() {
        return Err(AppError::BadRequest("Nothing to update".to_string()));
    }

    if let Some(name) = req.name.as_deref() {
        validation::validate_display_name(name)?;
    }
    if let Some(email) = req.email.as_deref() {
        validation::validate_email(email)?;
        let taken = sqlx::query("SELECT id FROM users WHERE email = ?1 AND id != ?2")
            .bind(email)
            .bind(&ctx.subject_id)
            .fetch_optional(&state.db)
            .await?;
        if taken.is_some() {
            return Err(AppError::Conflict("A user with this email already exists".to_string()));
        }
    }

    let result = sqlx::query(
        r#"UPDATE users
           SET name = COALESCE(?1, name),
               email = COALESCE(?2, email),
               updated_at = strftime('%Y-%m-%dT%H:%M:%SZ','now')
           WHERE id = ?3"#,
    )
    .bind(req.name.as_deref().map(str::trim))
    .bind(req.email.as_deref())
    .bind(&ctx.subject_id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    state.metrics.inc_profile_updates();
    let user = fetch_user(&state, &ctx.subject_id).await?;
    Ok(Json(user))
}

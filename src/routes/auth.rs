use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use sqlx::Row;
use uuid::Uuid;

use crate::auth::jwt::{self, Claims};
use crate::error::{validation, AppError, AppResult};
use crate::state::AppState;
use crate::types::{
    AccountDto, AuthContext, CsrfTokenResponse, LoginRequest, LoginResponse, SignupRequest,
    SignupResponse, UserDto,
};

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> AppResult<impl IntoResponse> {
    validation::validate_email(&req.email)?;
    validation::validate_password(&req.password)?;
    validation::validate_display_name(&req.name)?;

    let existing = sqlx::query("SELECT id FROM users WHERE email = ?1")
        .bind(&req.email)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("A user with this email already exists".to_string()));
    }

    let password_hash = state
        .hasher
        .hash(&req.password)
        .map_err(|e| AppError::Internal(e.into()))?;

    let user_id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, email, name, password_hash) VALUES (?1, ?2, ?3, ?4)")
        .bind(user_id.to_string())
        .bind(&req.email)
        .bind(req.name.trim())
        .bind(&password_hash)
        .execute(&state.db)
        .await?;

    // Every new user gets a starter checking account.
    let account_id = Uuid::new_v4();
    let number = account_number(&account_id);
    sqlx::query("INSERT INTO accounts (id, user_id, number, kind) VALUES (?1, ?2, ?3, 'checking')")
        .bind(account_id.to_string())
        .bind(user_id.to_string())
        .bind(&number)
        .execute(&state.db)
        .await?;

    state.metrics.inc_signups();
    tracing::info!("New signup: {}", user_id);

    let user = fetch_user(&state, &user_id.to_string()).await?;
    let account_row = sqlx::query(
        "SELECT id, number, kind, balance_cents, created_at FROM accounts WHERE id = ?1",
    )
    .bind(account_id.to_string())
    .fetch_one(&state.db)
    .await?;
    let account = AccountDto {
        id: account_id,
        number: account_row.get::<String, _>("number"),
        kind: account_row.get::<String, _>("kind"),
        balance_cents: account_row.get::<i64, _>("balance_cents"),
        created_at: account_row.get::<Option<String>, _>("created_at"),
    };

    Ok((StatusCode::CREATED, Json(SignupResponse { user, account })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let row = sqlx::query(
        "SELECT id, email, name, password_hash, created_at, updated_at FROM users WHERE email = ?1",
    )
    .bind(&req.email)
    .fetch_optional(&state.db)
    .await?;

    let row = match row {
        Some(r) => r,
        None => {
            state.metrics.inc_logins_failed();
            return Err(AppError::InvalidCredentials);
        }
    };

    let password_hash = row.get::<String, _>("password_hash");
    let valid = state
        .hasher
        .verify(&req.password, &password_hash)
        .map_err(|e| AppError::Internal(e.into()))?;
    if !valid {
        state.metrics.inc_logins_failed();
        return Err(AppError::InvalidCredentials);
    }

    let user = user_from_row(&row)?;
    let claims = Claims::new(user.id.to_string(), state.config.auth.token_ttl_seconds);
    let token = jwt::encode_token(&claims, &state.config.auth.jwt_secret)
        .map_err(|e| AppError::Internal(e.into()))?;

    // Issue the anti-forgery token alongside the credential. A store
    // failure here propagates: without a stored token the client could
    // never pass the guard, so a 503 is the honest answer.
    let csrf_token = Uuid::new_v4().to_string();
    state.csrf.upsert(&user.id.to_string(), &csrf_token).await?;

    state.metrics.inc_logins_succeeded();
    Ok(Json(LoginResponse { token, csrf_token, user }))
}

/// (Re)issues the CSRF token for the authenticated subject, overwriting
/// any previous one.
pub async fn issue_csrf(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> AppResult<impl IntoResponse> {
    let csrf_token = Uuid::new_v4().to_string();
    state.csrf.upsert(&ctx.subject_id, &csrf_token).await?;
    Ok(Json(CsrfTokenResponse { csrf_token }))
}

pub(crate) async fn fetch_user(state: &AppState, user_id: &str) -> AppResult<UserDto> {
    let row = sqlx::query(
        "SELECT id, email, name, password_hash, created_at, updated_at FROM users WHERE id = ?1",
    )
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?;

    match row {
        Some(r) => user_from_row(&r),
        None => Err(AppError::NotFound("User not found".to_string())),
    }
}

pub(crate) fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> AppResult<UserDto> {
    let id = Uuid::parse_str(row.get::<String, _>("id").as_str())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("corrupt user id: {}", e)))?;
    Ok(UserDto {
        id,
        email: row.get::<String, _>("email"),
        name: row.get::<String, _>("name"),
        created_at: row.get::<Option<String>, _>("created_at"),
        updated_at: row.get::<Option<String>, _>("updated_at"),
    })
}

fn account_number(account_id: &Uuid) -> String {
    // Not an IBAN, just a stable human-readable handle.
    let simple = account_id.simple().to_string();
    format!("BW-{}", &simple[..10])
}

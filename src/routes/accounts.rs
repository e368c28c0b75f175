use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use sqlx::Row;
use uuid::Uuid;

use crate::error::{AppResult, OptionExt};
use crate::state::AppState;
use crate::types::{AccountDto, AuthContext, TransactionDto};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TransactionQuery {
    pub limit: Option<u32>,
}

pub async fn list_accounts(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> AppResult<impl IntoResponse> {
    let rows = sqlx::query(
        r#"SELECT id, number, kind, balance_cents, created_at
           FROM accounts WHERE user_id = ?1 ORDER BY created_at ASC"#,
    )
    .bind(&ctx.subject_id)
    .fetch_all(&state.db)
    .await?;

    let items: Vec<AccountDto> = rows
        .into_iter()
        .map(|r| AccountDto {
            id: Uuid::parse_str(r.get::<String, _>("id").as_str()).unwrap_or_default(),
            number: r.get::<String, _>("number"),
            kind: r.get::<String, _>("kind"),
            balance_cents: r.get::<i64, _>("balance_cents"),
            created_at: r.get::<Option<String>, _>("created_at"),
        })
        .collect();

    Ok(Json(items))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(account_id): Path<Uuid>,
    Query(q): Query<TransactionQuery>,
) -> AppResult<impl IntoResponse> {
    // Foreign and unknown accounts are indistinguishable to the caller.
    sqlx::query("SELECT id FROM accounts WHERE id = ?1 AND user_id = ?2")
        .bind(account_id.to_string())
        .bind(&ctx.subject_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("Account")?;

    let limit = q.limit.unwrap_or(50).clamp(1, 500);
    let rows = sqlx::query(
        r#"SELECT id, account_id, amount_cents, description, created_at
           FROM transactions WHERE account_id = ?1
           ORDER BY created_at DESC, id DESC LIMIT ?2"#,
    )
    .bind(account_id.to_string())
    .bind(limit as i64)
    .fetch_all(&state.db)
    .await?;

    let items: Vec<TransactionDto> = rows
        .into_iter()
        .map(|r| TransactionDto {
            id: r.get::<i64, _>("id"),
            account_id,
            amount_cents: r.get::<i64, _>("amount_cents"),
            description: r.get::<String, _>("description"),
            created_at: r.get::<Option<String>, _>("created_at"),
        })
        .collect();

    Ok(Json(items))
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of the verified caller, inserted into request extensions by
/// the auth middleware and read by the CSRF guard and the handlers.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub subject_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub csrf_token: String,
    pub user: UserDto,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupResponse {
    pub user: UserDto,
    pub account: AccountDto,
}

#[derive(Debug, Clone, Serialize)]
pub struct CsrfTokenResponse {
    pub csrf_token: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountDto {
    pub id: Uuid,
    pub number: String,
    pub kind: String,
    pub balance_cents: i64,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDto {
    pub id: i64,
    pub account_id: Uuid,
    pub amount_cents: i64,
    pub description: String,
    pub created_at: Option<String>,
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::error::Error;
use std::fmt;

/// The primary error type for the application.
///
/// This enum consolidates all failures that can surface from a request,
/// providing a unified way to turn them into structured JSON responses.
/// Internal details (store errors, stack traces) go to the logs only.
#[derive(Debug)]
pub enum AppError {
    /// For internal server errors that are not expected to be handled by the client.
    Internal(anyhow::Error),
    /// For client errors due to invalid requests.
    BadRequest(String),
    /// For when a requested resource is not found.
    NotFound(String),
    /// For when a request conflicts with the current state of the server.
    Conflict(String),
    /// For errors related to database operations.
    Database(String),
    /// For when a backing store cannot be reached on a fail-loud path.
    StoreUnavailable(String),
    /// Unknown email or wrong password at login.
    InvalidCredentials,
    /// No `Authorization` header, or one without the `Bearer ` prefix.
    AuthHeaderMissing,
    /// Bearer token with a bad signature or past its expiry.
    TokenInvalid,
    /// Token verified but carries no usable subject.
    TokenPayloadInvalid,
    /// Mutating request without an `X-CSRF-Token` header.
    CsrfTokenMissing,
    /// Presented CSRF token does not match the stored one (or none is stored).
    CsrfTokenInvalid,
    /// For when a client has sent too many requests in a given amount of time.
    RateLimited {
        /// The number of seconds to wait before retrying the request.
        retry_after_seconds: u64,
    },
    /// For when a specific field in a request fails validation.
    ValidationError {
        /// The name of the field that failed validation.
        field: String,
        /// A message describing the validation error.
        message: String,
    },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(e) => write!(f, "Internal error: {}", e),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
            AppError::StoreUnavailable(msg) => write!(f, "Store unavailable: {}", msg),
            AppError::InvalidCredentials => write!(f, "Invalid email or password"),
            AppError::AuthHeaderMissing => write!(f, "Missing or malformed Authorization header"),
            AppError::TokenInvalid => write!(f, "Invalid or expired token"),
            AppError::TokenPayloadInvalid => write!(f, "Token payload is missing a subject"),
            AppError::CsrfTokenMissing => write!(f, "CSRF token missing"),
            AppError::CsrfTokenInvalid => write!(f, "CSRF token invalid"),
            AppError::RateLimited { retry_after_seconds } => {
                write!(f, "Rate limited. Retry after {} seconds", retry_after_seconds)
            }
            AppError::ValidationError { field, message } => {
                write!(f, "Validation error on field '{}': {}", field, message)
            }
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Internal(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, error_message, details) = match self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                let error_id = uuid::Uuid::new_v4();
                tracing::error!("Error ID: {}", error_id);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    Some(json!({ "error_id": error_id.to_string() })),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg, None),
            AppError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                    None,
                )
            }
            AppError::StoreUnavailable(msg) => {
                tracing::error!("Store unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNAVAILABLE",
                    "A backing store is temporarily unavailable".to_string(),
                    None,
                )
            }
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid email or password".to_string(),
                None,
            ),
            AppError::AuthHeaderMissing => (
                StatusCode::UNAUTHORIZED,
                "AUTH_HEADER_MISSING",
                "Missing or malformed Authorization header".to_string(),
                None,
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_INVALID",
                "Invalid or expired token".to_string(),
                None,
            ),
            AppError::TokenPayloadInvalid => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_PAYLOAD_INVALID",
                "Token payload is missing a subject".to_string(),
                None,
            ),
            AppError::CsrfTokenMissing => (
                StatusCode::FORBIDDEN,
                "CSRF_TOKEN_MISSING",
                "CSRF token missing".to_string(),
                None,
            ),
            AppError::CsrfTokenInvalid => (
                StatusCode::FORBIDDEN,
                "CSRF_TOKEN_INVALID",
                "CSRF token invalid".to_string(),
                None,
            ),
            AppError::RateLimited { retry_after_seconds } => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                format!("Too many requests. Please retry after {} seconds", retry_after_seconds),
                Some(json!({ "retry_after_seconds": retry_after_seconds })),
            ),
            AppError::ValidationError { field, message } => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                format!("Validation failed for field '{}'", field),
                Some(json!({ "field": field, "message": message })),
            ),
        };

        let mut body = json!({
            "error": {
                "code": error_code,
                "message": error_message,
            },
            "status": status.as_u16(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        if let Some(details) = details {
            body["error"]["details"] = details;
        }

        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) => {
                AppError::Database(format!("Database error: {}", db_err.message()))
            }
            sqlx::Error::PoolTimedOut => {
                AppError::StoreUnavailable("Database connection pool timed out".to_string())
            }
            _ => AppError::Database(format!("Database error: {}", err)),
        }
    }
}

impl From<crate::store::StoreError> for AppError {
    fn from(err: crate::store::StoreError) -> Self {
        AppError::StoreUnavailable(err.to_string())
    }
}

/// A type alias for `Result<T, AppError>`, used throughout the application.
pub type AppResult<T> = Result<T, AppError>;

/// An extension trait for `Option` that provides a convenient way to convert
/// an `Option` to a `Result` with a `NotFound` error.
pub trait OptionExt<T> {
    /// Converts an `Option<T>` to a `Result<T, AppError>`.
    fn ok_or_not_found(self, entity: &str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::NotFound(format!("{} not found", entity)))
    }
}

/// A module containing helper functions for request validation.
pub mod validation {
    use super::*;

    const MAX_EMAIL_LEN: usize = 254;
    const MIN_PASSWORD_LEN: usize = 8;
    const MAX_PASSWORD_LEN: usize = 128;
    const MAX_NAME_LEN: usize = 100;

    /// Validates an email address.
    ///
    /// Checks the rough shape only (one `@`, non-empty local part and domain
    /// with a dot); deliverability is not this server's problem.
    pub fn validate_email(email: &str) -> AppResult<()> {
        if email.is_empty() || email.len() > MAX_EMAIL_LEN {
            return Err(AppError::ValidationError {
                field: "email".to_string(),
                message: format!("Email must be 1-{} characters", MAX_EMAIL_LEN),
            });
        }
        let mut parts = email.splitn(2, '@');
        let local = parts.next().unwrap_or("");
        let domain = parts.next().unwrap_or("");
        if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.ends_with('.') {
            return Err(AppError::ValidationError {
                field: "email".to_string(),
                message: "Email address is not valid".to_string(),
            });
        }
        Ok(())
    }

    /// Validates a password against the length policy.
    pub fn validate_password(password: &str) -> AppResult<()> {
        if password.len() < MIN_PASSWORD_LEN || password.len() > MAX_PASSWORD_LEN {
            return Err(AppError::ValidationError {
                field: "password".to_string(),
                message: format!(
                    "Password must be {}-{} characters",
                    MIN_PASSWORD_LEN, MAX_PASSWORD_LEN
                ),
            });
        }
        Ok(())
    }

    /// Validates a display name.
    pub fn validate_display_name(name: &str) -> AppResult<()> {
        if name.trim().is_empty() || name.len() > MAX_NAME_LEN {
            return Err(AppError::ValidationError {
                field: "name".to_string(),
                message: format!("Name must be 1-{} characters", MAX_NAME_LEN),
            });
        }
        if name.contains('\0') {
            return Err(AppError::ValidationError {
                field: "name".to_string(),
                message: "Name contains null characters".to_string(),
            });
        }
        Ok(())
    }
}

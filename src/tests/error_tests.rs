use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use serde_json::Value;

use crate::error::{validation, AppError, OptionExt};
use crate::store::StoreError;

#[test]
fn app_error_display() {
    let error = AppError::BadRequest("Invalid input".to_string());
    assert_eq!(format!("{}", error), "Bad request: Invalid input");

    let error = AppError::NotFound("Resource not found".to_string());
    assert_eq!(format!("{}", error), "Not found: Resource not found");

    let error = AppError::RateLimited { retry_after_seconds: 60 };
    assert_eq!(format!("{}", error), "Rate limited. Retry after 60 seconds");

    let error = AppError::CsrfTokenMissing;
    assert_eq!(format!("{}", error), "CSRF token missing");
}

#[test]
fn status_codes_match_the_taxonomy() {
    let cases: Vec<(AppError, StatusCode)> = vec![
        (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
        (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
        (AppError::Conflict("x".into()), StatusCode::CONFLICT),
        (AppError::Database("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        (AppError::StoreUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
        (AppError::InvalidCredentials, StatusCode::UNAUTHORIZED),
        (AppError::AuthHeaderMissing, StatusCode::UNAUTHORIZED),
        (AppError::TokenInvalid, StatusCode::UNAUTHORIZED),
        (AppError::TokenPayloadInvalid, StatusCode::UNAUTHORIZED),
        (AppError::CsrfTokenMissing, StatusCode::FORBIDDEN),
        (AppError::CsrfTokenInvalid, StatusCode::FORBIDDEN),
        (AppError::RateLimited { retry_after_seconds: 30 }, StatusCode::TOO_MANY_REQUESTS),
        (
            AppError::ValidationError { field: "f".into(), message: "m".into() },
            StatusCode::BAD_REQUEST,
        ),
    ];

    for (error, expected) in cases {
        let response = error.into_response();
        assert_eq!(response.status(), expected);
    }
}

#[tokio::test]
async fn error_envelope_carries_code_and_timestamp() {
    let response = AppError::CsrfTokenMissing.into_response();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["error"]["code"], "CSRF_TOKEN_MISSING");
    assert_eq!(json["status"], 403);
    assert!(json["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn rate_limited_envelope_exposes_retry_after() {
    let response = AppError::RateLimited { retry_after_seconds: 42 }.into_response();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["error"]["code"], "RATE_LIMITED");
    assert_eq!(json["error"]["details"]["retry_after_seconds"], 42);
}

#[test]
fn sqlx_errors_map_to_app_errors() {
    let app_error: AppError = sqlx::Error::RowNotFound.into();
    assert!(matches!(app_error, AppError::NotFound(_)));

    let app_error: AppError = sqlx::Error::PoolTimedOut.into();
    assert!(matches!(app_error, AppError::StoreUnavailable(_)));
}

#[test]
fn store_errors_fail_loud_as_unavailable() {
    let app_error: AppError = StoreError::Other("token store down".into()).into();
    assert!(matches!(app_error, AppError::StoreUnavailable(_)));
}

#[test]
fn option_ext_maps_none_to_not_found() {
    let some: Option<i32> = Some(5);
    assert_eq!(some.ok_or_not_found("Account").unwrap(), 5);

    let none: Option<i32> = None;
    let err = none.ok_or_not_found("Account").unwrap_err();
    assert_eq!(format!("{}", err), "Not found: Account not found");
}

#[test]
fn email_validation() {
    assert!(validation::validate_email("user@example.com").is_ok());
    assert!(validation::validate_email("a.b+c@sub.example.org").is_ok());

    assert!(validation::validate_email("").is_err());
    assert!(validation::validate_email("no-at-sign").is_err());
    assert!(validation::validate_email("@example.com").is_err());
    assert!(validation::validate_email("user@").is_err());
    assert!(validation::validate_email("user@nodot").is_err());
    assert!(validation::validate_email("user@trailing.").is_err());
}

#[test]
fn password_validation() {
    assert!(validation::validate_password("long-enough-pw").is_ok());
    assert!(validation::validate_password("short").is_err());
    assert!(validation::validate_password(&"x".repeat(200)).is_err());
}

#[test]
fn display_name_validation() {
    assert!(validation::validate_display_name("Erika Musterfrau").is_ok());
    assert!(validation::validate_display_name("").is_err());
    assert!(validation::validate_display_name("   ").is_err());
    assert!(validation::validate_display_name(&"x".repeat(200)).is_err());
    assert!(validation::validate_display_name("null\0byte").is_err());
}

//! Bearer token encoding and verification with the HS256 algorithm.
//!
//! Tokens are signed with the shared `auth.jwt_secret`; the verifier
//! checks signature and expiry and hands back the claims. It has no side
//! effects and no knowledge of storage.

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use serde::{Deserialize, Serialize};

use super::AuthError;

/// Clock skew tolerance for expiry validation, in seconds.
const LEEWAY_SECS: u64 = 30;

/// The claims carried by a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject - the user id.
    pub sub: String,
    /// Issued at as Unix timestamp.
    pub iat: i64,
    /// Expiration time as Unix timestamp.
    pub exp: i64,
}

impl Claims {
    /// Builds claims for a subject, valid for `ttl_seconds` from now.
    pub fn new(subject: impl Into<String>, ttl_seconds: u64) -> Self {
        let now = Utc::now().timestamp();
        Self { sub: subject.into(), iat: now, exp: now + ttl_seconds as i64 }
    }
}

/// Encodes claims into a signed token string.
pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    let key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::new(Algorithm::HS256);
    encode(&header, claims, &key).map_err(|e| AuthError::InvalidToken(format!("Encoding failed: {}", e)))
}

/// Decodes a token and validates signature and expiry.
///
/// # Errors
///
/// - `AuthError::TokenExpired` - Token has expired
/// - `AuthError::InvalidSignature` - Signature verification failed
/// - `AuthError::InvalidToken` - Token format is invalid
/// - `AuthError::InvalidAlgorithm` - Token uses an unsupported algorithm
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = LEEWAY_SECS;
    validation.validate_exp = true;
    // Only accept HS256
    validation.algorithms = vec![Algorithm::HS256];

    let token_data: TokenData<Claims> = decode(token, &key, &validation).map_err(map_jwt_error)?;
    Ok(token_data.claims)
}

/// Map jsonwebtoken errors to AuthError.
fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::InvalidAlgorithm => AuthError::InvalidAlgorithm,
        ErrorKind::InvalidToken => AuthError::InvalidToken("Malformed token".to_string()),
        ErrorKind::Base64(_) => AuthError::InvalidToken("Invalid base64 encoding".to_string()),
        ErrorKind::Json(_) => AuthError::InvalidToken("Invalid JSON in claims".to_string()),
        ErrorKind::MissingRequiredClaim(claim) => AuthError::MissingClaim(claim.to_string()),
        _ => AuthError::InvalidToken(format!("Token validation failed: {}", err)),
    }
}

//! Credential primitives: bearer tokens and password hashing.
//!
//! Verification of a bearer token and hashing/checking of a password are
//! leaf concerns with no knowledge of HTTP or storage; the middleware and
//! the auth routes build on top of them.

pub mod jwt;
pub mod password;

use thiserror::Error;

/// Failures from the credential primitives.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Token has expired (exp claim is in the past).
    #[error("Token has expired")]
    TokenExpired,

    /// Token signature is invalid.
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token format is malformed or invalid.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token uses an unsupported algorithm (only HS256 is allowed).
    #[error("Unsupported algorithm: only HS256 is allowed")]
    InvalidAlgorithm,

    /// Required claim is missing from token.
    #[error("Missing required claim: {0}")]
    MissingClaim(String),

    /// Password hashing operation failed.
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Password hash format is invalid.
    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

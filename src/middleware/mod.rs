//! Middleware components for HTTP request processing.
//!
//! The access-control chain for a mutating request is: bearer-token
//! verification ([`auth`]), then the CSRF guard ([`csrf`]), then rate
//! limiting ([`rate_limit`]). A request that fails a stage never reaches
//! the next one. [`ip`] derives the client address the limiter keys on,
//! and [`security_headers`] decorates every response.

pub mod auth;
pub mod csrf;
pub mod ip;
pub mod rate_limit;
pub mod security_headers;

pub use rate_limit::{RateDecision, RateLimiter};

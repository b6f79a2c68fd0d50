//! Typed failure taxonomy for the login exchange and authenticated calls.
//!
//! Callers match on these classes: the only automatic recovery in the whole
//! client is clearing the session on [`ApiError::Unauthorized`]. Nothing is
//! retried.

use thiserror::Error;

/// Failure modes of the login exchange.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Credentials were empty after trimming; no request was sent.
    #[error("{0}")]
    Validation(String),

    /// The request could not be sent or the response never arrived.
    #[error("login failed: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("login rejected: {0}")]
    Rejected(String),

    /// The response body did not match the expected shape.
    #[error("malformed login response: {0}")]
    Malformed(String),
}

/// Failure modes of authenticated API calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The token is no longer valid. Callers clear the session and route
    /// back to login.
    #[error("session is no longer valid")]
    Unauthorized,

    /// The account role does not permit this operation.
    #[error("access denied: {0}")]
    Forbidden(String),

    /// The server answered with another non-2xx status.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The request could not be sent or the response never arrived. Existing
    /// caller state stays untouched.
    #[error("request failed: {0}")]
    Transport(String),

    /// The response body did not match the expected shape. Snapshots are
    /// built all-or-nothing, so nothing was partially applied.
    #[error("malformed response: {0}")]
    Malformed(String),
}

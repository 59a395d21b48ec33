//! Error types for the poll gateway

use thiserror::Error;

/// Result type alias for gateway actions
pub type Result<T> = std::result::Result<T, ActionError>;

/// User-facing failure of a gateway action.
///
/// The `Display` string of every variant doubles as the `error` field of the
/// response envelope, so it must stay short and reveal nothing about the
/// backend. Backend detail is logged server-side before the conversion to
/// [`ActionError::Backend`].
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("{0}")]
    RateLimited(#[from] crate::middleware::RateLimitError),

    #[error("{0}")]
    Validation(#[from] crate::middleware::ValidationError),

    #[error("must be logged in")]
    Unauthenticated,

    #[error("you do not own this poll")]
    Forbidden,

    #[error("poll not found")]
    NotFound,

    #[error("selected option does not exist")]
    InvalidOption,

    #[error("you have already voted on this poll")]
    AlreadyVoted,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("an account with this email already exists")]
    EmailTaken,

    #[error("something went wrong, please try again")]
    Backend,
}

/// Errors reported by the hosted auth/storage backend.
///
/// These never cross the action boundary as-is; [`crate::actions`] maps the
/// typed variants to their [`ActionError`] counterparts and collapses the
/// rest into the generic [`ActionError::Backend`].
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("credentials rejected")]
    InvalidCredentials,

    #[error("email already registered")]
    EmailTaken,

    #[error("uniqueness violation: {0}")]
    Conflict(String),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// Configuration errors surfaced at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Invalid(String),

    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

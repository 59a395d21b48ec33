//! Request gating: rate limiting and input validation

pub mod rate_limiter;
pub mod validator;

pub use rate_limiter::{
    Attempt, AttemptStore, MemoryAttemptStore, RateLimitConfig, RateLimitError, RateLimiter,
};
pub use validator::{InputValidator, ValidationError};

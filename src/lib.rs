//! Poll Gateway - rate-limited, validated actions for a polling web app
//!
//! This library implements the server-side action layer of a polling
//! application: authentication, poll lifecycle, and vote submission, all
//! guarded by a fixed pipeline of rate limiting, input validation, identity
//! resolution, and ownership checks in front of a hosted auth/storage
//! backend.
//!
//! ## Features
//!
//! - **Rate Limiting**: key-scoped sliding counters per action and identity
//! - **Input Validation**: per-action schemas, first failure surfaced
//! - **Ownership Checks**: owner-filtered mutations as defense in depth
//! - **Generic Errors**: backend detail is logged, never returned
//! - **Observability**: health probes and Prometheus counters
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use poll_gateway::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> poll_gateway::error::Result<()> {
//!     let backend = Arc::new(MemoryBackend::new());
//!     let actions = Actions::new(
//!         Arc::new(RateLimiter::new(RateLimitConfig::default())),
//!         backend.clone(),
//!         backend.clone(),
//!         Arc::new(NoopCache),
//!     );
//!
//!     let session = actions.register("alice@example.com", "secret1", "Alice").await?;
//!     let options = vec!["yes".to_string(), "no".to_string()];
//!     let poll = actions
//!         .create_poll(Some(session.access_token.as_str()), "ship on friday?", &options)
//!         .await?;
//!     actions.submit_vote(None, &poll.id.to_string(), 0).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
pub mod revalidate;
pub mod shutdown;

pub use config::Config;
pub use error::{ActionError, BackendError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::actions::{ActionKind, Actions};
    pub use crate::backend::{
        AuthBackend, HttpBackend, Identity, MemoryBackend, Poll, PollStore, Session, Vote,
    };
    pub use crate::config::Config;
    pub use crate::error::{ActionError, BackendError, Result};
    pub use crate::middleware::{InputValidator, RateLimitConfig, RateLimiter};
    pub use crate::observability::{GatewayMetrics, HealthChecker};
    pub use crate::revalidate::{HttpRevalidator, NoopCache, ViewCache};
}

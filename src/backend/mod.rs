//! Hosted auth/storage backend integration
//!
//! The gateway treats the hosted backend as an opaque remote store: session
//! lookup and row operations, nothing else. The two traits below are the
//! seam; [`client::HttpBackend`] speaks to the real service and
//! [`memory::MemoryBackend`] backs tests and local development.

pub mod client;
pub mod memory;
pub mod models;

pub use client::HttpBackend;
pub use memory::MemoryBackend;
pub use models::{Identity, NewPoll, NewVote, Poll, PollPatch, Session, Vote};

use crate::error::BackendError;
use async_trait::async_trait;
use uuid::Uuid;

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Session and identity operations offered by the hosted backend.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<Session>;

    async fn sign_up(&self, email: &str, password: &str, name: &str) -> BackendResult<Session>;

    async fn sign_out(&self, access_token: &str) -> BackendResult<()>;

    /// Resolve the identity behind a session token; `None` means the token
    /// is unknown or expired.
    async fn identity(&self, access_token: &str) -> BackendResult<Option<Identity>>;
}

/// Row operations on the poll and vote tables.
#[async_trait]
pub trait PollStore: Send + Sync {
    async fn insert_poll(&self, poll: NewPoll) -> BackendResult<Poll>;

    async fn fetch_poll(&self, id: Uuid) -> BackendResult<Option<Poll>>;

    async fn list_polls_by_owner(&self, owner: Uuid) -> BackendResult<Vec<Poll>>;

    /// Apply `patch` to the poll only when it is owned by `owner`. The
    /// owner filter rides in the store query itself, so a race between the
    /// caller's ownership check and this call cannot cross owners; a lost
    /// race returns `None`.
    async fn update_poll(
        &self,
        id: Uuid,
        owner: Uuid,
        patch: PollPatch,
    ) -> BackendResult<Option<Poll>>;

    /// Delete the poll only when it is owned by `owner`. Returns whether a
    /// row was removed.
    async fn delete_poll(&self, id: Uuid, owner: Uuid) -> BackendResult<bool>;

    async fn find_vote(&self, poll_id: Uuid, user: Uuid) -> BackendResult<Option<Vote>>;

    /// Insert a vote. `(poll_id, user_id)` uniqueness for authenticated
    /// voters is enforced here, not only by the caller's pre-check; a
    /// violation is a [`BackendError::Conflict`].
    async fn insert_vote(&self, vote: NewVote) -> BackendResult<Vote>;
}

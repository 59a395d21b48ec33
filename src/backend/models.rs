//! Rows and identities exchanged with the hosted backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A poll row. Invariant: `options` holds at least two entries; the
/// validation layer guarantees it before any insert or update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poll {
    pub id: Uuid,
    pub user_id: Uuid,
    pub question: String,
    pub options: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A vote row. `user_id` is `None` for anonymous votes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub id: Uuid,
    pub poll_id: Uuid,
    pub user_id: Option<Uuid>,
    pub option_index: usize,
}

/// Fields of a poll about to be inserted; the store assigns id and
/// creation time.
#[derive(Debug, Clone, Serialize)]
pub struct NewPoll {
    pub user_id: Uuid,
    pub question: String,
    pub options: Vec<String>,
}

/// Replacement content for an owned poll.
#[derive(Debug, Clone, Serialize)]
pub struct PollPatch {
    pub question: String,
    pub options: Vec<String>,
}

/// Fields of a vote about to be inserted.
#[derive(Debug, Clone, Serialize)]
pub struct NewVote {
    pub poll_id: Uuid,
    pub user_id: Option<Uuid>,
    pub option_index: usize,
}

/// The caller behind a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
}

/// An established session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user: Identity,
}

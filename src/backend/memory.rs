//! In-memory backend for tests and local development
//!
//! Implements the same contracts as the hosted service, including the
//! `(poll_id, user_id)` vote uniqueness constraint and owner-filtered
//! mutations. Passwords are stored as-is; this store never leaves the
//! process and stands in for a backend that does its own hashing.

use super::models::{Identity, NewPoll, NewVote, Poll, PollPatch, Session, Vote};
use super::{AuthBackend, BackendResult, PollStore};
use crate::error::BackendError;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct UserRecord {
    email: String,
    password: String,
    #[allow(dead_code)]
    name: String,
}

/// Process-local implementation of both backend traits.
#[derive(Default)]
pub struct MemoryBackend {
    // write lock makes the email-uniqueness check atomic with the insert
    users: RwLock<HashMap<Uuid, UserRecord>>,
    sessions: DashMap<String, Uuid>,
    polls: DashMap<Uuid, Poll>,
    // single lock so duplicate check and insert cannot interleave
    votes: RwLock<Vec<Vote>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn open_session(&self, user_id: Uuid, email: String) -> Session {
        let token = Uuid::new_v4().to_string();
        self.sessions.insert(token.clone(), user_id);
        Session {
            access_token: token,
            user: Identity { user_id, email },
        }
    }
}

#[async_trait]
impl AuthBackend for MemoryBackend {
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<Session> {
        let users = self.users.read().await;
        let found = users
            .iter()
            .find(|(_, user)| user.email == email && user.password == password)
            .map(|(id, user)| (*id, user.email.clone()));
        drop(users);

        match found {
            Some((user_id, email)) => Ok(self.open_session(user_id, email)),
            None => Err(BackendError::InvalidCredentials),
        }
    }

    async fn sign_up(&self, email: &str, password: &str, name: &str) -> BackendResult<Session> {
        let mut users = self.users.write().await;
        if users.values().any(|user| user.email == email) {
            return Err(BackendError::EmailTaken);
        }

        let user_id = Uuid::new_v4();
        users.insert(
            user_id,
            UserRecord {
                email: email.to_string(),
                password: password.to_string(),
                name: name.to_string(),
            },
        );
        drop(users);

        Ok(self.open_session(user_id, email.to_string()))
    }

    async fn sign_out(&self, access_token: &str) -> BackendResult<()> {
        self.sessions.remove(access_token);
        Ok(())
    }

    async fn identity(&self, access_token: &str) -> BackendResult<Option<Identity>> {
        let Some(user_id) = self.sessions.get(access_token).map(|entry| *entry.value()) else {
            return Ok(None);
        };

        let users = self.users.read().await;
        Ok(users.get(&user_id).map(|user| Identity {
            user_id,
            email: user.email.clone(),
        }))
    }
}

#[async_trait]
impl PollStore for MemoryBackend {
    async fn insert_poll(&self, poll: NewPoll) -> BackendResult<Poll> {
        let row = Poll {
            id: Uuid::new_v4(),
            user_id: poll.user_id,
            question: poll.question,
            options: poll.options,
            created_at: Utc::now(),
        };
        self.polls.insert(row.id, row.clone());
        Ok(row)
    }

    async fn fetch_poll(&self, id: Uuid) -> BackendResult<Option<Poll>> {
        Ok(self.polls.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_polls_by_owner(&self, owner: Uuid) -> BackendResult<Vec<Poll>> {
        let mut polls: Vec<Poll> = self
            .polls
            .iter()
            .filter(|entry| entry.value().user_id == owner)
            .map(|entry| entry.value().clone())
            .collect();
        polls.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(polls)
    }

    async fn update_poll(
        &self,
        id: Uuid,
        owner: Uuid,
        patch: PollPatch,
    ) -> BackendResult<Option<Poll>> {
        match self.polls.get_mut(&id) {
            Some(mut entry) if entry.value().user_id == owner => {
                let poll = entry.value_mut();
                poll.question = patch.question;
                poll.options = patch.options;
                Ok(Some(poll.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_poll(&self, id: Uuid, owner: Uuid) -> BackendResult<bool> {
        Ok(self
            .polls
            .remove_if(&id, |_, poll| poll.user_id == owner)
            .is_some())
    }

    async fn find_vote(&self, poll_id: Uuid, user: Uuid) -> BackendResult<Option<Vote>> {
        let votes = self.votes.read().await;
        Ok(votes
            .iter()
            .find(|vote| vote.poll_id == poll_id && vote.user_id == Some(user))
            .cloned())
    }

    async fn insert_vote(&self, vote: NewVote) -> BackendResult<Vote> {
        let mut votes = self.votes.write().await;

        if let Some(user) = vote.user_id {
            let duplicate = votes
                .iter()
                .any(|existing| existing.poll_id == vote.poll_id && existing.user_id == Some(user));
            if duplicate {
                return Err(BackendError::Conflict(format!(
                    "vote already exists for poll {}",
                    vote.poll_id
                )));
            }
        }

        let row = Vote {
            id: Uuid::new_v4(),
            poll_id: vote.poll_id,
            user_id: vote.user_id,
            option_index: vote.option_index,
        };
        votes.push(row.clone());
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_up_rejects_duplicate_email() {
        let backend = MemoryBackend::new();

        backend
            .sign_up("alice@example.com", "secret1", "Alice")
            .await
            .unwrap();
        let err = backend
            .sign_up("alice@example.com", "other-pass", "Imposter")
            .await
            .unwrap_err();

        assert!(matches!(err, BackendError::EmailTaken));
    }

    #[tokio::test]
    async fn sign_out_revokes_the_session() {
        let backend = MemoryBackend::new();
        let session = backend
            .sign_up("alice@example.com", "secret1", "Alice")
            .await
            .unwrap();

        assert!(backend
            .identity(&session.access_token)
            .await
            .unwrap()
            .is_some());

        backend.sign_out(&session.access_token).await.unwrap();
        assert!(backend
            .identity(&session.access_token)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn update_ignores_non_owner() {
        let backend = MemoryBackend::new();
        let owner = Uuid::new_v4();
        let poll = backend
            .insert_poll(NewPoll {
                user_id: owner,
                question: "favorite color?".to_string(),
                options: vec!["red".to_string(), "blue".to_string()],
            })
            .await
            .unwrap();

        let updated = backend
            .update_poll(
                poll.id,
                Uuid::new_v4(),
                PollPatch {
                    question: "hijacked?".to_string(),
                    options: vec!["yes".to_string(), "no".to_string()],
                },
            )
            .await
            .unwrap();

        assert!(updated.is_none());
        let stored = backend.fetch_poll(poll.id).await.unwrap().unwrap();
        assert_eq!(stored.question, "favorite color?");
    }

    #[tokio::test]
    async fn vote_uniqueness_is_enforced_on_insert() {
        let backend = MemoryBackend::new();
        let poll_id = Uuid::new_v4();
        let user = Uuid::new_v4();

        backend
            .insert_vote(NewVote {
                poll_id,
                user_id: Some(user),
                option_index: 0,
            })
            .await
            .unwrap();

        let err = backend
            .insert_vote(NewVote {
                poll_id,
                user_id: Some(user),
                option_index: 1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Conflict(_)));

        // anonymous votes carry no identity and are not deduplicated
        for _ in 0..2 {
            backend
                .insert_vote(NewVote {
                    poll_id,
                    user_id: None,
                    option_index: 0,
                })
                .await
                .unwrap();
        }
    }
}

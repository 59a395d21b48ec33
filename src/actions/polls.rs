//! Poll lifecycle actions: create, read, list, update, delete

use super::{ActionKind, Actions};
use crate::backend::{NewPoll, Poll, PollPatch};
use crate::error::{ActionError, Result};
use crate::middleware::InputValidator;
use tracing::info;

impl Actions {
    /// Create a poll owned by the caller.
    pub async fn create_poll(
        &self,
        token: Option<&str>,
        question: &str,
        options: &[String],
    ) -> Result<Poll> {
        let identity = self.resolve_identity(token).await?;
        self.gate(ActionKind::CreatePoll, identity.as_ref())?;

        let question = InputValidator::validate_question(question)?;
        let options = InputValidator::validate_options(options)?;

        let identity = identity.ok_or(ActionError::Unauthenticated)?;

        let poll = self
            .store
            .insert_poll(NewPoll {
                user_id: identity.user_id,
                question,
                options,
            })
            .await
            .map_err(Self::backend_failure)?;

        info!(poll_id = %poll.id, user_id = %identity.user_id, "poll created");
        self.notify_polls_changed();
        Ok(poll)
    }

    /// Fetch a poll by id. Read access is public: no session, no rate
    /// limit, no ownership check.
    pub async fn get_poll(&self, poll_id: &str) -> Result<Poll> {
        let id = InputValidator::validate_uuid("poll id", poll_id)?;

        self.store
            .fetch_poll(id)
            .await
            .map_err(Self::backend_failure)?
            .ok_or(ActionError::NotFound)
    }

    /// List the caller's own polls, newest first.
    pub async fn list_own_polls(&self, token: Option<&str>) -> Result<Vec<Poll>> {
        let identity = self
            .resolve_identity(token)
            .await?
            .ok_or(ActionError::Unauthenticated)?;

        self.store
            .list_polls_by_owner(identity.user_id)
            .await
            .map_err(Self::backend_failure)
    }

    /// Replace an owned poll's question and options.
    pub async fn update_poll(
        &self,
        token: Option<&str>,
        poll_id: &str,
        question: &str,
        options: &[String],
    ) -> Result<Poll> {
        let identity = self.resolve_identity(token).await?;
        self.gate(ActionKind::UpdatePoll, identity.as_ref())?;

        let id = InputValidator::validate_uuid("poll id", poll_id)?;
        let question = InputValidator::validate_question(question)?;
        let options = InputValidator::validate_options(options)?;

        let identity = identity.ok_or(ActionError::Unauthenticated)?;

        let current = self
            .store
            .fetch_poll(id)
            .await
            .map_err(Self::backend_failure)?
            .ok_or(ActionError::NotFound)?;
        if current.user_id != identity.user_id {
            return Err(ActionError::Forbidden);
        }

        // the store filters by owner as well, so losing a race to a delete
        // or transfer surfaces as NotFound instead of crossing owners
        let updated = self
            .store
            .update_poll(id, identity.user_id, PollPatch { question, options })
            .await
            .map_err(Self::backend_failure)?
            .ok_or(ActionError::NotFound)?;

        info!(poll_id = %id, "poll updated");
        Ok(updated)
    }

    /// Delete an owned poll.
    pub async fn delete_poll(&self, token: Option<&str>, poll_id: &str) -> Result<()> {
        let identity = self.resolve_identity(token).await?;
        self.gate(ActionKind::DeletePoll, identity.as_ref())?;

        let id = InputValidator::validate_uuid("poll id", poll_id)?;

        let identity = identity.ok_or(ActionError::Unauthenticated)?;

        let current = self
            .store
            .fetch_poll(id)
            .await
            .map_err(Self::backend_failure)?
            .ok_or(ActionError::NotFound)?;
        if current.user_id != identity.user_id {
            return Err(ActionError::Forbidden);
        }

        let removed = self
            .store
            .delete_poll(id, identity.user_id)
            .await
            .map_err(Self::backend_failure)?;
        if !removed {
            return Err(ActionError::NotFound);
        }

        info!(poll_id = %id, "poll deleted");
        self.notify_polls_changed();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::test_actions;
    use crate::error::ActionError;

    async fn session(actions: &crate::actions::Actions, email: &str) -> String {
        actions
            .register(email, "secret1", "Tester")
            .await
            .unwrap()
            .access_token
    }

    #[tokio::test]
    async fn create_poll_requires_login() {
        let (actions, _) = test_actions();

        let options = vec!["yes".to_string(), "no".to_string()];
        let err = actions
            .create_poll(None, "ship on friday?", &options)
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Unauthenticated));
    }

    #[tokio::test]
    async fn question_boundary_is_enforced() {
        let (actions, _) = test_actions();
        let token = session(&actions, "alice@example.com").await;
        let options = vec!["yes".to_string(), "no".to_string()];

        let err = actions
            .create_poll(Some(token.as_str()), "abcd", &options)
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Validation(_)));

        let poll = actions
            .create_poll(Some(token.as_str()), "abcde", &options)
            .await
            .unwrap();
        assert_eq!(poll.question, "abcde");
    }

    #[tokio::test]
    async fn update_by_non_owner_is_forbidden() {
        let (actions, backend) = test_actions();
        let owner = session(&actions, "owner@example.com").await;
        let other = session(&actions, "other@example.com").await;
        let options = vec!["yes".to_string(), "no".to_string()];

        let poll = actions
            .create_poll(Some(owner.as_str()), "ship on friday?", &options)
            .await
            .unwrap();

        let err = actions
            .update_poll(Some(other.as_str()), &poll.id.to_string(), "hijacked??", &options)
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Forbidden));

        let stored = crate::backend::PollStore::fetch_poll(backend.as_ref(), poll.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.question, "ship on friday?");
    }

    #[tokio::test]
    async fn malformed_poll_id_is_rejected() {
        let (actions, _) = test_actions();
        let token = session(&actions, "alice@example.com").await;
        let options = vec!["yes".to_string(), "no".to_string()];

        let err = actions
            .update_poll(Some(token.as_str()), "not-a-uuid", "valid question?", &options)
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Validation(_)));

        let err = actions
            .delete_poll(Some(token.as_str()), "not-a-uuid")
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Validation(_)));
    }

    #[tokio::test]
    async fn list_own_polls_only_returns_the_callers() {
        let (actions, _) = test_actions();
        let alice = session(&actions, "alice@example.com").await;
        let bob = session(&actions, "bob@example.com").await;
        let options = vec!["yes".to_string(), "no".to_string()];

        actions
            .create_poll(Some(alice.as_str()), "alice asks?", &options)
            .await
            .unwrap();
        actions
            .create_poll(Some(bob.as_str()), "bob asks too?", &options)
            .await
            .unwrap();

        let polls = actions.list_own_polls(Some(alice.as_str())).await.unwrap();
        assert_eq!(polls.len(), 1);
        assert_eq!(polls[0].question, "alice asks?");
    }
}

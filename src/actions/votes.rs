//! Vote submission

use super::{ActionKind, Actions};
use crate::backend::{NewVote, Vote};
use crate::error::{ActionError, Result};
use crate::middleware::InputValidator;
use tracing::info;

impl Actions {
    /// Cast a vote on a poll.
    ///
    /// Anonymous votes are accepted: they carry no user id, skip the
    /// duplicate guard, and share the anonymous rate-limit counter. For
    /// authenticated callers the existence check is a fast path; the
    /// store's uniqueness constraint closes the check-then-insert race.
    pub async fn submit_vote(
        &self,
        token: Option<&str>,
        poll_id: &str,
        option_index: usize,
    ) -> Result<Vote> {
        let identity = self.resolve_identity(token).await?;
        self.gate(ActionKind::Vote, identity.as_ref())?;

        let id = InputValidator::validate_uuid("poll id", poll_id)?;

        let poll = self
            .store
            .fetch_poll(id)
            .await
            .map_err(Self::backend_failure)?
            .ok_or(ActionError::NotFound)?;

        // bounds are checked against this poll's real options, not a schema
        if option_index >= poll.options.len() {
            return Err(ActionError::InvalidOption);
        }

        if let Some(identity) = &identity {
            let existing = self
                .store
                .find_vote(id, identity.user_id)
                .await
                .map_err(Self::backend_failure)?;
            if existing.is_some() {
                return Err(ActionError::AlreadyVoted);
            }
        }

        let vote = self
            .store
            .insert_vote(NewVote {
                poll_id: id,
                user_id: identity.as_ref().map(|i| i.user_id),
                option_index,
            })
            .await
            .map_err(Self::backend_failure)?;

        info!(poll_id = %id, option_index, anonymous = identity.is_none(), "vote recorded");
        Ok(vote)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::test_actions;
    use crate::error::ActionError;

    async fn poll_with_three_options(
        actions: &crate::actions::Actions,
    ) -> (String, crate::backend::Poll) {
        let token = actions
            .register("owner@example.com", "secret1", "Owner")
            .await
            .unwrap()
            .access_token;
        let options = vec!["red".to_string(), "green".to_string(), "blue".to_string()];
        let poll = actions
            .create_poll(Some(token.as_str()), "favorite color?", &options)
            .await
            .unwrap();
        (token, poll)
    }

    #[tokio::test]
    async fn option_index_bounds_follow_the_poll() {
        let (actions, _) = test_actions();
        let (token, poll) = poll_with_three_options(&actions).await;
        let id = poll.id.to_string();

        let err = actions
            .submit_vote(Some(token.as_str()), &id, poll.options.len())
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::InvalidOption));

        let vote = actions
            .submit_vote(Some(token.as_str()), &id, poll.options.len() - 1)
            .await
            .unwrap();
        assert_eq!(vote.option_index, 2);
    }

    #[tokio::test]
    async fn second_vote_by_the_same_user_conflicts() {
        let (actions, _) = test_actions();
        let (owner, poll) = poll_with_three_options(&actions).await;
        let id = poll.id.to_string();

        actions.submit_vote(Some(owner.as_str()), &id, 0).await.unwrap();
        let err = actions.submit_vote(Some(owner.as_str()), &id, 1).await.unwrap_err();
        assert!(matches!(err, ActionError::AlreadyVoted));

        // a different user still votes freely
        let other = actions
            .register("other@example.com", "secret1", "Other")
            .await
            .unwrap()
            .access_token;
        actions.submit_vote(Some(other.as_str()), &id, 1).await.unwrap();
    }

    #[tokio::test]
    async fn anonymous_votes_are_accepted_and_unguarded() {
        let (actions, _) = test_actions();
        let (_, poll) = poll_with_three_options(&actions).await;
        let id = poll.id.to_string();

        let first = actions.submit_vote(None, &id, 0).await.unwrap();
        assert!(first.user_id.is_none());

        // no duplicate guard without an identity
        actions.submit_vote(None, &id, 0).await.unwrap();
    }

    #[tokio::test]
    async fn voting_on_a_missing_poll_is_not_found() {
        let (actions, _) = test_actions();

        let err = actions
            .submit_vote(None, &uuid::Uuid::new_v4().to_string(), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::NotFound));
    }
}

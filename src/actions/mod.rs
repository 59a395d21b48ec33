//! Guarded action pipeline
//!
//! Every mutating entry point runs the same ordered sequence: rate-limit
//! gate, schema validation, identity check, action-specific authorization,
//! backend mutation, cache notification. A failure at any step
//! short-circuits with an [`ActionError`] and performs no partial mutation.

mod auth;
mod polls;
mod votes;

use crate::backend::{AuthBackend, Identity, PollStore};
use crate::error::{ActionError, BackendError, Result};
use crate::middleware::RateLimiter;
use crate::revalidate::ViewCache;
use std::sync::Arc;
use tracing::error;

/// Listing path invalidated after create/delete.
const POLLS_PATH: &str = "/polls";

/// Sentinel identity for callers without a session. All anonymous callers
/// of one action share a single rate-limit counter.
const ANONYMOUS: &str = "anon";

/// Action kinds that pass through the rate-limit gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Login,
    Register,
    Logout,
    CreatePoll,
    UpdatePoll,
    DeletePoll,
    Vote,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Login => "login",
            ActionKind::Register => "register",
            ActionKind::Logout => "logout",
            ActionKind::CreatePoll => "create-poll",
            ActionKind::UpdatePoll => "update-poll",
            ActionKind::DeletePoll => "delete-poll",
            ActionKind::Vote => "vote",
        }
    }
}

/// The gateway's action service: rate limiter, backend, and view cache
/// wired behind one method per action.
pub struct Actions {
    limiter: Arc<RateLimiter>,
    auth: Arc<dyn AuthBackend>,
    store: Arc<dyn PollStore>,
    cache: Arc<dyn ViewCache>,
}

impl Actions {
    pub fn new(
        limiter: Arc<RateLimiter>,
        auth: Arc<dyn AuthBackend>,
        store: Arc<dyn PollStore>,
        cache: Arc<dyn ViewCache>,
    ) -> Self {
        Self {
            limiter,
            auth,
            store,
            cache,
        }
    }

    /// Rate-limit gate: first step of every mutating pipeline. The key
    /// scopes the counter to the action kind and the caller's identity.
    fn gate(&self, kind: ActionKind, identity: Option<&Identity>) -> Result<()> {
        let who = match identity {
            Some(identity) => identity.user_id.to_string(),
            None => ANONYMOUS.to_string(),
        };
        let key = format!("{}:{}", kind.as_str(), who);
        self.limiter.check(&key)?;
        Ok(())
    }

    /// Resolve the caller behind `token`, if any. Resolution happens before
    /// the gate so the rate-limit key can carry the real identity; whether
    /// an identity is *required* is decided after validation.
    async fn resolve_identity(&self, token: Option<&str>) -> Result<Option<Identity>> {
        match token {
            Some(token) => self
                .auth
                .identity(token)
                .await
                .map_err(Self::backend_failure),
            None => Ok(None),
        }
    }

    /// Map a store/auth failure onto the user-facing taxonomy. Anything
    /// without a typed counterpart is logged in full and collapsed to the
    /// generic [`ActionError::Backend`].
    pub(crate) fn backend_failure(err: BackendError) -> ActionError {
        match err {
            BackendError::InvalidCredentials => ActionError::InvalidCredentials,
            BackendError::EmailTaken => ActionError::EmailTaken,
            BackendError::Conflict(_) => ActionError::AlreadyVoted,
            other => {
                error!(error = %other, "backend call failed");
                ActionError::Backend
            }
        }
    }

    /// Fire-and-forget notification that poll listings changed.
    fn notify_polls_changed(&self) {
        self.cache.invalidate(POLLS_PATH);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::middleware::RateLimitConfig;
    use crate::revalidate::NoopCache;
    use std::time::Duration;

    pub(crate) fn test_actions() -> (Actions, Arc<MemoryBackend>) {
        test_actions_with_limit(RateLimitConfig {
            max_attempts: 5,
            window: Duration::from_secs(60),
            enabled: true,
        })
    }

    pub(crate) fn test_actions_with_limit(
        config: RateLimitConfig,
    ) -> (Actions, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        let actions = Actions::new(
            Arc::new(RateLimiter::new(config)),
            backend.clone(),
            backend.clone(),
            Arc::new(NoopCache),
        );
        (actions, backend)
    }

    #[test]
    fn action_kinds_have_distinct_keys() {
        let kinds = [
            ActionKind::Login,
            ActionKind::Register,
            ActionKind::Logout,
            ActionKind::CreatePoll,
            ActionKind::UpdatePoll,
            ActionKind::DeletePoll,
            ActionKind::Vote,
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in kinds.iter().skip(i + 1) {
                assert_ne!(a.as_str(), b.as_str());
            }
        }
    }
}

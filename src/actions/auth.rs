//! Authentication actions: login, register, logout, session retrieval

use super::{ActionKind, Actions};
use crate::backend::{Identity, Session};
use crate::error::{ActionError, Result};
use crate::middleware::InputValidator;
use tracing::info;

impl Actions {
    /// Establish a session from credentials.
    ///
    /// Login precedes identity, so its attempts count against the shared
    /// anonymous counter: a burst of failures throttles the action for
    /// every anonymous caller rather than leaking per-account state.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        self.gate(ActionKind::Login, None)?;

        let email = InputValidator::validate_email(email)?;
        InputValidator::validate_password(password)?;

        let session = self
            .auth
            .sign_in(&email, password)
            .await
            .map_err(Self::backend_failure)?;

        info!(user_id = %session.user.user_id, "user logged in");
        Ok(session)
    }

    /// Create an account and establish its first session.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<Session> {
        self.gate(ActionKind::Register, None)?;

        let email = InputValidator::validate_email(email)?;
        InputValidator::validate_password(password)?;
        let name = InputValidator::validate_name(name)?;

        let session = self
            .auth
            .sign_up(&email, password, &name)
            .await
            .map_err(Self::backend_failure)?;

        info!(user_id = %session.user.user_id, "user registered");
        Ok(session)
    }

    /// Revoke the caller's session.
    pub async fn logout(&self, token: Option<&str>) -> Result<()> {
        let identity = self.resolve_identity(token).await?;
        self.gate(ActionKind::Logout, identity.as_ref())?;

        match (token, identity) {
            (Some(token), Some(identity)) => {
                self.auth
                    .sign_out(token)
                    .await
                    .map_err(Self::backend_failure)?;
                info!(user_id = %identity.user_id, "user logged out");
                Ok(())
            }
            _ => Err(ActionError::Unauthenticated),
        }
    }

    /// Resolve the caller's current identity; `None` for anonymous callers.
    /// A read, so it bypasses the rate-limit gate.
    pub async fn current_session(&self, token: Option<&str>) -> Result<Option<Identity>> {
        self.resolve_identity(token).await
    }
}

//! HTTP client for the hosted auth/storage backend

use super::models::{Identity, NewPoll, NewVote, Poll, PollPatch, Session, Vote};
use super::{AuthBackend, BackendResult, PollStore};
use crate::config::BackendConfig;
use crate::error::BackendError;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Client for the hosted backend: auth endpoints under `/auth/v1`, table
/// operations under `/rest/v1` with column filters in the query string.
pub struct HttpBackend {
    config: BackendConfig,
    http_client: Client,
}

/// Wire shape of a session response from the auth endpoints.
#[derive(Debug, Deserialize)]
struct SessionPayload {
    access_token: String,
    user: UserPayload,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: Uuid,
    email: String,
}

impl From<SessionPayload> for Session {
    fn from(payload: SessionPayload) -> Self {
        Session {
            access_token: payload.access_token,
            user: Identity {
                user_id: payload.user.id,
                email: payload.user.email,
            },
        }
    }
}

impl HttpBackend {
    /// Create a new backend client.
    pub fn new(config: BackendConfig) -> BackendResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(BackendError::Http)?;

        info!(url = %config.url, "initialized backend client");

        Ok(Self {
            config,
            http_client,
        })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.config.url.trim_end_matches('/'), path)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.url.trim_end_matches('/'), table)
    }

    /// Start a request carrying the project key. Table operations also
    /// authorize as the service role; user-scoped auth calls override the
    /// bearer token per call.
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let key = self.config.service_key.expose_secret();
        self.http_client
            .request(method, url)
            .header("apikey", key.as_str())
            .bearer_auth(key)
    }

    /// Read the rows of a 2xx response, or fold the failure into a
    /// [`BackendError::Unexpected`] carrying status and body.
    async fn expect_rows<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> BackendResult<Vec<T>> {
        let status = response.status();
        if status.is_success() {
            return response.json().await.map_err(BackendError::Http);
        }
        Err(Self::unexpected(status, response).await)
    }

    async fn unexpected(status: StatusCode, response: reqwest::Response) -> BackendError {
        let body = response.text().await.unwrap_or_default();
        error!(%status, body, "backend request failed");
        BackendError::Unexpected(format!("status {}: {}", status, body))
    }
}

#[async_trait]
impl AuthBackend for HttpBackend {
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<Session> {
        debug!("signing in user");
        let response = self
            .request(Method::POST, &self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let payload: SessionPayload = response.json().await?;
                Ok(payload.into())
            }
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                Err(BackendError::InvalidCredentials)
            }
            status => Err(Self::unexpected(status, response).await),
        }
    }

    async fn sign_up(&self, email: &str, password: &str, name: &str) -> BackendResult<Session> {
        debug!("registering user");
        let response = self
            .request(Method::POST, &self.auth_url("signup"))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": { "name": name },
            }))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let payload: SessionPayload = response.json().await?;
                Ok(payload.into())
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY | StatusCode::CONFLICT => {
                Err(BackendError::EmailTaken)
            }
            status => Err(Self::unexpected(status, response).await),
        }
    }

    async fn sign_out(&self, access_token: &str) -> BackendResult<()> {
        let response = self
            .http_client
            .post(self.auth_url("logout"))
            .header("apikey", self.config.service_key.expose_secret().as_str())
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::unexpected(status, response).await)
        }
    }

    async fn identity(&self, access_token: &str) -> BackendResult<Option<Identity>> {
        let response = self
            .http_client
            .get(self.auth_url("user"))
            .header("apikey", self.config.service_key.expose_secret().as_str())
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let user: UserPayload = response.json().await?;
                Ok(Some(Identity {
                    user_id: user.id,
                    email: user.email,
                }))
            }
            // an unknown or expired token is an anonymous caller, not a failure
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(None),
            status => Err(Self::unexpected(status, response).await),
        }
    }
}

#[async_trait]
impl PollStore for HttpBackend {
    async fn insert_poll(&self, poll: NewPoll) -> BackendResult<Poll> {
        let response = self
            .request(Method::POST, &self.rest_url("polls"))
            .header("Prefer", "return=representation")
            .json(&[poll])
            .send()
            .await?;

        let mut rows: Vec<Poll> = Self::expect_rows(response).await?;
        rows.pop()
            .ok_or_else(|| BackendError::Unexpected("insert returned no row".to_string()))
    }

    async fn fetch_poll(&self, id: Uuid) -> BackendResult<Option<Poll>> {
        let response = self
            .request(Method::GET, &self.rest_url("polls"))
            .query(&[("id", format!("eq.{}", id)), ("select", "*".to_string())])
            .send()
            .await?;

        let mut rows: Vec<Poll> = Self::expect_rows(response).await?;
        Ok(rows.pop())
    }

    async fn list_polls_by_owner(&self, owner: Uuid) -> BackendResult<Vec<Poll>> {
        let response = self
            .request(Method::GET, &self.rest_url("polls"))
            .query(&[
                ("user_id", format!("eq.{}", owner)),
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
            ])
            .send()
            .await?;

        Self::expect_rows(response).await
    }

    async fn update_poll(
        &self,
        id: Uuid,
        owner: Uuid,
        patch: PollPatch,
    ) -> BackendResult<Option<Poll>> {
        // both filters ride in the query: a non-owner race updates nothing
        let response = self
            .request(Method::PATCH, &self.rest_url("polls"))
            .header("Prefer", "return=representation")
            .query(&[
                ("id", format!("eq.{}", id)),
                ("user_id", format!("eq.{}", owner)),
            ])
            .json(&patch)
            .send()
            .await?;

        let mut rows: Vec<Poll> = Self::expect_rows(response).await?;
        Ok(rows.pop())
    }

    async fn delete_poll(&self, id: Uuid, owner: Uuid) -> BackendResult<bool> {
        let response = self
            .request(Method::DELETE, &self.rest_url("polls"))
            .header("Prefer", "return=representation")
            .query(&[
                ("id", format!("eq.{}", id)),
                ("user_id", format!("eq.{}", owner)),
            ])
            .send()
            .await?;

        let rows: Vec<Poll> = Self::expect_rows(response).await?;
        Ok(!rows.is_empty())
    }

    async fn find_vote(&self, poll_id: Uuid, user: Uuid) -> BackendResult<Option<Vote>> {
        let response = self
            .request(Method::GET, &self.rest_url("votes"))
            .query(&[
                ("poll_id", format!("eq.{}", poll_id)),
                ("user_id", format!("eq.{}", user)),
                ("select", "*".to_string()),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;

        let mut rows: Vec<Vote> = Self::expect_rows(response).await?;
        Ok(rows.pop())
    }

    async fn insert_vote(&self, vote: NewVote) -> BackendResult<Vote> {
        let response = self
            .request(Method::POST, &self.rest_url("votes"))
            .header("Prefer", "return=representation")
            .json(&[vote])
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Conflict(body));
        }

        let mut rows: Vec<Vote> = Self::expect_rows(response).await?;
        rows.pop()
            .ok_or_else(|| BackendError::Unexpected("insert returned no row".to_string()))
    }
}

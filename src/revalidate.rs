//! View-cache invalidation signals
//!
//! Successful create/delete actions notify the rendering layer that cached
//! listing pages are stale. The signal is fire-and-forget: it runs on a
//! spawned task and a failure is logged, never surfaced to the caller.

use tracing::{debug, warn};

/// Sink for cache invalidation notifications.
pub trait ViewCache: Send + Sync {
    /// Mark cached views under `path` as stale. Must not block and must
    /// not fail the calling action.
    fn invalidate(&self, path: &str);
}

/// POSTs invalidation hooks to the frontend's revalidation endpoint.
pub struct HttpRevalidator {
    endpoint: String,
    http_client: reqwest::Client,
}

impl HttpRevalidator {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            http_client: reqwest::Client::new(),
        }
    }
}

impl ViewCache for HttpRevalidator {
    fn invalidate(&self, path: &str) {
        let request = self
            .http_client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "path": path }));
        let path = path.to_string();

        tokio::spawn(async move {
            match request.send().await.and_then(|r| r.error_for_status()) {
                Ok(_) => debug!(path, "view cache invalidated"),
                Err(err) => warn!(path, error = %err, "view cache invalidation failed"),
            }
        });
    }
}

/// Discards invalidation signals; used by tests and deployments without a
/// frontend hook.
#[derive(Debug, Default)]
pub struct NoopCache;

impl ViewCache for NoopCache {
    fn invalidate(&self, _path: &str) {}
}

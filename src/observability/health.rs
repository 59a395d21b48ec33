//! Health checks for the gateway and its backend

use crate::backend::PollStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// How long a probe result is reused before re-probing
const CACHE_TTL: Duration = Duration::from_secs(10);

/// Health status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Health of a single dependency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub message: Option<String>,
    pub response_time_ms: Option<u64>,
}

/// Overall gateway health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemHealth {
    pub status: HealthStatus,
    pub uptime_secs: u64,
    pub components: Vec<ComponentHealth>,
}

#[derive(Debug, Clone)]
struct CachedHealth {
    result: SystemHealth,
    cached_at: Instant,
}

/// Probes the backend store and caches the result briefly so health
/// endpoints cannot hammer the backend.
pub struct HealthChecker {
    start_time: Instant,
    store: Option<Arc<dyn PollStore>>,
    cached: RwLock<Option<CachedHealth>>,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            store: None,
            cached: RwLock::new(None),
        }
    }

    /// Register the backend store to probe.
    pub fn with_store(mut self, store: Arc<dyn PollStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Liveness: the process is up.
    pub fn liveness(&self) -> bool {
        true
    }

    /// Readiness: the backend answers.
    pub async fn readiness(&self) -> bool {
        self.check_health().await.status != HealthStatus::Unhealthy
    }

    /// Full health report, cached for [`CACHE_TTL`].
    pub async fn check_health(&self) -> SystemHealth {
        {
            let cached = self.cached.read().await;
            if let Some(entry) = cached.as_ref() {
                if entry.cached_at.elapsed() < CACHE_TTL {
                    debug!("serving cached health result");
                    return entry.result.clone();
                }
            }
        }

        let result = self.probe().await;

        let mut cached = self.cached.write().await;
        *cached = Some(CachedHealth {
            result: result.clone(),
            cached_at: Instant::now(),
        });
        result
    }

    async fn probe(&self) -> SystemHealth {
        let mut components = Vec::new();

        if let Some(store) = &self.store {
            // a fetch for the nil id exercises the full round trip without
            // depending on any row existing
            let started = Instant::now();
            let component = match store.fetch_poll(Uuid::nil()).await {
                Ok(_) => ComponentHealth {
                    name: "backend_store".to_string(),
                    status: HealthStatus::Healthy,
                    message: None,
                    response_time_ms: Some(started.elapsed().as_millis() as u64),
                },
                Err(err) => ComponentHealth {
                    name: "backend_store".to_string(),
                    status: HealthStatus::Unhealthy,
                    message: Some(err.to_string()),
                    response_time_ms: Some(started.elapsed().as_millis() as u64),
                },
            };
            components.push(component);
        }

        let status = if components
            .iter()
            .any(|c| c.status == HealthStatus::Unhealthy)
        {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Healthy
        };

        SystemHealth {
            status,
            uptime_secs: self.start_time.elapsed().as_secs(),
            components,
        }
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}

//! Poll Gateway server binary
//!
//! Wires the action pipeline to the configured backend and serves the HTTP
//! API with graceful shutdown.

use anyhow::Context;
use poll_gateway::{
    actions::Actions,
    api::{build_router, AppState},
    backend::{AuthBackend, HttpBackend, MemoryBackend, PollStore},
    config::{BackendMode, Config},
    middleware::RateLimiter,
    observability::{self, GatewayMetrics, HealthChecker},
    revalidate::{HttpRevalidator, NoopCache, ViewCache},
    shutdown::ShutdownCoordinator,
};
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    let config = if std::path::Path::new(&config_path).exists() {
        Config::from_file_with_env(&config_path)
            .with_context(|| format!("loading configuration from {}", config_path))?
    } else {
        Config::default_config()
    };
    config.validate().context("validating configuration")?;

    observability::init_logging(&config.logging.level, &config.logging.format);
    info!("starting poll gateway");

    let (auth, store): (Arc<dyn AuthBackend>, Arc<dyn PollStore>) = match config.backend.mode {
        BackendMode::Http => {
            let backend = Arc::new(
                HttpBackend::new(config.backend.clone()).context("initializing backend client")?,
            );
            info!(url = %config.backend.url, "using hosted backend");
            (backend.clone(), backend)
        }
        BackendMode::Memory => {
            warn!("using in-memory backend; state will not survive a restart");
            let backend = Arc::new(MemoryBackend::new());
            (backend.clone(), backend)
        }
    };

    let cache: Arc<dyn ViewCache> = match &config.cache.revalidate_url {
        Some(url) => {
            info!(url = %url, "view cache invalidation enabled");
            Arc::new(HttpRevalidator::new(url.clone()))
        }
        None => Arc::new(NoopCache),
    };

    let limiter = Arc::new(RateLimiter::new(config.rate_limit.to_limiter_config()));
    info!(
        max_attempts = config.rate_limit.max_attempts,
        window_secs = config.rate_limit.window_secs,
        "rate limiter initialized"
    );

    let actions = Arc::new(Actions::new(limiter, auth, store.clone(), cache));
    let state = AppState {
        actions,
        health_checker: Arc::new(HealthChecker::new().with_store(store)),
        metrics: Arc::new(GatewayMetrics::new()),
    };

    let app = build_router(state, config.server.max_body_size_kb * 1024);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("parsing server address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(%addr, "listening");

    let coordinator = Arc::new(ShutdownCoordinator::new());
    let signal = coordinator.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { signal.wait_for_signal().await })
        .await
        .context("serving")?;

    info!("poll gateway stopped");
    Ok(())
}

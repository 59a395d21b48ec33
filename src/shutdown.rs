//! Graceful shutdown handling

use std::sync::Arc;
use tokio::signal;
use tokio::sync::Notify;
use tracing::info;

/// Waits for ctrl-c or SIGTERM and fans the signal out to subscribers.
pub struct ShutdownCoordinator {
    notify: Arc<Notify>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self {
            notify: Arc::new(Notify::new()),
        }
    }

    /// Get a handle that resolves once shutdown begins.
    pub fn subscribe(&self) -> ShutdownNotifier {
        ShutdownNotifier {
            notify: self.notify.clone(),
        }
    }

    /// Block until a termination signal arrives, then notify subscribers.
    pub async fn wait_for_signal(&self) {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("failed to install ctrl-c handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("received ctrl-c"),
            _ = terminate => info!("received SIGTERM"),
        }

        self.notify.notify_waiters();
    }

    /// Trigger shutdown without a signal.
    pub fn shutdown(&self) {
        info!("manual shutdown triggered");
        self.notify.notify_waiters();
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-component shutdown handle.
#[derive(Clone)]
pub struct ShutdownNotifier {
    notify: Arc<Notify>,
}

impl ShutdownNotifier {
    pub async fn wait(&self) {
        self.notify.notified().await;
    }
}

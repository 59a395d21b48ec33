//! Gateway metrics with Prometheus text export

use crate::error::ActionError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Counters fed from the HTTP boundary as actions complete.
pub struct GatewayMetrics {
    start_time: Instant,
    actions_total: AtomicU64,
    rate_limited_total: AtomicU64,
    validation_failures_total: AtomicU64,
    auth_failures_total: AtomicU64,
    conflict_total: AtomicU64,
    not_found_total: AtomicU64,
    backend_failures_total: AtomicU64,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            actions_total: AtomicU64::new(0),
            rate_limited_total: AtomicU64::new(0),
            validation_failures_total: AtomicU64::new(0),
            auth_failures_total: AtomicU64::new(0),
            conflict_total: AtomicU64::new(0),
            not_found_total: AtomicU64::new(0),
            backend_failures_total: AtomicU64::new(0),
        }
    }

    /// Count one action invocation.
    pub fn record_action(&self) {
        self.actions_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a failed action under the counter matching its kind.
    pub fn record_failure(&self, err: &ActionError) {
        let counter = match err {
            ActionError::RateLimited(_) => &self.rate_limited_total,
            ActionError::Validation(_) | ActionError::InvalidOption => {
                &self.validation_failures_total
            }
            ActionError::Unauthenticated
            | ActionError::Forbidden
            | ActionError::InvalidCredentials => &self.auth_failures_total,
            ActionError::AlreadyVoted | ActionError::EmailTaken => &self.conflict_total,
            ActionError::NotFound => &self.not_found_total,
            ActionError::Backend => &self.backend_failures_total,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Render all counters in Prometheus text exposition format.
    pub fn export_prometheus(&self) -> String {
        let mut output = String::new();

        let counters = [
            (
                "poll_gateway_actions_total",
                "Actions processed",
                self.actions_total.load(Ordering::Relaxed),
            ),
            (
                "poll_gateway_rate_limited_total",
                "Actions denied by the rate limiter",
                self.rate_limited_total.load(Ordering::Relaxed),
            ),
            (
                "poll_gateway_validation_failures_total",
                "Actions rejected by input validation",
                self.validation_failures_total.load(Ordering::Relaxed),
            ),
            (
                "poll_gateway_auth_failures_total",
                "Actions rejected for missing identity or ownership",
                self.auth_failures_total.load(Ordering::Relaxed),
            ),
            (
                "poll_gateway_conflict_total",
                "Actions rejected by uniqueness constraints",
                self.conflict_total.load(Ordering::Relaxed),
            ),
            (
                "poll_gateway_not_found_total",
                "Actions referencing absent resources",
                self.not_found_total.load(Ordering::Relaxed),
            ),
            (
                "poll_gateway_backend_failures_total",
                "Actions failed by the backend",
                self.backend_failures_total.load(Ordering::Relaxed),
            ),
        ];

        for (name, help, value) in counters {
            output.push_str(&format!("# HELP {} {}\n", name, help));
            output.push_str(&format!("# TYPE {} counter\n", name));
            output.push_str(&format!("{} {}\n", name, value));
        }

        output.push_str("# HELP poll_gateway_uptime_seconds Process uptime\n");
        output.push_str("# TYPE poll_gateway_uptime_seconds gauge\n");
        output.push_str(&format!(
            "poll_gateway_uptime_seconds {}\n",
            self.start_time.elapsed().as_secs()
        ));

        output
    }
}

impl Default for GatewayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_land_in_their_counters() {
        let metrics = GatewayMetrics::new();

        metrics.record_action();
        metrics.record_action();
        metrics.record_failure(&ActionError::Unauthenticated);
        metrics.record_failure(&ActionError::NotFound);
        metrics.record_failure(&ActionError::Backend);

        let export = metrics.export_prometheus();
        assert!(export.contains("poll_gateway_actions_total 2"));
        assert!(export.contains("poll_gateway_auth_failures_total 1"));
        assert!(export.contains("poll_gateway_not_found_total 1"));
        assert!(export.contains("poll_gateway_backend_failures_total 1"));
        assert!(export.contains("poll_gateway_rate_limited_total 0"));
    }
}

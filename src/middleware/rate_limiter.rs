//! Sliding-window rate limiting for gateway actions

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum attempts per key per window
    pub max_attempts: usize,
    /// Window length; counters reset lazily once it elapses
    pub window: Duration,
    /// Whether the gate is active
    pub enabled: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window: Duration::from_secs(60),
            enabled: true,
        }
    }
}

/// Outcome of recording one attempt against a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Allowed { remaining: usize },
    Denied { retry_after: Duration },
}

/// Storage for per-key attempt counters.
///
/// The in-memory table is the only implementation shipped; the trait is the
/// seam for moving counters into a shared external store without touching
/// the call sites.
pub trait AttemptStore: Send + Sync {
    /// Record an attempt under `key`. A counter whose window has elapsed is
    /// reset before the attempt is counted; a denied attempt leaves the
    /// counter untouched.
    fn record(&self, key: &str, max_attempts: usize, window: Duration) -> Attempt;

    /// Drop the counter for `key`.
    fn clear(&self, key: &str);
}

#[derive(Debug)]
struct CounterEntry {
    count: usize,
    window_start: Instant,
}

/// Process-wide counter table on a lock-free map.
///
/// Entries are mutated in place and never evicted; an expired entry is
/// reset on the next attempt under its key.
#[derive(Default)]
pub struct MemoryAttemptStore {
    counters: DashMap<String, CounterEntry>,
}

impl MemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttemptStore for MemoryAttemptStore {
    fn record(&self, key: &str, max_attempts: usize, window: Duration) -> Attempt {
        let now = Instant::now();

        let mut entry = self
            .counters
            .entry(key.to_string())
            .or_insert(CounterEntry {
                count: 0,
                window_start: now,
            });
        let counter = entry.value_mut();

        if now.duration_since(counter.window_start) >= window {
            counter.count = 0;
            counter.window_start = now;
        }

        if counter.count >= max_attempts {
            let retry_after =
                window.saturating_sub(now.duration_since(counter.window_start));
            return Attempt::Denied { retry_after };
        }

        counter.count += 1;
        Attempt::Allowed {
            remaining: max_attempts - counter.count,
        }
    }

    fn clear(&self, key: &str) {
        self.counters.remove(key);
    }
}

/// Key-scoped gate bounding repeated actions per identity per window.
///
/// Keys are `"{action}:{identity}"` strings built by the action layer; all
/// anonymous callers of one action share a single key. Check and increment
/// happen under the map entry's shard lock, so a single process never
/// undercounts. This remains a best-effort, in-process guard: state is gone
/// on restart and not shared across nodes.
pub struct RateLimiter {
    config: RateLimitConfig,
    store: Arc<dyn AttemptStore>,
}

impl RateLimiter {
    /// Create a rate limiter backed by the in-memory counter table.
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_store(config, Arc::new(MemoryAttemptStore::new()))
    }

    /// Create a rate limiter over a caller-supplied counter store.
    pub fn with_store(config: RateLimitConfig, store: Arc<dyn AttemptStore>) -> Self {
        Self { config, store }
    }

    /// Record an attempt under `key` and decide whether it may proceed.
    pub fn check(&self, key: &str) -> Result<(), RateLimitError> {
        if !self.config.enabled {
            return Ok(());
        }

        match self
            .store
            .record(key, self.config.max_attempts, self.config.window)
        {
            Attempt::Allowed { remaining } => {
                debug!(key, remaining, "attempt allowed");
                Ok(())
            }
            Attempt::Denied { retry_after } => {
                warn!(key, ?retry_after, "rate limit exceeded");
                Err(RateLimitError::LimitExceeded { retry_after })
            }
        }
    }

    /// Forget the counter for `key`.
    pub fn reset(&self, key: &str) {
        self.store.clear(key);
        debug!(key, "rate limit reset");
    }
}

/// Rate limit error
#[derive(Debug, Clone, thiserror::Error)]
pub enum RateLimitError {
    #[error("too many attempts, please try again later")]
    LimitExceeded { retry_after: Duration },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_attempts: usize, window: Duration) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_attempts,
            window,
            enabled: true,
        })
    }

    #[test]
    fn allows_up_to_the_limit() {
        let limiter = limiter(5, Duration::from_secs(60));

        for i in 0..5 {
            assert!(limiter.check("vote:alice").is_ok(), "attempt {} should pass", i);
        }
    }

    #[test]
    fn denies_past_the_limit() {
        let limiter = limiter(3, Duration::from_secs(60));

        for _ in 0..3 {
            assert!(limiter.check("vote:alice").is_ok());
        }
        assert!(limiter.check("vote:alice").is_err());
        // denied attempts do not consume the counter
        assert!(limiter.check("vote:alice").is_err());
    }

    #[tokio::test]
    async fn window_reset_allows_again() {
        let limiter = limiter(2, Duration::from_millis(100));

        limiter.check("login:anon").unwrap();
        limiter.check("login:anon").unwrap();
        assert!(limiter.check("login:anon").is_err());

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(limiter.check("login:anon").is_ok());
    }

    #[test]
    fn keys_are_independent() {
        let limiter = limiter(2, Duration::from_secs(60));

        limiter.check("vote:alice").unwrap();
        limiter.check("vote:alice").unwrap();
        assert!(limiter.check("vote:alice").is_err());

        assert!(limiter.check("vote:bob").is_ok());
        assert!(limiter.check("delete-poll:alice").is_ok());
    }

    #[test]
    fn disabled_gate_always_allows() {
        let limiter = RateLimiter::new(RateLimitConfig {
            max_attempts: 1,
            window: Duration::from_secs(60),
            enabled: false,
        });

        for _ in 0..10 {
            assert!(limiter.check("vote:alice").is_ok());
        }
    }

    #[test]
    fn reset_clears_the_counter() {
        let limiter = limiter(1, Duration::from_secs(60));

        limiter.check("register:anon").unwrap();
        assert!(limiter.check("register:anon").is_err());

        limiter.reset("register:anon");
        assert!(limiter.check("register:anon").is_ok());
    }
}

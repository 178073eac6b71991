//! In-memory sliding-window rate limiter
//!
//! Limits each client key to a fixed number of analysis submissions per
//! time window. State lives in-process; every entry holds the timestamps
//! of the requests still inside the window, and `prune` drops keys whose
//! window has fully drained.

use crate::config::LimitsConfig;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed
    pub allowed: bool,

    /// Seconds until the client may retry; zero when allowed
    pub retry_after_seconds: u64,
}

/// Sliding-window rate limiter keyed by client identity
pub struct RateLimiter {
    state: Mutex<HashMap<String, Vec<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    /// Creates a limiter allowing `max_requests` per `window` per key
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            state: Mutex::new(HashMap::new()),
            max_requests,
            window,
        }
    }

    /// Creates a limiter from the configured limits
    pub fn from_config(limits: &LimitsConfig) -> Self {
        Self::new(limits.max_requests, Duration::from_secs(limits.window_seconds))
    }

    /// Checks whether a request from `key` may proceed, recording it if so
    ///
    /// When denied, `retry_after_seconds` is the time until the oldest
    /// in-window request slides out, rounded up.
    pub fn check(&self, key: &str) -> RateLimitDecision {
        let now = Instant::now();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let timestamps = state.entry(key.to_string()).or_default();
        timestamps.retain(|t| now.duration_since(*t) < self.window);

        if timestamps.len() >= self.max_requests {
            let oldest = timestamps[0];
            let retry_after = self.window.saturating_sub(now.duration_since(oldest));
            return RateLimitDecision {
                allowed: false,
                retry_after_seconds: retry_after.as_secs_f64().ceil() as u64,
            };
        }

        timestamps.push(now);
        RateLimitDecision {
            allowed: true,
            retry_after_seconds: 0,
        }
    }

    /// Drops keys whose requests have all left the window
    pub fn prune(&self) {
        let now = Instant::now();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.retain(|_, timestamps| {
            timestamps.retain(|t| now.duration_since(*t) < self.window);
            !timestamps.is_empty()
        });
    }
}

//! Rate limit storage backends.

use super::types::{RateLimitConfig, RateLimitState};
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Trait for rate limit storage.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Check if request is allowed and consume a token.
    async fn check_and_consume(&self, key: &str, config: &RateLimitConfig) -> RateLimitResult;
}

/// Result of rate limit check.
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Until the bucket is full again.
    pub reset_after: Duration,
    pub retry_after: Option<Duration>,
}

/// Buckets tracked before refilled ones are swept.
pub const DEFAULT_SWEEP_THRESHOLD: usize = 10_000;

/// In-memory rate limit store.
///
/// Once the map reaches its sweep threshold, buckets that have refilled
/// completely are dropped before a new key is inserted.
pub struct InMemoryStore {
    states: DashMap<String, RateLimitState>,
    sweep_threshold: usize,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::with_sweep_threshold(DEFAULT_SWEEP_THRESHOLD)
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sweep_threshold(sweep_threshold: usize) -> Self {
        Self {
            states: DashMap::new(),
            sweep_threshold: sweep_threshold.max(1),
        }
    }

    /// Drop every bucket that has refilled by `now`. Returns how many went.
    pub fn sweep(&self, now: Instant) -> usize {
        let before = self.states.len();
        self.states.retain(|_, state| !state.is_refilled(now));
        let removed = before.saturating_sub(self.states.len());
        if removed > 0 {
            debug!(removed, remaining = self.states.len(), "Swept idle rate limit buckets");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryStore {
    async fn check_and_consume(&self, key: &str, config: &RateLimitConfig) -> RateLimitResult {
        let now = Instant::now();
        if self.states.len() >= self.sweep_threshold && !self.states.contains_key(key) {
            self.sweep(now);
        }

        let mut entry = self
            .states
            .entry(key.to_string())
            .or_insert_with(|| RateLimitState::new(config));

        let state = entry.value_mut();
        let allowed = state.try_consume(now);

        RateLimitResult {
            allowed,
            limit: state.max_tokens,
            remaining: state.tokens,
            reset_after: state.reset_after(now),
            retry_after: if allowed {
                None
            } else {
                Some(state.retry_after(now))
            },
        }
    }
}

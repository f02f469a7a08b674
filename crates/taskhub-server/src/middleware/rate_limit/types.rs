//! Rate limiting types.

use std::time::{Duration, Instant};

/// Rate limit configuration. Buckets are keyed by client address.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed per window.
    pub max_requests: u32,
    /// Time window for the limit.
    pub window: Duration,
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }
}

/// Token bucket for one key.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    /// Current token count.
    pub tokens: u32,
    /// Last refill timestamp.
    pub last_refill: Instant,
    pub max_tokens: u32,
    /// Tokens per second.
    pub refill_rate: f64,
}

impl RateLimitState {
    pub fn new(config: &RateLimitConfig) -> Self {
        let max_tokens = config.max_requests;
        let refill_rate = f64::from(config.max_requests) / config.window.as_secs_f64().max(1.0);

        Self {
            tokens: max_tokens,
            last_refill: Instant::now(),
            max_tokens,
            refill_rate,
        }
    }

    /// Refill tokens based on elapsed time.
    pub fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill);
        let new_tokens = (elapsed.as_secs_f64() * self.refill_rate) as u32;

        if new_tokens > 0 {
            self.tokens = self.tokens.saturating_add(new_tokens).min(self.max_tokens);
            self.last_refill = now;
        }
    }

    /// Try to consume a token. Returns true if successful.
    pub fn try_consume(&mut self, now: Instant) -> bool {
        self.refill(now);

        if self.tokens > 0 {
            self.tokens -= 1;
            true
        } else {
            false
        }
    }

    /// Time until the next token is available.
    pub fn retry_after(&self, now: Instant) -> Duration {
        if self.tokens > 0 {
            return Duration::ZERO;
        }
        let per_token = Duration::from_secs_f64(1.0 / self.refill_rate);
        (self.last_refill + per_token).saturating_duration_since(now)
    }

    /// True once enough time has passed for the bucket to be full again.
    /// A full bucket carries no information and can be dropped.
    pub fn is_refilled(&self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        f64::from(self.tokens) + elapsed * self.refill_rate >= f64::from(self.max_tokens)
    }

    /// Time until the bucket is full again.
    pub fn reset_after(&self, now: Instant) -> Duration {
        let missing = self.max_tokens.saturating_sub(self.tokens);
        let full_at = self.last_refill + Duration::from_secs_f64(f64::from(missing) / self.refill_rate);
        full_at.saturating_duration_since(now)
    }
}

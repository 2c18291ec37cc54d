use crate::config::RateLimit;
use crate::error::AppError;
use dashmap::DashMap;
use std::time::Instant;

#[derive(Clone)]
struct Bucket {
    capacity: u32,
    tokens: f64,
    refill_rate: f64,
    last_update: Instant,
}

impl Bucket {
    fn new(limit: RateLimit) -> Self {
        Self {
            capacity: limit.capacity,
            tokens: limit.capacity as f64,
            refill_rate: limit.refill_per_sec,
            last_update: Instant::now(),
        }
    }

    fn allow_request(&mut self, now: Instant) -> bool {
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        self.tokens = f64::min(
            self.capacity as f64,
            self.tokens + elapsed * self.refill_rate,
        );
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Token buckets keyed by caller and action, e.g. `"alice:transactions"`
#[derive(Default)]
pub struct RateLimiter {
    buckets: DashMap<String, Bucket>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check_rate_limit(&self, key: &str, limit: RateLimit) -> Result<(), AppError> {
        let mut bucket = self
            .buckets
            .entry(key.to_string())
            .or_insert_with(|| Bucket::new(limit));

        if bucket.allow_request(Instant::now()) {
            Ok(())
        } else {
            tracing::warn!(key, "Rate limit exceeded");
            Err(AppError::RateLimitExceeded(format!("Rate limit for {}", key)))
        }
    }
}

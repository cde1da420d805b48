// src/backend/utils/rate_limit.rs
use crate::error::NoteError;
use crate::models::common::TimestampNs;
use candid::Principal;
use std::collections::HashMap;

const REFILL_RATE_PER_SEC: f64 = 1.0; // Tokens added per second

struct TokenBucket {
    tokens: f64,
    last_refill_time_ns: TimestampNs,
}

impl TokenBucket {
    fn new(capacity: u32, now_ns: TimestampNs) -> Self {
        TokenBucket {
            tokens: capacity as f64,
            last_refill_time_ns: now_ns,
        }
    }

    fn refill(&mut self, capacity: u32, now_ns: TimestampNs) {
        let elapsed_secs =
            now_ns.saturating_sub(self.last_refill_time_ns) as f64 / 1_000_000_000.0;
        self.tokens = (self.tokens + elapsed_secs * REFILL_RATE_PER_SEC).min(capacity as f64);
        self.last_refill_time_ns = now_ns.max(self.last_refill_time_ns);
    }

    fn take(&mut self, capacity: u32, now_ns: TimestampNs) -> bool {
        self.refill(capacity, now_ns);
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Per-principal token buckets. Lives in heap memory and is cleared on upgrade.
pub struct RateLimiter {
    capacity: u32,
    buckets: HashMap<Principal, TokenBucket>,
}

impl RateLimiter {
    pub fn new(capacity: u32) -> Self {
        RateLimiter {
            capacity,
            buckets: HashMap::new(),
        }
    }

    pub fn set_capacity(&mut self, capacity: u32) {
        self.capacity = capacity;
    }

    /// Consumes one token for `caller`.
    ///
    /// # Errors
    ///
    /// Returns `NoteError::RateLimitExceeded` when the bucket is empty.
    pub fn check(&mut self, caller: Principal, now_ns: TimestampNs) -> Result<(), NoteError> {
        let capacity = self.capacity;
        let bucket = self
            .buckets
            .entry(caller)
            .or_insert_with(|| TokenBucket::new(capacity, now_ns));

        if bucket.take(capacity, now_ns) {
            Ok(())
        } else {
            Err(NoteError::RateLimitExceeded(format!(
                "Rate limit exceeded for principal {}. Please try again later.",
                caller
            )))
        }
    }
}

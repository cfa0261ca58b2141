//! Rate Limiter (Token Bucket Algorithm)
//!
//! Guards the mutating RPC methods against request floods. The bucket state
//! lives in a single atomic word so concurrent handlers never take a lock.

use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Bucket state is kept in thousandths of a token so slow refill rates
/// still accumulate between calls.
const MILLI: u64 = 1000;

/// Upper bound that keeps `burst * MILLI` inside the packed 32 bits
const MAX_BURST: u32 = 4_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum burst size
    pub burst: u32,
    /// Tokens added per second
    pub per_second: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            burst: 200,
            per_second: 100,
        }
    }
}

/// Token bucket shared by every RPC handler
pub struct RateLimiter {
    // Upper 32 bits: available milli-tokens
    // Lower 32 bits: last refill, ms since `origin` (wrapping)
    packed: AtomicU64,
    origin: Instant,
    capacity_milli: u64,
    per_second: u64,
}

fn pack(milli_tokens: u64, stamp_ms: u32) -> u64 {
    (milli_tokens << 32) | u64::from(stamp_ms)
}

fn unpack(packed: u64) -> (u64, u32) {
    (packed >> 32, (packed & 0xFFFF_FFFF) as u32)
}

impl RateLimiter {
    /// Bucket starts full
    pub fn new(config: RateLimitConfig) -> Self {
        let capacity_milli = u64::from(config.burst.min(MAX_BURST)) * MILLI;
        Self {
            packed: AtomicU64::new(pack(capacity_milli, 0)),
            origin: Instant::now(),
            capacity_milli,
            per_second: u64::from(config.per_second),
        }
    }

    fn stamp(&self) -> u32 {
        // Truncation is intended: deltas are computed with wrapping_sub
        self.origin.elapsed().as_millis() as u32
    }

    /// Take one token; `false` means the caller is throttled
    pub fn try_acquire(&self) -> bool {
        let mut current = self.packed.load(Ordering::Acquire);
        loop {
            let (milli_tokens, last_ms) = unpack(current);
            let now_ms = self.stamp();
            let elapsed = u64::from(now_ms.wrapping_sub(last_ms));

            // elapsed ms * tokens/s = milli-tokens
            let refilled = (milli_tokens + elapsed * self.per_second).min(self.capacity_milli);
            let (remaining, granted) = if refilled >= MILLI {
                (refilled - MILLI, true)
            } else {
                (refilled, false)
            };

            match self.packed.compare_exchange_weak(
                current,
                pack(remaining, now_ms),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return granted,
                Err(actual) => current = actual,
            }
        }
    }

    /// Whole tokens left, without refilling
    pub fn available(&self) -> u64 {
        unpack(self.packed.load(Ordering::Acquire)).0 / MILLI
    }
}

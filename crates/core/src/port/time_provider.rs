// Time Provider Port (for testability)

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Time provider interface (allows mocking in tests)
pub trait TimeProvider: Send + Sync {
    /// Get current time in milliseconds since epoch
    fn now_millis(&self) -> i64;

    /// Offset of the local wall clock. Demand multipliers use local hours.
    fn utc_offset(&self) -> FixedOffset {
        Utc.fix()
    }

    /// Current local wall-clock time
    fn local_now(&self) -> DateTime<FixedOffset> {
        DateTime::<Utc>::from_timestamp_millis(self.now_millis())
            .unwrap_or_default()
            .with_timezone(&self.utc_offset())
    }
}

/// System time provider (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn utc_offset(&self) -> FixedOffset {
        *chrono::Local::now().offset()
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Manually driven clock (UTC unless an offset is given)
    pub struct FixedTimeProvider {
        now: AtomicI64,
        offset: FixedOffset,
    }

    impl FixedTimeProvider {
        pub fn new(now_millis: i64) -> Self {
            Self {
                now: AtomicI64::new(now_millis),
                offset: Utc.fix(),
            }
        }

        /// Clock pinned to a UTC calendar time
        pub fn at_utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
            let millis = Utc
                .with_ymd_and_hms(year, month, day, hour, minute, 0)
                .single()
                .map(|dt| dt.timestamp_millis())
                .unwrap_or_default();
            Self::new(millis)
        }

        pub fn set(&self, now_millis: i64) {
            self.now.store(now_millis, Ordering::SeqCst);
        }

        pub fn advance(&self, millis: i64) {
            self.now.fetch_add(millis, Ordering::SeqCst);
        }
    }

    impl TimeProvider for FixedTimeProvider {
        fn now_millis(&self) -> i64 {
            self.now.load(Ordering::SeqCst)
        }

        fn utc_offset(&self) -> FixedOffset {
            self.offset
        }
    }
}

// Application constants (No magic values)
use std::time::Duration;

/// Attempts for a call-next that keeps losing storage races
pub const CALL_NEXT_MAX_ATTEMPTS: u32 = 3;

/// Base delay between call-next attempts (linear, plus jitter of the same size)
pub const CALL_NEXT_RETRY_BASE_DELAY: Duration = Duration::from_millis(20);

/// Reload-and-retry budget when a status compare-and-set loses
pub const TRANSITION_MAX_ATTEMPTS: u32 = 3;

/// Agent ids are opaque but bounded
pub const MAX_AGENT_ID_LEN: usize = 128;

/// Default maintenance cadence (hours)
pub const DEFAULT_MAINTENANCE_INTERVAL_HOURS: u64 = 24;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Returns the current Unix timestamp in milliseconds.
pub fn current_unix_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .try_into()
        .unwrap_or(u64::MAX)
}

/// Returns the current Unix timestamp in seconds.
pub fn current_unix_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Returns true when `expires_unix` is present and no longer in the future.
pub fn is_expired_unix(expires_unix: Option<u64>, now_unix: u64) -> bool {
    matches!(expires_unix, Some(value) if value <= now_unix)
}

/// Returns an RFC 3339 / ISO-8601 timestamp for `unix_ms`, always in UTC.
pub fn iso8601_from_unix_ms(unix_ms: u64) -> String {
    let seconds = (unix_ms / 1_000) as i64;
    let nanos = ((unix_ms % 1_000) * 1_000_000) as u32;
    chrono::DateTime::<chrono::Utc>::from_timestamp(seconds, nanos)
        .unwrap_or_default()
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Source of wall-clock time, injectable so trial execution and report
/// generation stay deterministic under test.
///
/// Every intentional source of nondeterminism in the benchmark core
/// (dynamic scenario variables, `generatedAt` on a rendered report) reads
/// the current time through this trait rather than calling
/// [`std::time::SystemTime`] directly.
pub trait Clock: Send + Sync {
    fn now_unix_ms(&self) -> u64;

    fn now_iso8601(&self) -> String {
        iso8601_from_unix_ms(self.now_unix_ms())
    }
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_ms(&self) -> u64 {
        current_unix_timestamp_ms()
    }
}

/// A clock pinned to a fixed instant, or one that advances by a fixed
/// step on every read. Used by tests that assert on timestamps.
#[derive(Debug, Clone)]
pub struct FixedClock {
    next_unix_ms: Arc<AtomicU64>,
    step_ms: u64,
}

impl FixedClock {
    pub fn at(unix_ms: u64) -> Self {
        Self {
            next_unix_ms: Arc::new(AtomicU64::new(unix_ms)),
            step_ms: 0,
        }
    }

    pub fn ticking_from(unix_ms: u64, step_ms: u64) -> Self {
        Self {
            next_unix_ms: Arc::new(AtomicU64::new(unix_ms)),
            step_ms,
        }
    }
}

impl Clock for FixedClock {
    fn now_unix_ms(&self) -> u64 {
        self.next_unix_ms.fetch_add(self.step_ms, Ordering::SeqCst)
    }
}

/// A shared handle to a [`Clock`] implementation, cheap to clone into each
/// trial and the reporter.
pub type SharedClock = Arc<dyn Clock>;

pub fn system_clock() -> SharedClock {
    Arc::new(SystemClock)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_utils_round_trip_bounds() {
        let now_s = current_unix_timestamp();
        let now_ms = current_unix_timestamp_ms();
        let now_ms_s = now_ms / 1_000;
        assert!(now_ms_s >= now_s);
        assert!(now_ms_s <= now_s.saturating_add(1));
    }

    #[test]
    fn is_expired_unix_respects_none_and_bounds() {
        let now = current_unix_timestamp();
        assert!(!is_expired_unix(None, now));
        assert!(is_expired_unix(Some(now), now));
        assert!(is_expired_unix(Some(now.saturating_sub(1)), now));
        assert!(!is_expired_unix(Some(now.saturating_add(1)), now));
    }

    #[test]
    fn fixed_clock_returns_pinned_value_until_advanced() {
        let clock = FixedClock::at(1_700_000_000_000);
        assert_eq!(clock.now_unix_ms(), 1_700_000_000_000);
        assert_eq!(clock.now_unix_ms(), 1_700_000_000_000);
    }

    #[test]
    fn fixed_clock_ticks_by_configured_step() {
        let clock = FixedClock::ticking_from(1_000, 50);
        assert_eq!(clock.now_unix_ms(), 1_000);
        assert_eq!(clock.now_unix_ms(), 1_050);
        assert_eq!(clock.now_unix_ms(), 1_100);
    }

    #[test]
    fn iso8601_formats_as_utc_rfc3339() {
        let formatted = iso8601_from_unix_ms(1_700_000_000_000);
        assert!(formatted.ends_with('Z'));
        assert!(formatted.starts_with("2023-11-14"));
    }
}

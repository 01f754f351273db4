//! Clock abstraction for snapkeep.
//!
//! Provides a trait for reading the current time, with a real implementation
//! and deterministic mocks so time-driven logic can be tested without waiting.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Trait for reading the current Unix timestamp.
///
/// Timestamps are signed: tier last-run values read back from pool
/// properties are arbitrary `i64`s and flow through the same arithmetic.
pub trait Clock: Send + Sync {
    /// Returns the current time as Unix seconds since epoch.
    fn now_unix_sec(&self) -> i64;
}

/// Real system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_sec(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before Unix epoch")
            .as_secs() as i64
    }
}

/// Mock clock holding a settable timestamp.
///
/// Clones share the same underlying instant, so a test can hand one copy to
/// the code under test and keep another to move time forward.
#[derive(Debug, Clone)]
pub struct MockClock {
    now: Arc<AtomicI64>,
}

impl MockClock {
    /// Create a mock clock at a fixed timestamp.
    pub fn new(timestamp: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(timestamp)),
        }
    }

    /// Move the clock to an absolute timestamp.
    pub fn set(&self, timestamp: i64) {
        self.now.store(timestamp, Ordering::SeqCst);
    }

    /// Advance the clock by `seconds`.
    pub fn advance(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now_unix_sec(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Mock clock that advances by a fixed step on every read.
#[derive(Debug, Clone)]
pub struct AdvancingClock {
    now: Arc<AtomicI64>,
    step: i64,
}

impl AdvancingClock {
    /// Create an advancing clock starting at `timestamp`, moving forward by
    /// `step` seconds per read.
    pub fn new(timestamp: i64, step: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(timestamp)),
            step,
        }
    }
}

impl Clock for AdvancingClock {
    fn now_unix_sec(&self) -> i64 {
        self.now.fetch_add(self.step, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_clock_returns_fixed_timestamp() {
        let clock = MockClock::new(1234567890);
        assert_eq!(clock.now_unix_sec(), 1234567890);
        assert_eq!(clock.now_unix_sec(), 1234567890);
    }

    #[test]
    fn test_mock_clock_set_and_advance() {
        let clock = MockClock::new(100);
        clock.set(500);
        assert_eq!(clock.now_unix_sec(), 500);
        clock.advance(60);
        assert_eq!(clock.now_unix_sec(), 560);
    }

    #[test]
    fn test_mock_clock_clones_share_state() {
        let clock = MockClock::new(0);
        let observer = clock.clone();
        clock.set(42);
        assert_eq!(observer.now_unix_sec(), 42);
    }

    #[test]
    fn test_mock_clock_negative_timestamp() {
        let clock = MockClock::new(-1);
        assert_eq!(clock.now_unix_sec(), -1);
    }

    #[test]
    fn test_advancing_clock_steps_per_read() {
        let clock = AdvancingClock::new(1000, 15);
        assert_eq!(clock.now_unix_sec(), 1000);
        assert_eq!(clock.now_unix_sec(), 1015);
        assert_eq!(clock.now_unix_sec(), 1030);
    }

    #[test]
    fn test_advancing_clock_clones_share_state() {
        let clock = AdvancingClock::new(0, 1);
        let other = clock.clone();
        assert_eq!(clock.now_unix_sec(), 0);
        assert_eq!(other.now_unix_sec(), 1);
    }

    #[test]
    fn test_system_clock_returns_reasonable_time() {
        let clock = SystemClock;
        let now = clock.now_unix_sec();

        // After 2020-01-01, before 2100-01-01.
        assert!(now > 1577836800);
        assert!(now < 4102444800);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock;
        let t1 = clock.now_unix_sec();
        let t2 = clock.now_unix_sec();
        assert!(t2 >= t1);
    }

    #[test]
    fn test_clock_trait_object() {
        let mock: Box<dyn Clock> = Box::new(MockClock::new(7));
        assert_eq!(mock.now_unix_sec(), 7);
    }
}

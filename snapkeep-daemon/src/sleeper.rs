//! Sleep abstraction for the scheduler loop.
//!
//! The loop never calls `thread::sleep` directly; it goes through this
//! trait so tests can drive time instead of waiting on it.

use std::time::Duration;

/// Trait for sleeping between scheduler wakeups.
pub trait Sleeper: Send + Sync {
    /// Sleep for the specified number of seconds.
    fn sleep_sec(&self, seconds: u64);
}

/// Real sleeper backed by `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealSleeper;

impl Sleeper for RealSleeper {
    fn sleep_sec(&self, seconds: u64) {
        std::thread::sleep(Duration::from_secs(seconds));
    }
}

/// Sleeper that returns immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockSleeper;

impl Sleeper for MockSleeper {
    fn sleep_sec(&self, _seconds: u64) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_sleeper_returns_immediately() {
        let sleeper = MockSleeper;
        let start = std::time::Instant::now();
        sleeper.sleep_sec(3600);
        assert!(start.elapsed().as_millis() < 10);
    }

    #[test]
    fn test_sleeper_trait_object() {
        let sleeper: Box<dyn Sleeper> = Box::new(MockSleeper);
        sleeper.sleep_sec(1);
    }
}

//! Signal handling for graceful shutdown.
//!
//! A `ShutdownFlag` is set on SIGINT, SIGTERM or SIGHUP (the `ctrlc` crate
//! with the `termination` feature registers all three). The scheduler loop
//! polls the flag between sleep slices; jobs already in flight run to
//! completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Trait for checking whether shutdown has been requested.
pub trait ShutdownCheck: Send + Sync {
    fn should_stop(&self) -> bool;
}

/// Flag shared between the signal handler and the scheduler loop.
#[derive(Debug, Clone)]
pub struct ShutdownFlag {
    flag: Arc<AtomicBool>,
}

impl Default for ShutdownFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownFlag {
    /// Create a flag and register the termination signal handler.
    ///
    /// Handler registration can fail if one is already installed; the flag
    /// is still usable and can be triggered manually.
    pub fn new() -> Self {
        let flag = Arc::new(AtomicBool::new(false));
        let handler_flag = flag.clone();
        let _ = ctrlc::set_handler(move || {
            handler_flag.store(true, Ordering::SeqCst);
        });
        Self { flag }
    }

    /// Create a flag without registering a handler.
    pub fn manual() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request shutdown programmatically.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl ShutdownCheck for ShutdownFlag {
    fn should_stop(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Check that never signals shutdown.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverShutdown;

impl ShutdownCheck for NeverShutdown {
    fn should_stop(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_flag_initially_unset() {
        let flag = ShutdownFlag::manual();
        assert!(!flag.should_stop());
    }

    #[test]
    fn test_trigger_sets_flag() {
        let flag = ShutdownFlag::manual();
        flag.trigger();
        assert!(flag.should_stop());
    }

    #[test]
    fn test_clones_share_state() {
        let flag = ShutdownFlag::manual();
        let observer = flag.clone();
        flag.trigger();
        assert!(observer.should_stop());
    }

    #[test]
    fn test_never_shutdown() {
        assert!(!NeverShutdown.should_stop());
    }
}

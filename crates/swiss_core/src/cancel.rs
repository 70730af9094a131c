//! Cooperative cancellation for long enumerations.
//!
//! Scenario enumeration grows as 2^k in the number of impact matches, so
//! long-running calls take a `CancelToken` that is polled between units of
//! work. A token can be stopped by hand or expire after a time limit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Thread-safe stop flag with an optional deadline.
///
/// Clones share the same flag, so a token handed to a worker can be stopped
/// from the caller's side. `is_cancelled()` is a single atomic load.
#[derive(Debug, Clone)]
pub struct CancelToken {
    /// Shared stop flag
    stopped: Arc<AtomicBool>,
    /// When the clock was started
    start_time: Arc<RwLock<Option<Instant>>>,
    /// Time budget (None = no deadline)
    time_limit: Option<Duration>,
}

impl CancelToken {
    /// Create a token. The deadline only applies after `start()`.
    pub fn new(time_limit: Option<Duration>) -> Self {
        Self {
            stopped: Arc::new(AtomicBool::new(false)),
            start_time: Arc::new(RwLock::new(None)),
            time_limit,
        }
    }

    /// Token that is only stopped by hand
    pub fn unlimited() -> Self {
        Self::new(None)
    }

    /// Start the clock and clear any earlier stop.
    pub fn start(&self) {
        *self.start_time.write().unwrap_or_else(|e| e.into_inner()) = Some(Instant::now());
        self.stopped.store(false, Ordering::SeqCst);
    }

    /// Request that work stops as soon as possible.
    pub fn cancel(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    /// Check the deadline and latch the stop flag if it passed.
    pub fn check(&self) -> bool {
        if self.is_cancelled() {
            return true;
        }

        if let Some(limit) = self.time_limit {
            if self.elapsed() >= limit && self.started() {
                self.cancel();
                return true;
            }
        }

        false
    }

    fn started(&self) -> bool {
        self.start_time
            .read()
            .map(|s| s.is_some())
            .unwrap_or(false)
    }

    /// Time since `start()`, zero if never started.
    pub fn elapsed(&self) -> Duration {
        self.start_time
            .read()
            .ok()
            .and_then(|s| s.map(|t| t.elapsed()))
            .unwrap_or(Duration::ZERO)
    }

    /// Remaining budget (None if no limit).
    pub fn remaining(&self) -> Option<Duration> {
        let limit = self.time_limit?;
        Some(limit.saturating_sub(self.elapsed()))
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::unlimited()
    }
}

#[cfg(test)]
#[path = "cancel_tests.rs"]
mod cancel_tests;

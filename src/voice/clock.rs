use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Session-relative time source used for cache freshness.
///
/// Readings are offsets from the start of the session and never go backwards.
pub trait SessionClock: Send + Sync {
    fn now(&self) -> Duration;
}

/// Wall-clock monotonic time since construction.
pub struct MonotonicClock {
    started: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionClock for MonotonicClock {
    fn now(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Logical clock advanced explicitly by the host (and by tests).
///
/// Clones share the same counter, so a host can keep one handle and give the
/// other to the panel.
#[derive(Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.millis
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    /// Move to an absolute offset; earlier offsets are ignored.
    pub fn set(&self, at: Duration) {
        self.millis
            .fetch_max(at.as_millis() as u64, Ordering::SeqCst);
    }
}

impl SessionClock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

/// Injectable time source
///
/// TTL checks in the price cache and session expiry both read time through
/// `Clock` so tests can move time forward without sleeping.
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    /// Monotonic time, used for TTL and elapsed-time checks
    fn now(&self) -> Instant;

    /// Wall-clock time, used for user-visible timestamps
    fn utc_now(&self) -> DateTime<Utc>;
}

/// Real system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for tests and simulations
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<(Instant, DateTime<Utc>)>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new((Instant::now(), Utc::now()))),
        }
    }

    /// Move both monotonic and wall-clock time forward
    pub fn advance(&self, by: Duration) {
        let mut guard = self.inner.lock();
        guard.0 += by;
        if let Ok(delta) = chrono::Duration::from_std(by) {
            guard.1 = guard.1 + delta;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.inner.lock().0
    }

    fn utc_now(&self) -> DateTime<Utc> {
        self.inner.lock().1
    }
}

/// Shared clock handle
pub type SharedClock = Arc<dyn Clock>;

pub fn system_clock() -> SharedClock {
    Arc::new(SystemClock)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new();
        let start = clock.now();
        let wall_start = clock.utc_now();

        clock.advance(Duration::from_secs(31));

        assert_eq!(clock.now().duration_since(start), Duration::from_secs(31));
        assert_eq!((clock.utc_now() - wall_start).num_seconds(), 31);
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let other = clock.clone();
        let start = other.now();

        clock.advance(Duration::from_millis(500));

        assert_eq!(other.now().duration_since(start), Duration::from_millis(500));
    }
}

use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

pub const MILLIS_PER_HOUR: i64 = 3_600_000;
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Source of wall-clock time, in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync + Debug {
    fn now_millis(&self) -> i64;
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same instant, so a test can keep one handle and give another to the
/// code under test.
///
/// ```rust
/// use bns_kernel::{Clock, FixedClock, MILLIS_PER_DAY};
///
/// let clock = FixedClock::new(1_000);
/// let shared = clock.clone();
///
/// clock.advance(MILLIS_PER_DAY);
/// assert_eq!(shared.now_millis(), 1_000 + MILLIS_PER_DAY);
/// ```
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<AtomicI64>,
}

impl FixedClock {
    #[must_use]
    pub fn new(now_millis: i64) -> Self {
        Self { now: Arc::new(AtomicI64::new(now_millis)) }
    }

    pub fn set(&self, now_millis: i64) {
        self.now.store(now_millis, Ordering::SeqCst);
    }

    /// Moves the clock by `millis`, backwards when negative.
    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_millis(&self) -> i64 {
        (**self).now_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_set_and_advance() {
        let clock = FixedClock::new(0);
        assert_eq!(clock.now_millis(), 0);

        clock.advance(MILLIS_PER_HOUR);
        assert_eq!(clock.now_millis(), MILLIS_PER_HOUR);

        clock.advance(-2 * MILLIS_PER_HOUR);
        assert_eq!(clock.now_millis(), -MILLIS_PER_HOUR);

        clock.set(42);
        assert_eq!(clock.now_millis(), 42);
    }

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now_millis() > 1_577_836_800_000);
    }

    #[test]
    fn arc_dyn_clock_delegates() {
        let fixed = FixedClock::new(7);
        let clock: Arc<dyn Clock> = Arc::new(fixed.clone());
        fixed.advance(3);
        assert_eq!(clock.now_millis(), 10);
    }
}

use jiff::{SignedDuration, Timestamp};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Source of wall-clock time for a generator.
///
/// Readings are treated as untrusted: a clock may jump backwards at any
/// moment and the generator checks every reading against its last timestamp.
pub trait Clock: Send + Sync {
    /// Returns the current time of the clock
    fn now(&self) -> Timestamp;
    /// Block until the clock is expected to reach the target time.
    ///
    /// May return before the target is reached, for example when the clock
    /// is stepped backwards during the wait. Callers read the clock again
    /// and decide whether to keep waiting.
    fn wait_until(&self, target: Timestamp);
}

/// The operating system's real-time clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }

    fn wait_until(&self, target: Timestamp) {
        // Sleep once for the gap seen now. A clock stepped backwards while
        // we are parked is left for the caller to detect.
        let now = Timestamp::now();
        if now < target {
            let remaining = (target.as_nanosecond() - now.as_nanosecond()) as u64;
            std::thread::sleep(Duration::from_nanos(remaining));
        }
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// hand another to a generator. [`Clock::wait_until`] jumps straight to the
/// target instead of blocking.
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<ManualClockState>>,
}

#[derive(Debug)]
struct ManualClockState {
    now: Timestamp,
    waits: u64,
}

impl ManualClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ManualClockState { now, waits: 0 })),
        }
    }

    /// Moves the clock to `now`, forwards or backwards.
    pub fn set(&self, now: Timestamp) {
        self.state().now = now;
    }

    /// Moves the clock by `delta`, which may be negative.
    pub fn advance(&self, delta: SignedDuration) {
        let mut state = self.state();
        state.now = state.now.checked_add(delta).unwrap_or(state.now);
    }

    /// Number of `wait_until` calls that had to move the clock forward.
    pub fn waits(&self) -> u64 {
        self.state().waits
    }

    fn state(&self) -> MutexGuard<'_, ManualClockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.state().now
    }

    fn wait_until(&self, target: Timestamp) {
        let mut state = self.state();
        if target > state.now {
            state.now = target;
            state.waits += 1;
        }
    }
}

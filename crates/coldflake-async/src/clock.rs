use async_trait::async_trait;
use coldflake::{Clock, ManualClock, SystemClock};
use jiff::Timestamp;
use std::time::Duration;

/// A [`Clock`] that suspends the calling task instead of blocking a thread.
#[async_trait]
pub trait AsyncClock: Send + Sync {
    /// Returns the current time of the clock
    fn now(&self) -> Timestamp;
    /// Suspend until the clock is expected to reach the target time.
    ///
    /// May return early, like [`Clock::wait_until`]; callers read the clock
    /// again afterwards.
    async fn sleep_until(&self, target: Timestamp);
}

#[async_trait]
impl AsyncClock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }

    async fn sleep_until(&self, target: Timestamp) {
        let now = Timestamp::now();
        if now < target {
            let remaining = (target.as_nanosecond() - now.as_nanosecond()) as u64;
            tokio::time::sleep(Duration::from_nanos(remaining)).await;
        }
    }
}

#[async_trait]
impl AsyncClock for ManualClock {
    fn now(&self) -> Timestamp {
        Clock::now(self)
    }

    async fn sleep_until(&self, target: Timestamp) {
        self.wait_until(target);
        tokio::task::yield_now().await;
    }
}

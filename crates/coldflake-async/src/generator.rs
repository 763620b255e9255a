use crate::{clock::AsyncClock, error::AsyncError};
use coldflake::{
    sequencer::{Attempt, Sequencer, Step},
    ConfigError, Error, GeneratorSettings, IdParts, SnowflakeId, SystemClock,
};
use jiff::Timestamp;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

/// Snowflake ID generator for async callers.
///
/// Behaves like [`coldflake::IdGenerator`], but backpressure suspends the
/// calling task. A pending [`next_id`](AsyncIdGenerator::next_id) may be
/// dropped at any await point (for example by
/// [`next_id_timeout`](AsyncIdGenerator::next_id_timeout)): the state is only
/// written after the last await, so an abandoned call neither consumes a
/// sequence number nor leaves the lock held.
pub struct AsyncIdGenerator<C: AsyncClock = SystemClock> {
    settings: GeneratorSettings,
    clock: C,
    state: Mutex<Sequencer>,
}

impl AsyncIdGenerator<SystemClock> {
    /// Creates a generator backed by the real system clock.
    pub fn new(settings: GeneratorSettings) -> Result<Self, ConfigError> {
        Self::with_clock(settings, SystemClock)
    }
}

impl<C: AsyncClock> AsyncIdGenerator<C> {
    pub fn with_clock(settings: GeneratorSettings, clock: C) -> Result<Self, ConfigError> {
        let sequencer = Sequencer::new(settings, clock.now())?;
        Ok(Self {
            settings,
            clock,
            state: Mutex::new(sequencer),
        })
    }

    /// Generates the next unique id, suspending while the clock catches up.
    pub async fn next_id(&self) -> Result<SnowflakeId, Error> {
        let mut state = self.state.lock().await;
        let mut attempt = Attempt::new();

        loop {
            let now = self.clock.now();
            match state.advance(now, &mut attempt) {
                Ok(Step::Ready(slot)) => {
                    let id = state.commit(slot);
                    trace!(id = %id, "generated id");
                    return Ok(id);
                }
                Ok(Step::WaitUntil(target)) => {
                    debug!(now = %now, until = %target, "waiting for clock to advance");
                    self.clock.sleep_until(target).await;
                }
                Err(error) => {
                    warn!(error = %error, "refusing to generate id");
                    return Err(error);
                }
            }
        }
    }

    /// Like [`next_id`](Self::next_id), but gives up after `limit`.
    pub async fn next_id_timeout(&self, limit: Duration) -> crate::Result<SnowflakeId> {
        match tokio::time::timeout(limit, self.next_id()).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(AsyncError::TimedOut { after: limit }),
        }
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Splits an id minted by this generator into its fields.
    pub fn decompose(&self, id: SnowflakeId) -> IdParts {
        self.settings.decompose(id)
    }

    /// The instant an id minted by this generator was created at.
    pub fn timestamp_of(&self, id: SnowflakeId) -> Option<Timestamp> {
        self.settings.minted_at(id)
    }
}

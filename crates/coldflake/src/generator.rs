use crate::{
    clock::{Clock, SystemClock},
    error::{ConfigError, Error},
    sequencer::{Attempt, Sequencer, Step},
    GeneratorSettings, IdParts, SnowflakeId,
};
use jiff::Timestamp;
use std::sync::Mutex;

/// Snowflake ID generator that blocks the calling thread on backpressure.
///
/// The generator is `Send + Sync`; share one instance per
/// `(datacenter_id, worker_id)` pair by reference or through an `Arc`.
/// Independent instances never interfere with each other.
///
/// # Example
///
/// ```rust
/// use coldflake::{GeneratorSettings, IdGenerator};
///
/// let generator = IdGenerator::new(GeneratorSettings::default()).unwrap();
/// let first = generator.next_id().unwrap();
/// let second = generator.next_id().unwrap();
/// assert!(second > first);
/// ```
pub struct IdGenerator<C: Clock = SystemClock> {
    settings: GeneratorSettings,
    clock: C,
    state: Mutex<Sequencer>,
}

impl IdGenerator<SystemClock> {
    /// Creates a generator backed by the real system clock.
    pub fn new(settings: GeneratorSettings) -> Result<Self, ConfigError> {
        Self::with_clock(settings, SystemClock)
    }
}

impl<C: Clock> IdGenerator<C> {
    /// Creates a generator reading time from `clock`.
    pub fn with_clock(settings: GeneratorSettings, clock: C) -> Result<Self, ConfigError> {
        let sequencer = Sequencer::new(settings, clock.now())?;
        Ok(Self {
            settings,
            clock,
            state: Mutex::new(sequencer),
        })
    }

    /// Generates the next unique id.
    ///
    /// Correctness strategy:
    /// - if the per-millisecond sequence is exhausted, block until the next
    ///   millisecond
    /// - if the clock moved backward, fail with [`Error::ClockRegression`],
    ///   or block until it catches up when the settings allow a bounded wait
    pub fn next_id(&self) -> Result<SnowflakeId, Error> {
        let mut state = self.state.lock().map_err(|_| Error::StatePoisoned)?;
        let mut attempt = Attempt::new();

        loop {
            match state.advance(self.clock.now(), &mut attempt)? {
                Step::Ready(slot) => return Ok(state.commit(slot)),
                Step::WaitUntil(target) => self.clock.wait_until(target),
            }
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

use crate::{
    error::{ConfigError, Error},
    settings::{GeneratorSettings, RegressionPolicy},
    IdParts, SnowflakeId,
};
use jiff::Timestamp;

/// The timestamp/sequence state machine shared by the blocking and async
/// generators.
///
/// A `Sequencer` owns no clock and no lock. Callers feed it clock readings
/// through [`Sequencer::advance`] and act on the returned [`Step`]: either
/// wait and read the clock again, or [`commit`](Sequencer::commit) the
/// reserved [`Slot`]. Only `commit` mutates state, so a caller that gives up
/// between steps leaves the sequencer exactly as it found it.
#[derive(Debug, Clone)]
pub struct Sequencer {
    settings: GeneratorSettings,
    epoch_ms: i64,
    /// Milliseconds since the Unix epoch of the last emitted id.
    last_timestamp: Option<i64>,
    sequence: u64,
}

/// A `(timestamp, sequence)` pair that is free to be emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    timestamp: i64,
    sequence: u64,
}

impl Slot {
    /// Milliseconds since the Unix epoch.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Ready(Slot),
    /// Read the clock again once it reaches this instant.
    WaitUntil(Timestamp),
}

/// Per-call bookkeeping for [`Sequencer::advance`].
#[derive(Debug, Default)]
pub struct Attempt {
    /// The regressed reading that last triggered a wait.
    regression_seen: Option<i64>,
}

impl Attempt {
    pub fn new() -> Self {
        Self::default()
    }
}

fn instant(ms: i64) -> Timestamp {
    Timestamp::from_millisecond(ms).unwrap_or(Timestamp::MAX)
}

impl Sequencer {
    /// Validates `settings`, checking the epoch against `now`.
    pub fn new(settings: GeneratorSettings, now: Timestamp) -> Result<Self, ConfigError> {
        settings.validate_at(now)?;
        Ok(Self {
            epoch_ms: settings.epoch.as_millisecond(),
            settings,
            last_timestamp: None,
            sequence: 0,
        })
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Milliseconds since the Unix epoch of the last emitted id, if any.
    pub fn last_timestamp(&self) -> Option<i64> {
        self.last_timestamp
    }

    /// Decides what to do with the clock reading `now`.
    pub fn advance(&self, now: Timestamp, attempt: &mut Attempt) -> Result<Step, Error> {
        let now_ms = now.as_millisecond();
        let last = self.last_timestamp.unwrap_or(self.epoch_ms);

        if now_ms < last {
            return self.on_regression(now_ms, last, attempt);
        }

        let slot = match self.last_timestamp {
            Some(last) if now_ms == last => {
                if self.sequence < self.settings.layout.max_sequence() {
                    Slot {
                        timestamp: now_ms,
                        sequence: self.sequence + 1,
                    }
                } else {
                    // Sequence exhausted for this millisecond.
                    return Ok(Step::WaitUntil(instant(last + 1)));
                }
            }
            _ => Slot {
                timestamp: now_ms,
                sequence: 0,
            },
        };

        let elapsed = (slot.timestamp - self.epoch_ms) as u64;
        let max = self.settings.layout.max_timestamp();
        if elapsed > max {
            return Err(Error::TimestampExhausted { elapsed, max });
        }

        Ok(Step::Ready(slot))
    }

    fn on_regression(
        &self,
        observed: i64,
        last: i64,
        attempt: &mut Attempt,
    ) -> Result<Step, Error> {
        let behind = (last - observed) as i128;
        // Waits may wake early: wait again only while readings keep moving
        // forward, so a clock stepped back mid-wait fails the call.
        let progressing = attempt.regression_seen.map_or(true, |seen| observed > seen);
        match self.settings.regression {
            RegressionPolicy::Wait { max_wait }
                if progressing && behind <= max_wait.as_millis() =>
            {
                attempt.regression_seen = Some(observed);
                Ok(Step::WaitUntil(instant(last)))
            }
            _ => Err(Error::ClockRegression { observed, last }),
        }
    }

    /// Records `slot` as emitted and packs it into an id.
    pub fn commit(&mut self, slot: Slot) -> SnowflakeId {
        self.last_timestamp = Some(slot.timestamp);
        self.sequence = slot.sequence;

        self.settings.layout.pack(IdParts {
            timestamp: (slot.timestamp - self.epoch_ms) as u64,
            datacenter_id: self.settings.datacenter_id,
            worker_id: self.settings.worker_id,
            sequence: slot.sequence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BitLayout;
    use jiff::SignedDuration;

    const EPOCH_MS: i64 = 1_000_000;

    fn at(ms: i64) -> Timestamp {
        Timestamp::from_millisecond(ms).unwrap()
    }

    fn sequencer(sequence_bits: u8, regression: RegressionPolicy) -> Sequencer {
        let settings = GeneratorSettings::builder()
            .epoch(at(EPOCH_MS))
            .layout(BitLayout::builder().sequence_bits(sequence_bits).build())
            .regression(regression)
            .build();
        Sequencer::new(settings, at(EPOCH_MS)).unwrap()
    }

    fn ready(step: Result<Step, Error>) -> Slot {
        match step {
            Ok(Step::Ready(slot)) => slot,
            other => panic!("expected a ready slot, got {other:?}"),
        }
    }

    #[test]
    fn first_reading_starts_at_sequence_zero() {
        let s = sequencer(12, RegressionPolicy::Fail);
        let slot = ready(s.advance(at(EPOCH_MS + 5), &mut Attempt::new()));
        assert_eq!(slot.timestamp(), EPOCH_MS + 5);
        assert_eq!(slot.sequence(), 0);
    }

    #[test]
    fn advance_does_not_mutate() {
        let s = sequencer(12, RegressionPolicy::Fail);
        let before = s.last_timestamp();
        let _ = s.advance(at(EPOCH_MS + 5), &mut Attempt::new());
        assert_eq!(s.last_timestamp(), before);
    }

    #[test]
    fn same_millisecond_increments_then_waits() {
        let mut s = sequencer(1, RegressionPolicy::Fail);
        let now = at(EPOCH_MS + 10);

        let first = ready(s.advance(now, &mut Attempt::new()));
        s.commit(first);
        let second = ready(s.advance(now, &mut Attempt::new()));
        assert_eq!(second.sequence(), 1);
        s.commit(second);

        assert_eq!(
            s.advance(now, &mut Attempt::new()),
            Ok(Step::WaitUntil(at(EPOCH_MS + 11)))
        );
    }

    #[test]
    fn new_millisecond_resets_sequence() {
        let mut s = sequencer(12, RegressionPolicy::Fail);
        let slot = ready(s.advance(at(EPOCH_MS + 10), &mut Attempt::new()));
        s.commit(slot);
        let slot = ready(s.advance(at(EPOCH_MS + 10), &mut Attempt::new()));
        s.commit(slot);

        let slot = ready(s.advance(at(EPOCH_MS + 11), &mut Attempt::new()));
        assert_eq!(slot.sequence(), 0);
    }

    #[test]
    fn regression_fails_under_fail_policy() {
        let mut s = sequencer(12, RegressionPolicy::Fail);
        let slot = ready(s.advance(at(EPOCH_MS + 10), &mut Attempt::new()));
        s.commit(slot);

        assert_eq!(
            s.advance(at(EPOCH_MS + 9), &mut Attempt::new()),
            Err(Error::ClockRegression {
                observed: EPOCH_MS + 9,
                last: EPOCH_MS + 10
            })
        );
        assert_eq!(s.last_timestamp(), Some(EPOCH_MS + 10));
    }

    #[test]
    fn regression_within_tolerance_waits_while_clock_progresses() {
        let policy = RegressionPolicy::Wait {
            max_wait: SignedDuration::from_millis(5),
        };
        let mut s = sequencer(12, policy);
        let slot = ready(s.advance(at(EPOCH_MS + 10), &mut Attempt::new()));
        s.commit(slot);

        let mut attempt = Attempt::new();
        assert_eq!(
            s.advance(at(EPOCH_MS + 5), &mut attempt),
            Ok(Step::WaitUntil(at(EPOCH_MS + 10)))
        );
        // woke early but the clock moved forward: keep waiting
        assert_eq!(
            s.advance(at(EPOCH_MS + 8), &mut attempt),
            Ok(Step::WaitUntil(at(EPOCH_MS + 10)))
        );
        assert_eq!(
            ready(s.advance(at(EPOCH_MS + 10), &mut attempt)).sequence(),
            1
        );
    }

    #[test]
    fn regression_wait_fails_when_clock_steps_back_again() {
        let policy = RegressionPolicy::Wait {
            max_wait: SignedDuration::from_millis(5),
        };
        let mut s = sequencer(12, policy);
        let slot = ready(s.advance(at(EPOCH_MS + 10), &mut Attempt::new()));
        s.commit(slot);

        let mut attempt = Attempt::new();
        assert!(s.advance(at(EPOCH_MS + 7), &mut attempt).is_ok());
        // no progress since the last wait
        assert_eq!(
            s.advance(at(EPOCH_MS + 7), &mut attempt),
            Err(Error::ClockRegression {
                observed: EPOCH_MS + 7,
                last: EPOCH_MS + 10
            })
        );
        // stepped further back, still inside the tolerance
        let mut attempt = Attempt::new();
        assert!(s.advance(at(EPOCH_MS + 7), &mut attempt).is_ok());
        assert!(matches!(
            s.advance(at(EPOCH_MS + 6), &mut attempt),
            Err(Error::ClockRegression { observed, .. }) if observed == EPOCH_MS + 6
        ));
    }

    #[test]
    fn regression_beyond_tolerance_fails() {
        let policy = RegressionPolicy::Wait {
            max_wait: SignedDuration::from_millis(5),
        };
        let mut s = sequencer(12, policy);
        let slot = ready(s.advance(at(EPOCH_MS + 10), &mut Attempt::new()));
        s.commit(slot);

        assert_eq!(
            s.advance(at(EPOCH_MS + 4), &mut Attempt::new()),
            Err(Error::ClockRegression {
                observed: EPOCH_MS + 4,
                last: EPOCH_MS + 10
            })
        );
    }

    #[test]
    fn clock_before_epoch_is_a_regression() {
        let s = sequencer(12, RegressionPolicy::Fail);
        assert_eq!(
            s.advance(at(EPOCH_MS - 1), &mut Attempt::new()),
            Err(Error::ClockRegression {
                observed: EPOCH_MS - 1,
                last: EPOCH_MS
            })
        );
    }

    #[test]
    fn timestamp_field_exhaustion_is_reported() {
        let settings = GeneratorSettings::builder()
            .epoch(at(EPOCH_MS))
            .layout(BitLayout::builder().timestamp_bits(4).build())
            .build();
        let s = Sequencer::new(settings, at(EPOCH_MS)).unwrap();

        assert!(s.advance(at(EPOCH_MS + 15), &mut Attempt::new()).is_ok());
        assert_eq!(
            s.advance(at(EPOCH_MS + 16), &mut Attempt::new()),
            Err(Error::TimestampExhausted {
                elapsed: 16,
                max: 15
            })
        );
    }

    #[test]
    fn commit_packs_configured_fields() {
        let mut s = sequencer(12, RegressionPolicy::Fail);
        let slot = ready(s.advance(at(EPOCH_MS + 3), &mut Attempt::new()));
        let id = s.commit(slot);

        let parts = BitLayout::CLASSIC.unpack(id);
        assert_eq!(
            parts,
            IdParts {
                timestamp: 3,
                datacenter_id: 2,
                worker_id: 1,
                sequence: 0
            }
        );
    }
}

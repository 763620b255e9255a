use crate::{error::ConfigError, layout::BitLayout, IdParts, SnowflakeId};
use jiff::{SignedDuration, Timestamp};
use typed_builder::TypedBuilder;

/// 2020-01-01T00:00:00Z, the default zero point of the timestamp field.
pub const DEFAULT_EPOCH: Timestamp = Timestamp::constant(1_577_836_800, 0);
pub const DEFAULT_DATACENTER_ID: u64 = 2;
pub const DEFAULT_WORKER_ID: u64 = 1;

/// What the generator does when the clock reports a time earlier than the
/// last emitted timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegressionPolicy {
    /// Refuse the call with [`Error::ClockRegression`](crate::Error::ClockRegression).
    #[default]
    Fail,
    /// Block until the clock catches up, as long as it is at most `max_wait`
    /// behind. Larger regressions fail as with [`RegressionPolicy::Fail`].
    Wait { max_wait: SignedDuration },
}

/// Configures a generator instance.
///
/// `(datacenter_id, worker_id)` must be unique across every generator that
/// shares an epoch and layout; nothing here can detect a duplicate pair.
///
/// # Example
///
/// ```rust
/// use coldflake::{BitLayout, GeneratorSettings};
///
/// // 2020 epoch, datacenter 2, worker 1, 41/5/5/12 layout
/// let settings = GeneratorSettings::builder().build();
///
/// let settings = GeneratorSettings::builder()
///     .datacenter_id(7)
///     .worker_id(30)
///     .layout(BitLayout::builder().sequence_bits(10).build())
///     .build();
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct GeneratorSettings {
    /// Zero point of the timestamp field; must not be in the future.
    #[builder(default = DEFAULT_EPOCH)]
    pub epoch: Timestamp,
    #[builder(default = DEFAULT_DATACENTER_ID)]
    pub datacenter_id: u64,
    #[builder(default = DEFAULT_WORKER_ID)]
    pub worker_id: u64,
    #[builder(default)]
    pub layout: BitLayout,
    #[builder(default)]
    pub regression: RegressionPolicy,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GeneratorSettings {
    /// Validates everything that does not depend on the current time.
    ///
    /// The epoch is checked against the generator's clock at construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layout.validate()?;

        let max_datacenter_id = self.layout.max_datacenter_id();
        if self.datacenter_id > max_datacenter_id {
            return Err(ConfigError::InvalidDatacenterId {
                datacenter_id: self.datacenter_id,
                max_datacenter_id,
            });
        }

        let max_worker_id = self.layout.max_worker_id();
        if self.worker_id > max_worker_id {
            return Err(ConfigError::InvalidWorkerId {
                worker_id: self.worker_id,
                max_worker_id,
            });
        }

        if let RegressionPolicy::Wait { max_wait } = self.regression {
            if !max_wait.is_positive() {
                return Err(ConfigError::ZeroRegressionTolerance);
            }
        }

        Ok(())
    }

    /// Splits an id minted under these settings into its fields.
    pub fn decompose(&self, id: SnowflakeId) -> IdParts {
        self.layout.unpack(id)
    }

    /// The instant an id was minted at, or `None` if it lies outside the
    /// range `jiff` can represent.
    pub fn minted_at(&self, id: SnowflakeId) -> Option<Timestamp> {
        let elapsed = i64::try_from(self.decompose(id).timestamp).ok()?;
        self.epoch
            .checked_add(SignedDuration::from_millis(elapsed))
            .ok()
    }

    /// Validates the settings and checks the epoch against `now`.
    pub fn validate_at(&self, now: Timestamp) -> Result<(), ConfigError> {
        self.validate()?;
        if self.epoch > now {
            return Err(ConfigError::EpochAhead {
                epoch: self.epoch,
                now,
            });
        }
        Ok(())
    }
}

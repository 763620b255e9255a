use jiff::Timestamp;
use thiserror::Error;

/// Errors returned while validating generator settings.
///
/// A generator is never constructed from settings that fail validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid datacenter id {datacenter_id}; expected 0..={max_datacenter_id}")]
    InvalidDatacenterId {
        datacenter_id: u64,
        max_datacenter_id: u64,
    },
    #[error("invalid worker id {worker_id}; expected 0..={max_worker_id}")]
    InvalidWorkerId { worker_id: u64, max_worker_id: u64 },
    #[error("bit layout uses {total} bits; at most 63 are available")]
    LayoutTooWide { total: u32 },
    #[error("timestamp field must be at least one bit wide")]
    EmptyTimestampField,
    #[error("epoch is ahead of current clock time: epoch={epoch}, now={now}")]
    EpochAhead { epoch: Timestamp, now: Timestamp },
    #[error("clock regression tolerance must be positive")]
    ZeroRegressionTolerance,
}

/// Errors returned by ID generation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// The clock reported a time earlier than the last emitted timestamp.
    ///
    /// Both values are milliseconds since the Unix epoch. No state was changed.
    #[error("clock moved backwards: observed={observed}ms, last={last}ms")]
    ClockRegression { observed: i64, last: i64 },
    #[error("timestamp field exhausted: {elapsed}ms since epoch exceeds {max}ms")]
    TimestampExhausted { elapsed: u64, max: u64 },
    #[error("generator state lock is poisoned")]
    StatePoisoned,
}

/// Error returned when parsing a [`SnowflakeId`](crate::SnowflakeId) from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid snowflake id {input:?}: expected an unsigned decimal integer")]
pub struct ParseIdError {
    pub input: String,
}

//! Snowflake-style 64-bit unique ID generation.
//!
//! An [`IdGenerator`] packs the milliseconds elapsed since a configured epoch,
//! a datacenter id, a worker id and a per-millisecond sequence into a
//! [`SnowflakeId`]. Ids from one generator strictly increase; ids from
//! generators with distinct `(datacenter_id, worker_id)` pairs never collide.
//! Nothing is coordinated over the network.

mod classic;
mod clock;
pub mod error;
mod generator;
mod id;
mod layout;
pub mod sequencer;
mod settings;

pub use classic::ClassicId;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, Error, ParseIdError};
pub use generator::IdGenerator;
pub use id::{IdParts, SnowflakeId};
pub use layout::{BitLayout, AVAILABLE_BITS};
pub use settings::{
    GeneratorSettings, RegressionPolicy, DEFAULT_DATACENTER_ID, DEFAULT_EPOCH, DEFAULT_WORKER_ID,
};

use clap::{Parser, Subcommand, ValueEnum};
use coldflake::{
    BitLayout, GeneratorSettings, RegressionPolicy, SnowflakeId, DEFAULT_DATACENTER_ID,
    DEFAULT_EPOCH, DEFAULT_WORKER_ID,
};
use jiff::{SignedDuration, Timestamp};
use std::fmt::{Display, Formatter};

pub const EPOCH_ENV: &str = "COLDFLAKE_EPOCH";
pub const DATACENTER_ID_ENV: &str = "COLDFLAKE_DATACENTER_ID";
pub const WORKER_ID_ENV: &str = "COLDFLAKE_WORKER_ID";
pub const TIMESTAMP_BITS_ENV: &str = "COLDFLAKE_TIMESTAMP_BITS";
pub const DATACENTER_BITS_ENV: &str = "COLDFLAKE_DATACENTER_BITS";
pub const WORKER_BITS_ENV: &str = "COLDFLAKE_WORKER_BITS";
pub const SEQUENCE_BITS_ENV: &str = "COLDFLAKE_SEQUENCE_BITS";
pub const REGRESSION_WAIT_MS_ENV: &str = "COLDFLAKE_REGRESSION_WAIT_MS";
pub const LOG_FORMAT_ENV: &str = "COLDFLAKE_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "coldflake", about = "Generate and inspect snowflake ids")]
pub struct CLI {
    /// Zero point of the timestamp field (RFC 3339).
    #[arg(long, env = EPOCH_ENV, default_value_t = DEFAULT_EPOCH)]
    pub epoch: Timestamp,

    #[arg(long, env = DATACENTER_ID_ENV, default_value_t = DEFAULT_DATACENTER_ID)]
    pub datacenter_id: u64,

    #[arg(long, env = WORKER_ID_ENV, default_value_t = DEFAULT_WORKER_ID)]
    pub worker_id: u64,

    #[arg(long, env = TIMESTAMP_BITS_ENV, default_value_t = BitLayout::CLASSIC.timestamp_bits)]
    pub timestamp_bits: u8,

    #[arg(long, env = DATACENTER_BITS_ENV, default_value_t = BitLayout::CLASSIC.datacenter_bits)]
    pub datacenter_bits: u8,

    #[arg(long, env = WORKER_BITS_ENV, default_value_t = BitLayout::CLASSIC.worker_bits)]
    pub worker_bits: u8,

    #[arg(long, env = SEQUENCE_BITS_ENV, default_value_t = BitLayout::CLASSIC.sequence_bits)]
    pub sequence_bits: u8,

    /// Wait up to this many milliseconds for a clock that moved backwards.
    /// Without it, a backwards clock fails the run.
    #[arg(
        long,
        env = REGRESSION_WAIT_MS_ENV,
        value_parser = clap::value_parser!(i64).range(1..)
    )]
    pub regression_wait_ms: Option<i64>,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormat::Text
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print new ids, one per line.
    Generate {
        #[arg(long, short = 'n', default_value_t = 1)]
        count: u64,
    },
    /// Print the fields of existing ids under the configured layout.
    Inspect {
        #[arg(required = true)]
        ids: Vec<SnowflakeId>,
    },
}

impl CLI {
    pub fn settings(&self) -> GeneratorSettings {
        let layout = BitLayout::builder()
            .timestamp_bits(self.timestamp_bits)
            .datacenter_bits(self.datacenter_bits)
            .worker_bits(self.worker_bits)
            .sequence_bits(self.sequence_bits)
            .build();

        let regression = match self.regression_wait_ms {
            Some(ms) => RegressionPolicy::Wait {
                max_wait: SignedDuration::from_millis(ms),
            },
            None => RegressionPolicy::Fail,
        };

        GeneratorSettings::builder()
            .epoch(self.epoch)
            .datacenter_id(self.datacenter_id)
            .worker_id(self.worker_id)
            .layout(layout)
            .regression(regression)
            .build()
    }
}

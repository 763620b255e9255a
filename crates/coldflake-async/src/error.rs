use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AsyncError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AsyncError {
    #[error(transparent)]
    Generator(#[from] coldflake::Error),
    #[error("no id produced within {after:?}")]
    TimedOut { after: Duration },
}

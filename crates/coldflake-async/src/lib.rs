//! Async front-end for [`coldflake`] generators on the tokio runtime.
//!
//! # Example
//!
//! ```rust
//! use coldflake::GeneratorSettings;
//! use coldflake_async::AsyncIdGenerator;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let generator = AsyncIdGenerator::new(GeneratorSettings::default())?;
//!
//! let id = generator.next_id().await?;
//! let bounded = generator.next_id_timeout(Duration::from_millis(5)).await?;
//! assert!(bounded > id);
//! # Ok(())
//! # }
//! ```

mod clock;
pub mod error;
mod generator;

pub use clock::AsyncClock;
pub use error::{AsyncError, Result};
pub use generator::AsyncIdGenerator;

use anyhow::{Context, Result};
use coldflake::{Clock, GeneratorSettings, IdGenerator, SnowflakeId};
use std::io::Write;
use tracing::{debug, info};

/// Writes `count` fresh ids to `out`, one decimal per line.
pub fn generate<C: Clock>(
    generator: &IdGenerator<C>,
    count: u64,
    out: &mut impl Write,
) -> Result<()> {
    for n in 0..count {
        let id = generator
            .next_id()
            .with_context(|| format!("failed to generate id {} of {count}", n + 1))?;
        writeln!(out, "{id}").context("failed to write id")?;
    }
    out.flush().context("failed to flush output")?;
    info!(count, "generated ids");
    Ok(())
}

/// Writes the decoded fields of every id in `ids` to `out`.
pub fn inspect(
    settings: &GeneratorSettings,
    ids: &[SnowflakeId],
    out: &mut impl Write,
) -> Result<()> {
    for id in ids {
        let parts = settings.decompose(*id);
        debug!(id = %id, ?parts, "decoded id");

        let minted_at = settings
            .minted_at(*id)
            .map(|ts| ts.to_string())
            .unwrap_or_else(|| "out of range".to_string());
        writeln!(
            out,
            "{id} timestamp={} datacenter_id={} worker_id={} sequence={} minted_at={minted_at}",
            parts.timestamp, parts.datacenter_id, parts.worker_id, parts.sequence,
        )
        .context("failed to write inspection")?;
    }
    out.flush().context("failed to flush output")?;
    Ok(())
}

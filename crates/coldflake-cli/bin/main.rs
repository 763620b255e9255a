mod cli;
mod commands;

use crate::cli::{Command, LogFormat, CLI};
use anyhow::Context;
use clap::Parser;
use coldflake::IdGenerator;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    init_tracing(config.log_format);

    let settings = config.settings();
    info!(
        epoch = %settings.epoch,
        datacenter_id = settings.datacenter_id,
        worker_id = settings.worker_id,
        layout = ?settings.layout,
        regression = ?settings.regression,
        log_format = %config.log_format,
        "loaded generator settings"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &config.command {
        Command::Generate { count } => {
            let generator =
                IdGenerator::new(settings).context("invalid generator configuration")?;
            commands::generate(&generator, *count, &mut out)?;
        }
        Command::Inspect { ids } => {
            settings
                .validate()
                .context("invalid generator configuration")?;
            commands::inspect(&settings, ids, &mut out)?;
        }
    }

    Ok(())
}

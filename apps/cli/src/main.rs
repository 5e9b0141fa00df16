mod args;
mod handlers;
mod output;

use crate::args::{Cli, Command};
use crate::output::Printer;
use anyhow::{Context, Result};
use bns::AlertCenter;
use bns::domain::config::{AppConfig, LoggingSettings};
use bns::kernel::config::load_config;
use bns_logger::{Logger, parse_level};
use clap::Parser;
use std::time::Duration;
use tracing::{debug, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, fallback) = match load_config::<AppConfig>(cli.config.as_deref()) {
        Ok(config) => (config, None),
        Err(err) if cli.config.is_none() => (AppConfig::default(), Some(err)),
        Err(err) => return Err(err).context("Configuration is malformed"),
    };
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir.clone_from(dir);
    }

    let _log = init_logging(&config.logging, cli.verbose)?;
    if let Some(err) = fallback {
        warn!(error = %err, "Ignoring unreadable config, using defaults");
    }
    debug!(data_dir = %config.storage.data_dir.display(), "Configuration loaded");

    let center = AlertCenter::open(&config).await?;
    let out = Printer::new(cli.json);

    match cli.command {
        Command::Check { domains, now } => handlers::check(&center, &out, &domains, now).await?,
        Command::Summary { domains, now } => {
            handlers::summary(&center, &out, &domains, now).await?;
        },
        Command::Sweep { domains } => handlers::sweep(&center, &out, &domains).await?,
        Command::List { unread } => handlers::list(&center, &out, unread).await?,
        Command::Unread => handlers::unread(&center, &out).await?,
        Command::Read { id } => center.store().mark_as_read(&id).await,
        Command::ReadAll => center.store().mark_all_as_read().await,
        Command::Delete { id } => center.store().delete(&id).await,
        Command::Clear => center.store().clear_all().await,
        Command::Add { kind, title, message, domain_id, action_url } => {
            let new = handlers::new_notification(kind, title, message, domain_id, action_url);
            handlers::add(&center, &out, new).await?;
        },
        Command::Watch { interval, polls } => {
            handlers::watch(&center, &out, Duration::from_secs(interval), polls).await?;
        },
    }

    Ok(())
}

fn init_logging(settings: &LoggingSettings, verbose: u8) -> Result<Logger> {
    let level = parse_level(&settings.level)?;
    let builder = Logger::builder().name(env!("CARGO_BIN_NAME")).level(level).verbosity(verbose);

    let logger = match &settings.dir {
        Some(dir) if settings.json => builder.dir(dir).json().init()?,
        Some(dir) => builder.dir(dir).init()?,
        None => builder.init()?,
    };
    Ok(logger)
}

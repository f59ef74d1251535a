//! Marknote - publish a folder of markdown notes as browsable HTML pages.

mod api;
mod build;
mod cli;
mod config;
mod init;
mod logger;
mod render;
mod serve;
mod store;
mod utils;
mod watch;

use anyhow::{Context, Result, bail};
use build::SiteBuilder;
use clap::Parser;
use cli::{Cli, Commands};
use config::{SiteConfig, WATCHER_LOG};
use init::new_site;
use logger::Journal;
use serve::serve_site;
use std::{path::Path, sync::Arc};
use utils::pid::PidFile;
use watch::{Signal, signal_channel, watch_blocking};

/// PID file of the stand-alone watcher.
const WATCHER_PID: &str = "watcher.pid";

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    let config: &'static SiteConfig = Box::leak(Box::new(load_config(cli)?));

    match &cli.command {
        Commands::Init { name } => new_site(config, name.is_some()),
        Commands::Build => SiteBuilder::new(config)?.build_site().map(|_| ()),
        Commands::Watch => watch_site(config),
        Commands::Serve { .. } => serve_site(config, Arc::new(SiteBuilder::new(config)?)),
    }
}

/// Load and validate configuration from CLI arguments
fn load_config(cli: &'static Cli) -> Result<SiteConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        SiteConfig::from_path(&config_path)?
    } else {
        SiteConfig::default()
    };
    config.update_with_cli(cli);

    // Validate config state based on command
    let config_exists = config.config_path.exists();
    match (cli.is_init(), config_exists) {
        (true, true) => {
            bail!("Config file already exists. Remove it manually or init in a different path.")
        }
        (false, false) => bail!("Config file not found."),
        _ => {}
    }

    if !cli.is_init() {
        config.validate()?;
    }

    Ok(config)
}

/// Run the watcher in the foreground until Ctrl+C.
fn watch_site(config: &'static SiteConfig) -> Result<()> {
    let builder = SiteBuilder::new(config)?;
    let journal = Journal::new(
        "watch",
        config.log_path(WATCHER_LOG),
        config.get_log_max_size(),
        config.log.backups,
    )
    .context("Failed to open watcher log")?;
    let _pid = PidFile::create(config.pid_path(WATCHER_PID))?;

    let (tx, rx) = signal_channel();
    let tx_for_signal = tx.clone();
    ctrlc::set_handler(move || {
        log!("watch"; "stopping...");
        let _ = tx_for_signal.send(Signal::Stop);
    })
    .context("Failed to set Ctrl+C handler")?;

    watch_blocking(&builder, &journal, config.watch.debounce(), tx, &rx)
}

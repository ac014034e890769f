mod config;
mod relay;
mod remap;
mod wol;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use tokio_util::sync::CancellationToken;

use crate::config::Config;

#[derive(Parser)]
#[command(version, about = "Relays WakeOnLan magic packets for one trigger address to a list of other addresses")]
struct Cli {
    #[arg(short, long, default_value = "~/.config/wol-remapper/config.yml")]
    config: String,

    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<()> {
    let opts = Cli::parse();

    let level = if opts.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    SimpleLogger::new()
        .with_level(level)
        .init()
        .context("unable to initialize logger")?;

    let path = shellexpand::tilde(&opts.config);
    let raw = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("unable to read config file '{}'", path))?;
    let cfg: Config = serde_yml::from_str(&raw)
        .with_context(|| format!("unable to parse config file '{}'", path))?;

    if cfg.wake.is_empty() {
        log::warn!("remap table is empty, matching packets will wake nothing");
    }

    let cancel_token = CancellationToken::new();
    let sigint_token = cancel_token.clone();

    ctrlc::set_handler(move || {
        log::info!("received SIGINT");
        sigint_token.cancel();
    }).expect("Failed to install SIGINT handler");

    let handle = relay::relay_worker(cfg, cancel_token)?;

    // wait for the worker
    let _ = handle.join();
    Ok(())
}

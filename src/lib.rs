mod cli;
pub mod db;
pub mod session;
pub mod settings;
pub mod timer;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;

pub use cli::Cli;
pub use utils::duration::{format_clock, parse_duration_ms};

/// Warnings only, so log lines do not interleave with the timer display.
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Warn;

fn log_builder() -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(DEFAULT_LOG_LEVEL);
    builder
}

pub fn run() -> Result<()> {
    // RUST_LOG overrides the default level.
    log_builder().parse_default_env().init();

    let cli = Cli::parse();
    log::info!("pomo starting: {:?}", cli.command);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(cli::execute(cli))
}

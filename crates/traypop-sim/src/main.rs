#![warn(missing_docs)]

//! Entry point for the `traypop-sim` binary.

mod cli;
mod desktop;
mod error;
mod scenario;

use std::{env, process};

use clap::Parser;
use tokio::runtime::Runtime;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, registry};
use traypop::{OsFamily, RawOptions};

use crate::{
    cli::{Cli, Step},
    desktop::SimDesktop,
    error::Result,
};

fn main() {
    if let Err(err) = run() {
        error!("{err}");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

/// Parse CLI arguments, install logging, and play the scenario.
fn run() -> Result<()> {
    let cli = Cli::parse();
    let env_filter = logging::env_filter_from_spec(&cli.log.spec());
    registry()
        .with(env_filter)
        .with(fmt::layer().without_time())
        .try_init()
        .ok();

    let raw = match &cli.config {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            RawOptions::load(path)?
        }
        None => RawOptions::default(),
    };
    let os = cli.os.map_or_else(OsFamily::current, OsFamily::from);
    let steps = if cli.steps.is_empty() {
        Step::DEFAULT_TOUR.to_vec()
    } else {
        cli.steps.clone()
    };
    let (width, height) = cli.screen;
    let desktop = SimDesktop::new(width, height, cli.bar, cli.icon_x);
    info!(%os, steps = steps.len(), "scenario starting");

    let runtime = Runtime::new()?;
    let report = runtime.block_on(scenario::run(
        raw,
        os,
        env::current_dir()?,
        &desktop,
        &steps,
    ))?;

    let names: Vec<&str> = report.notifications.iter().map(|n| n.name()).collect();
    println!("notifications: {}", names.join(" "));
    println!(
        "visible={} window={} windows_created={}",
        report.visible,
        report
            .window
            .map_or_else(|| "none".to_string(), |w| w.to_string()),
        report.windows_created
    );
    Ok(())
}

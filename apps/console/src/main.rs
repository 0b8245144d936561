use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

mod config;
mod input;
mod render;
mod session;

use config::load_settings;
use session::run_session;

#[derive(Parser, Debug)]
struct Args {
    /// TOML settings file; `console.toml` is read when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    grace_period_ms: Option<u64>,
    /// Item to preload; repeatable.
    #[arg(long = "seed")]
    seed_items: Vec<String>,
    /// Print each state as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(grace_period_ms) = args.grace_period_ms {
        settings.grace_period_ms = grace_period_ms;
    }
    if !args.seed_items.is_empty() {
        settings.seed_items = args.seed_items;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    run_session(stdin, &settings, args.json, &mut stdout).await
}

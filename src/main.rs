//! CLI entry point for the catalog tool.

use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::Parser;
use tracing::debug;

mod app_config;
mod cli;
mod commands;
mod progress;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let file_config = app_config::load_file_config(args.config.as_deref())?;
    let settings = app_config::resolve_settings(&args, file_config)?;
    debug!(?settings, "effective settings");

    match &args.command {
        Command::UpdateCache { limit } => {
            let use_spinner = !args.quiet && io::stderr().is_terminal();
            commands::run_update_cache_command(&settings, *limit, use_spinner).await
        }
        Command::List { fields } => commands::run_list_command(&settings, fields.as_deref()),
        Command::Show { id } => commands::run_show_command(&settings, id.as_deref()),
        Command::Pins => commands::run_pins_command(&settings).await,
        Command::FetchFile { id, path } => {
            commands::run_fetch_file_command(&settings, id, path).await
        }
        Command::IpSearch { term } => commands::run_ip_search_command(&settings, term),
    }
}

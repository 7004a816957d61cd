//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Harvest and query the public catalog of shuttle hardware projects.
///
/// Record-reading commands accept project ids on stdin, one per line (only
/// the leading number of each line is used), to narrow their input.
#[derive(Parser, Debug)]
#[command(name = "mpw-catalog")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Maximum concurrent page fetches (0 for unlimited, max 1000)
    #[arg(short = 'c', long, global = true, value_parser = clap::value_parser!(u16).range(0..=1000))]
    pub concurrency: Option<u16>,

    /// Config file (defaults to $XDG_CONFIG_HOME/mpw-catalog/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Document cache directory
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Record store file
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Catalog operations.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Re-fetch every project page and rebuild the cache and record store
    UpdateCache {
        /// Only fetch the first N projects from the index
        #[arg(short, long, value_name = "N")]
        limit: Option<usize>,
    },

    /// Print selected fields of each record, tab separated
    List {
        /// Comma-separated field names (default: all fields)
        #[arg(short, long, value_name = "a,b,..")]
        fields: Option<String>,
    },

    /// Print whole records
    Show {
        /// Only the project with this id
        #[arg(long)]
        id: Option<String>,
    },

    /// Find the largest macro pin count across projects
    Pins,

    /// Print one file from a project's repository
    FetchFile {
        /// Project id
        id: String,
        /// Path inside the repository
        path: String,
    },

    /// Search project summaries, ignoring case
    IpSearch {
        /// Text to look for
        term: String,
    },
}

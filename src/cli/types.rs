//! Command-line argument types.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::{
    clear::ClearArgs, get::GetArgs, init::InitArgs, preload::PreloadArgs, serve::ServeArgs,
    set::SetArgs, stats::StatsArgs,
};

#[derive(Parser, Debug)]
#[command(name = "sportcache")]
#[command(about = "Request cache for the sports-betting dashboard", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .sportcache/config.yaml and local.yaml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the .sportcache directory, default config and database
    Init(InitArgs),

    /// Show entry counts and per-endpoint usage
    Stats(StatsArgs),

    /// Invalidate cache entries
    Clear(ClearArgs),

    /// Delete expired entries
    Sweep,

    /// Look up a cached response
    Get(GetArgs),

    /// Store a response
    Set(SetArgs),

    /// Warm the cache with fixtures and leagues
    Preload(PreloadArgs),

    /// Run the maintenance daemon until interrupted
    Serve(ServeArgs),
}

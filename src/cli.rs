// src/cli.rs
//! Command-line surface. Everything here is an override on top of the radar
//! config; with no flags at all, a run fetches every configured source.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Comma-separated subset of configured sources to fetch
    /// (default: all of them, in configured order)
    #[arg(long, value_delimiter = ',')]
    pub sources: Vec<String>,

    /// Cap every source at its first few feed items
    #[arg(long)]
    pub limited: bool,

    /// Path to the radar TOML config
    #[arg(long, env = "DEAL_RADAR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Deal store file, overriding the configured path
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Grade snapshot file, overriding the configured path
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
}

impl Cli {
    /// `--sources` as the optional subset the config layer expects.
    pub fn source_subset(&self) -> Option<&[String]> {
        if self.sources.is_empty() {
            None
        } else {
            Some(&self.sources)
        }
    }
}

//! CLI definition using clap.
//!
//! The process has exactly one behaviour (run the poll loop), so there
//! are no subcommands; only a config path and a verbosity toggle.

use clap::Parser;
use std::path::PathBuf;

/// Reviewbot - polls homework review statuses and notifies via Telegram
#[derive(Parser, Debug)]
#[command(name = "reviewbot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

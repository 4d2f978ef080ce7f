use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gool")]
#[command(author, version, about = "Decodes and cuts Online TV Recorder videos")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write log output to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the videos in the working directory and in PATTERNS
    List {
        /// Additional files or glob patterns to scan
        patterns: Vec<String>,
    },

    /// Decode, fetch cutlists for and cut all videos that aren't cut yet
    Process {
        /// Additional files or glob patterns to scan
        patterns: Vec<String>,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },
}

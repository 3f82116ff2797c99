//! Command-line argument definitions for the framelift CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, mapping and
//! library selection, dry-run mode, and logging verbosity.

use clap::Parser;

/// Command-line arguments for the framelift replacement tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input document (JSON)
    #[arg(help = "Path to the input document file")]
    pub document: String,

    /// Path to the component library file (JSON)
    #[arg(short, long)]
    pub library: String,

    /// Path to the mapping configuration file (TOML)
    #[arg(short, long)]
    pub mappings: Option<String>,

    /// Path to the component registry file (JSON)
    #[arg(long)]
    pub registry: Option<String>,

    /// Path to the output document file
    #[arg(short, long, default_value = "out.json")]
    pub output: String,

    /// List replacement candidates without modifying the document
    #[arg(long)]
    pub dry_run: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

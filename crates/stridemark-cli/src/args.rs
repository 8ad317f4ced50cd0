//! Command-line argument definitions for the Stridemark CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, normalization strictness, and logging verbosity.

use clap::Parser;

/// Command-line arguments for the Stridemark threat model annotator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input threat model JSON file
    #[arg(help = "Path to the input threat model")]
    pub input: String,

    /// Path to the generator response JSON file
    #[arg(short, long)]
    pub response: String,

    /// Path to the output threat model [default: output/<input file name>]
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory for validation logs, overriding the configuration file
    #[arg(long)]
    pub log_dir: Option<String>,

    /// Reject findings that omit status, type or modelType
    #[arg(long)]
    pub strict: bool,

    /// Skip the console summary when validation is clean
    #[arg(short, long)]
    pub quiet: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

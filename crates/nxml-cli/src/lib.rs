//! NXML CLI Library
//!
//! Command-line tools for Native XML exports produced by PKP software.
//!
//! # Overview
//!
//! - **Stripping**: Keep only published data and rewrite file ownership
//!   (`nxml strip`), optionally writing pre-import instructions
//! - **DOI import**: Generate a SQL script attaching DOIs to existing
//!   publications (`nxml dois`)
//!
//! Every input may be `-` for stdin and every output `-` for stdout.

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod commands;
pub mod config;
pub mod error;
pub mod io;

// Re-export commonly used types
pub use config::{DoiConfig, StripConfig};
pub use error::{CliError, Result};

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// NXML - Native XML stripper and DOI importer
#[derive(Parser, Debug)]
#[command(name = "nxml")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print the CLI reference as Markdown
    #[arg(long, hide = true)]
    pub markdown_help: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Remove non-public data from a Native XML file
    Strip(StripArgs),

    /// Generate a SQL script importing the DOIs of a Native XML file
    Dois(DoisArgs),
}

/// Options of `nxml strip`
///
/// `-h` names the instructions file, so help is only available as `--help`.
#[derive(Args, Debug, Clone)]
#[command(disable_help_flag = true)]
pub struct StripArgs {
    /// Input file, "-" reads from stdin
    #[arg(short, long, value_name = "FILENAME")]
    pub input: String,

    /// Output file, "-" writes to stdout
    #[arg(short, long, value_name = "FILENAME")]
    pub output: String,

    /// Username of the uploader, the current value is kept when absent
    #[arg(short, long, value_name = "USERNAME")]
    pub uploader: Option<String>,

    /// Author user group, the current value is kept when absent
    #[arg(short, long, value_name = "USER_GROUP", alias = "authorUserGroup")]
    pub author_user_group: Option<String>,

    /// Where to write the pre-import instructions and notes
    #[arg(short = 'h', long, value_name = "FILENAME", requires = "journal")]
    pub instructions: Option<PathBuf>,

    /// Path of the destination journal, used by the generated SQL
    #[arg(short, long, value_name = "JOURNAL_PATH")]
    pub journal: Option<String>,

    /// Accumulated locales and genres, merged across runs
    #[arg(long, value_name = "FILENAME", env = config::DATA_FILE_ENV, default_value = config::DEFAULT_DATA_FILE)]
    pub data: PathBuf,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

/// Options of `nxml dois`
#[derive(Args, Debug, Clone)]
pub struct DoisArgs {
    /// Input file, "-" reads from stdin
    #[arg(short, long, value_name = "FILENAME")]
    pub input: String,

    /// SQL script to append to, "-" writes to stdout
    #[arg(short, long, value_name = "FILENAME")]
    pub output: String,
}

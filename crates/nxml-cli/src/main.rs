//! NXML CLI - Main entry point

use clap::Parser;
use nxml_cli::{Cli, Commands, DoiConfig, StripConfig};
use nxml_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Handle markdown help generation
    if cli.markdown_help {
        println!("{}", clap_markdown::help_markdown::<Cli>());
        return;
    }

    // Ensure a command is provided
    let Some(command) = &cli.command else {
        eprintln!("Error: A subcommand is required");
        eprintln!();
        eprintln!("For more information, try '--help'.");
        process::exit(2);
    };

    // Console only; stdout may carry the XML or SQL output
    let log_config = LogConfig::builder()
        .level(if cli.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Warn
        })
        .output(LogOutput::Console)
        .log_file_prefix("nxml")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    if let Err(e) = init_logging(&log_config) {
        eprintln!("Warning: logging is disabled: {:#}", e);
    }

    if let Err(e) = execute_command(command) {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
fn execute_command(command: &Commands) -> nxml_cli::Result<()> {
    match command {
        Commands::Strip(args) => nxml_cli::commands::strip::run(&StripConfig::from_args(args)?),
        Commands::Dois(args) => nxml_cli::commands::dois::run(&DoiConfig::from_args(args)),
    }
}

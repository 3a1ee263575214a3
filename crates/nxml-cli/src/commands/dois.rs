//! `nxml dois` command implementation
//!
//! Appends one SQL statement per article with a DOI to the output script.

use crate::config::DoiConfig;
use crate::error::Result;
use colored::Colorize;
use nxml_transform::document::Document;
use nxml_transform::doi::extract_dois;
use std::io::Write;
use tracing::debug;

/// Extract the DOIs of the input document
pub fn run(config: &DoiConfig) -> Result<()> {
    let content = config.input.read_to_string()?;
    let document = Document::parse(&content)?;
    debug!(input = %config.input, bytes = content.len(), "Loaded document");

    let extraction = extract_dois(&document)?;

    let mut sink = config.output.append()?;
    for statement in &extraction.statements {
        write!(sink, "{}", statement)?;
    }
    sink.flush()?;

    if !config.output.is_stdout() {
        eprintln!(
            "{} Appended {} statement(s) to {}",
            "✓".green(),
            extraction.statements.len(),
            config.output
        );
        if !extraction.skipped.is_empty() {
            eprintln!(
                "  {} {} article(s) skipped, see the warnings above",
                "!".yellow(),
                extraction.skipped.len()
            );
        }
    }

    Ok(())
}

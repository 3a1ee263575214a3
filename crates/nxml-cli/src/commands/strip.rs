//! `nxml strip` command implementation
//!
//! Filters a Native XML export and, when an instructions file is requested,
//! folds the observed locales and genres into the side-data file and renders
//! the pre-import instructions from the combined sets.

use crate::config::{ReportConfig, StripConfig};
use crate::error::Result;
use colored::Colorize;
use nxml_transform::document::Document;
use nxml_transform::filter::{filter_document, FilterStats};
use nxml_transform::report::render_instructions;
use nxml_transform::side_data::SideData;
use std::io::Write;
use tracing::{debug, info};

/// Strip the input document
pub fn run(config: &StripConfig) -> Result<()> {
    let content = config.input.read_to_string()?;
    let mut document = Document::parse(&content)?;
    debug!(input = %config.input, bytes = content.len(), "Loaded document");

    // Load before filtering so an unreadable side-data file fails early
    let accumulated = match &config.report {
        Some(report) => Some(SideData::load(&report.data)?),
        None => None,
    };

    let outcome = filter_document(&mut document, &config.filter)?;

    let mut sink = config.output.create()?;
    document.write_to(&mut sink)?;
    sink.flush()?;
    info!(output = %config.output, "Wrote stripped document");

    if let (Some(report), Some(mut accumulated)) = (&config.report, accumulated) {
        if let Some(observed) = outcome.observed {
            accumulated.merge(observed);
        }
        write_report(report, &accumulated)?;
    }

    if !config.output.is_stdout() {
        print_summary(&outcome.stats, config);
    }

    Ok(())
}

fn write_report(report: &ReportConfig, data: &SideData) -> Result<()> {
    std::fs::write(
        &report.instructions,
        render_instructions(data, &report.journal),
    )?;
    data.save(&report.data)?;

    info!(
        instructions = %report.instructions.display(),
        data = %report.data.display(),
        locales = data.locales.len(),
        genres = data.genres.len(),
        "Wrote pre-import instructions"
    );
    Ok(())
}

fn print_summary(stats: &FilterStats, config: &StripConfig) {
    eprintln!(
        "{} Stripped {} article(s) into {}",
        "✓".green(),
        stats.articles,
        config.output
    );
    eprintln!("  Publications removed:      {}", stats.publications_removed);
    eprintln!("  Submission files removed:  {}", stats.submission_files_removed);
    eprintln!("  File revisions removed:    {}", stats.file_revisions_removed);
    if let Some(report) = &config.report {
        eprintln!("  Instructions: {}", report.instructions.display().to_string().cyan());
    }
}

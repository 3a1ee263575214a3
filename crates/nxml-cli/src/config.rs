//! Resolved command configuration
//!
//! Turns parsed arguments into the typed settings each command runs with.

use crate::error::{CliError, Result};
use crate::io::{InputSource, OutputTarget};
use crate::{DoisArgs, StripArgs};
use nxml_transform::filter::FilterOptions;
use std::path::PathBuf;

// ============================================================================
// CLI Configuration Constants
// ============================================================================

/// Side-data file used when `--data` is not given
pub const DEFAULT_DATA_FILE: &str = "data.json";

/// Environment variable overriding the side-data file
pub const DATA_FILE_ENV: &str = "NXML_DATA_FILE";

/// Where the instructions report and the accumulated side-data go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub instructions: PathBuf,
    /// Path of the destination journal
    pub journal: String,
    pub data: PathBuf,
}

/// Settings of `nxml strip`
#[derive(Debug, Clone)]
pub struct StripConfig {
    pub input: InputSource,
    pub output: OutputTarget,
    pub filter: FilterOptions,
    /// `None` when no instructions file was requested
    pub report: Option<ReportConfig>,
}

impl StripConfig {
    pub fn from_args(args: &StripArgs) -> Result<Self> {
        let report = match (&args.instructions, non_empty(&args.journal)) {
            (Some(instructions), Some(journal)) => Some(ReportConfig {
                instructions: instructions.clone(),
                journal,
                data: args.data.clone(),
            }),
            (Some(_), None) => {
                return Err(CliError::config(
                    "--journal is required when --instructions is given",
                ))
            },
            (None, _) => None,
        };

        Ok(Self {
            input: InputSource::parse(&args.input),
            output: OutputTarget::parse(&args.output),
            filter: FilterOptions {
                uploader: non_empty(&args.uploader),
                author_user_group: non_empty(&args.author_user_group),
                collect_side_data: report.is_some(),
            },
            report,
        })
    }
}

/// Settings of `nxml dois`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoiConfig {
    pub input: InputSource,
    pub output: OutputTarget,
}

impl DoiConfig {
    pub fn from_args(args: &DoisArgs) -> Self {
        Self {
            input: InputSource::parse(&args.input),
            output: OutputTarget::parse(&args.output),
        }
    }
}

/// Blank overrides keep the current values
fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn args() -> StripArgs {
        StripArgs {
            input: "in.xml".into(),
            output: "-".into(),
            uploader: None,
            author_user_group: None,
            instructions: None,
            journal: None,
            data: PathBuf::from(DEFAULT_DATA_FILE),
            help: None,
        }
    }

    #[test]
    fn test_plain_strip_has_no_report() {
        let config = StripConfig::from_args(&args()).unwrap();

        assert_eq!(config.input, InputSource::File("in.xml".into()));
        assert_eq!(config.output, OutputTarget::Stdout);
        assert!(config.report.is_none());
        assert!(!config.filter.collect_side_data);
    }

    #[test]
    fn test_instructions_enable_collection() {
        let config = StripConfig::from_args(&StripArgs {
            instructions: Some("notes.md".into()),
            journal: Some("jpk".into()),
            uploader: Some("admin".into()),
            author_user_group: Some("  ".into()),
            ..args()
        })
        .unwrap();

        assert!(config.filter.collect_side_data);
        assert_eq!(config.filter.uploader.as_deref(), Some("admin"));
        assert_eq!(config.filter.author_user_group, None);
        assert_eq!(
            config.report,
            Some(ReportConfig {
                instructions: "notes.md".into(),
                journal: "jpk".into(),
                data: DEFAULT_DATA_FILE.into(),
            })
        );
    }

    #[test]
    fn test_instructions_require_journal() {
        let err = StripConfig::from_args(&StripArgs {
            instructions: Some("notes.md".into()),
            journal: Some(String::new()),
            ..args()
        })
        .unwrap_err();

        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_doi_config() {
        let config = DoiConfig::from_args(&DoisArgs {
            input: "-".into(),
            output: "dois.sql".into(),
        });
        assert_eq!(config.input, InputSource::Stdin);
        assert_eq!(config.output, OutputTarget::File("dois.sql".into()));
    }
}

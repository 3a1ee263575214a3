//! Error types for the NXML CLI
//!
//! Wraps the library errors with messages that tell the user what to check.

use nxml_common::NxmlError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// User-facing error type for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// Input file could not be read
    #[error("Cannot read input '{path}': {source}. Verify the file path exists and you have read permissions.")]
    Input {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Output file could not be opened
    #[error("Cannot open output '{path}': {source}. Check the directory exists and you have write permissions.")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Options are missing or inconsistent
    #[error("Configuration error: {0}. Run with '--help' to see the available options.")]
    Config(String),

    /// The document could not be parsed
    #[error("Invalid Native XML: {0}")]
    InvalidXml(String),

    /// Transformation failed
    #[error(transparent)]
    Transform(NxmlError),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn input(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Input {
            path: path.into(),
            source,
        }
    }

    pub fn output(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Output {
            path: path.into(),
            source,
        }
    }
}

impl From<NxmlError> for CliError {
    fn from(err: NxmlError) -> Self {
        match err {
            NxmlError::Xml(msg) => Self::InvalidXml(msg),
            NxmlError::Io(err) => Self::Io(err),
            other => Self::Transform(other),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_library_errors_are_mapped() {
        assert!(matches!(
            CliError::from(NxmlError::xml("unexpected end")),
            CliError::InvalidXml(_)
        ));
        assert!(matches!(
            CliError::from(NxmlError::Io(std::io::Error::other("closed"))),
            CliError::Io(_)
        ));

        let err = CliError::from(NxmlError::MissingCurrentPublication {
            article: 3,
            publication_id: "12".into(),
        });
        assert_eq!(err.to_string(), "Article 3 has no publication with ID '12'");
    }

    #[test]
    fn test_messages_carry_hints() {
        let err = CliError::input(
            "missing.xml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert!(err.to_string().contains("'missing.xml'"));
        assert!(err.to_string().contains("read permissions"));

        let err = CliError::config("--journal is required");
        assert!(err.to_string().contains("--help"));
    }
}

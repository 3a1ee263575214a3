//! Error types for NXML

use thiserror::Error;

/// Result type alias for NXML operations
pub type Result<T> = std::result::Result<T, NxmlError>;

/// Main error type for NXML
///
/// Every variant is fatal for the run that raised it. Recoverable conditions
/// (such as an article without a DOI) are reported through `tracing` instead.
#[derive(Error, Debug)]
pub enum NxmlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Invalid path expression '{expression}': {reason}")]
    InvalidPath { expression: String, reason: String },

    #[error("Article {article} has no publication with ID '{publication_id}'")]
    MissingCurrentPublication {
        article: usize,
        publication_id: String,
    },

    #[error("The <file> entry with ID '{file_id}' was not found in submission file '{submission_file}'")]
    MissingFileRevision {
        submission_file: String,
        file_id: String,
    },
}

impl NxmlError {
    /// Create an XML error
    pub fn xml(msg: impl std::fmt::Display) -> Self {
        Self::Xml(msg.to_string())
    }

    /// Create an invalid path expression error
    pub fn invalid_path(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            expression: expression.into(),
            reason: reason.into(),
        }
    }
}

impl From<quick_xml::Error> for NxmlError {
    fn from(err: quick_xml::Error) -> Self {
        Self::xml(err)
    }
}

impl From<quick_xml::events::attributes::AttrError> for NxmlError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::xml(err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = NxmlError::MissingCurrentPublication {
            article: 3,
            publication_id: "12".to_string(),
        };
        assert_eq!(err.to_string(), "Article 3 has no publication with ID '12'");

        let err = NxmlError::invalid_path("pkp:[", "unexpected token");
        assert!(err.to_string().contains("pkp:["));
        assert!(err.to_string().contains("unexpected token"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: NxmlError = io.into();
        assert!(matches!(err, NxmlError::Io(_)));
    }
}

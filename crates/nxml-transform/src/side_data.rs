//! Side-data accumulator
//!
//! The locales and genres observed by filter runs, persisted as a small JSON
//! file so several exports (one per journal, say) can be folded into a single
//! database provisioning step:
//!
//! ```json
//! {
//!   "locales": ["en", "fr_CA"],
//!   "genres": ["Article Text"]
//! }
//! ```
//!
//! Concurrent runs against the same file are not coordinated; the last writer
//! wins.

use indexmap::IndexSet;
use nxml_common::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Accumulated locale and genre sets, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideData {
    #[serde(default)]
    pub locales: IndexSet<String>,
    #[serde(default)]
    pub genres: IndexSet<String>,
}

impl SideData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a previously saved accumulator
    ///
    /// A missing file starts an empty set. Content that is not a JSON object
    /// of string lists is logged and ignored rather than failing the run.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No side-data file, starting empty");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        match serde_json::from_str(&content) {
            Ok(data) => Ok(data),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Ignoring malformed side-data file"
                );
                Ok(Self::default())
            },
        }
    }

    /// Write the full sets, replacing any previous content
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        debug!(
            path = %path.display(),
            locales = self.locales.len(),
            genres = self.genres.len(),
            "Saved side-data"
        );
        Ok(())
    }

    /// Set union; existing entries keep their position
    pub fn merge(&mut self, other: SideData) {
        self.locales.extend(other.locales);
        self.genres.extend(other.genres);
    }

    pub fn add_locale(&mut self, locale: impl Into<String>) {
        self.locales.insert(locale.into());
    }

    pub fn add_genre(&mut self, genre: impl Into<String>) {
        self.genres.insert(genre.into());
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.locales.is_empty() && self.genres.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn data(locales: &[&str], genres: &[&str]) -> SideData {
        let mut data = SideData::new();
        locales.iter().for_each(|l| data.add_locale(*l));
        genres.iter().for_each(|g| data.add_genre(*g));
        data
    }

    #[test]
    fn test_merge_is_union_preserving_order() {
        let mut first = data(&["en", "fr_CA"], &["Article Text"]);
        first.merge(data(&["es", "en"], &["Image", "Article Text"]));

        assert_eq!(first.locales.iter().collect::<Vec<_>>(), vec!["en", "fr_CA", "es"]);
        assert_eq!(first.genres.iter().collect::<Vec<_>>(), vec!["Article Text", "Image"]);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let loaded = SideData::load(dir.path().join("data.json")).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");

        let original = data(&["en"], &["Article Text", "O'Brien \\ Notes"]);
        original.save(&path).unwrap();

        assert_eq!(SideData::load(&path).unwrap(), original);
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");

        data(&["en", "fr_CA"], &["Image"]).save(&path).unwrap();
        data(&["de"], &[]).save(&path).unwrap();

        assert_eq!(SideData::load(&path).unwrap(), data(&["de"], &[]));
    }

    #[test]
    fn test_load_tolerates_partial_and_malformed_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");

        std::fs::write(&path, r#"{"locales": ["en"]}"#).unwrap();
        assert_eq!(SideData::load(&path).unwrap(), data(&["en"], &[]));

        std::fs::write(&path, "not json").unwrap();
        assert!(SideData::load(&path).unwrap().is_empty());

        std::fs::write(&path, r#"{"locales": "en"}"#).unwrap();
        assert!(SideData::load(&path).unwrap().is_empty());

        std::fs::write(&path, "").unwrap();
        assert!(SideData::load(&path).unwrap().is_empty());
    }
}

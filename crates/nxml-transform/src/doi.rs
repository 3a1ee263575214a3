//! DOI extraction
//!
//! Builds one `INSERT` per article attaching the current publication's DOI to
//! the matching row of a target database, where the publication is found by
//! its title. Titles are not unique across journals, so two publications
//! sharing an exact title collapse onto whichever id the subselect returns.
//!
//! Articles without a current publication, a DOI or a title are skipped with
//! a warning instead of failing the run.

use crate::document::{Document, NodeId};
use crate::native;
use crate::query::PathQuery;
use crate::sql::quote_literal;
use nxml_common::Result;
use std::fmt;
use tracing::warn;

/// Why an article produced no statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoCurrentPublication,
    NoDoi,
    NoTitle,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoCurrentPublication => write!(f, "has no current publication"),
            SkipReason::NoDoi => write!(f, "has no DOI"),
            SkipReason::NoTitle => write!(f, "has no title"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedArticle {
    /// 1-based position among the document's articles
    pub article: usize,
    pub reason: SkipReason,
}

/// A DOI and the titles identifying its publication, unescaped
///
/// `Display` renders the SQL statement, followed by a blank line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoiStatement {
    pub doi: String,
    pub titles: Vec<String>,
}

impl fmt::Display for DoiStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let titles = self
            .titles
            .iter()
            .map(|title| quote_literal(title))
            .collect::<Vec<_>>()
            .join(", ");

        write!(
            f,
            "INSERT INTO publication_settings (publication_id, setting_name, setting_value, locale)\n\
             SELECT (SELECT DISTINCT ps.publication_id FROM publication_settings ps \
             WHERE ps.setting_name = 'title' AND ps.setting_value IN ({})) AS publication_id, \
             'pub-id::doi' AS setting_name, {} AS setting_value, '' AS locale;\n\n",
            titles,
            quote_literal(&self.doi),
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct DoiExtraction {
    /// Statements in article order
    pub statements: Vec<DoiStatement>,
    pub skipped: Vec<SkippedArticle>,
}

/// Extract a statement for every article carrying a DOI
pub fn extract_dois(document: &Document) -> Result<DoiExtraction> {
    let query = PathQuery::new();
    let mut extraction = DoiExtraction::default();

    for (index, article) in native::articles(&query, document)?.into_iter().enumerate() {
        let position = index + 1;

        match extract_article(&query, document, article)? {
            Ok(statement) => extraction.statements.push(statement),
            Err(reason) => {
                warn!(
                    article = position,
                    publication_id = %native::current_publication_id(document, article),
                    "Skipping article {}: it {}",
                    position,
                    reason
                );
                extraction.skipped.push(SkippedArticle {
                    article: position,
                    reason,
                });
            },
        }
    }

    Ok(extraction)
}

fn extract_article(
    query: &PathQuery,
    document: &Document,
    article: NodeId,
) -> Result<std::result::Result<DoiStatement, SkipReason>> {
    let Some(publication) = native::current_publication(query, document, article)? else {
        return Ok(Err(SkipReason::NoCurrentPublication));
    };

    let doi = query.select_text(document, "pkp:id[@type = 'doi']", Some(publication))?;
    if doi.is_empty() {
        return Ok(Err(SkipReason::NoDoi));
    }

    let titles = query
        .select(document, "pkp:title", Some(publication))?
        .strings(document);
    if titles.is_empty() {
        return Ok(Err(SkipReason::NoTitle));
    }

    Ok(Ok(DoiStatement { doi, titles }))
}

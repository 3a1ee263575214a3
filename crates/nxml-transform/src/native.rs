//! Native XML entities
//!
//! Lookups shared by the filter and the DOI extractor: the article list, the
//! resolution of an article's current publication, and identifier matching.

use crate::document::{Document, NodeId};
use crate::query::PathQuery;
use nxml_common::Result;

/// Every article in the export, in document order
pub const ARTICLES: &str = "//pkp:article";

/// Attribute of an article naming its current publication
pub const CURRENT_PUBLICATION_ATTR: &str = "current_publication_id";

/// Article elements in document order
pub fn articles(query: &PathQuery, document: &Document) -> Result<Vec<NodeId>> {
    Ok(query.select(document, ARTICLES, None)?.nodes().collect())
}

/// The `current_publication_id` of an article, trimmed
pub fn current_publication_id(document: &Document, article: NodeId) -> String {
    document
        .attribute(article, CURRENT_PUBLICATION_ATTR)
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Resolve the publication whose `pkp:id` equals the article's current id
///
/// Any of the publication's identifiers may match, whatever its `type`. The
/// id is compared in Rust rather than spliced into the expression, so quotes
/// in the attribute cannot alter the query.
pub fn current_publication(
    query: &PathQuery,
    document: &Document,
    article: NodeId,
) -> Result<Option<NodeId>> {
    let wanted = current_publication_id(document, article);
    if wanted.is_empty() {
        return Ok(None);
    }

    for publication in query.select(document, "pkp:publication", Some(article))?.nodes() {
        let ids = query.select(document, "pkp:id", Some(publication))?;
        if ids
            .strings(document)
            .iter()
            .any(|id| id.trim() == wanted)
        {
            return Ok(Some(publication));
        }
    }

    Ok(None)
}

/// Identifier equality, textual or numeric (`"7"` matches `"7.0"` and `" 7"`)
pub fn ids_match(left: &str, right: &str) -> bool {
    let (left, right) = (left.trim(), right.trim());
    if left == right {
        return true;
    }

    match (left.parse::<f64>(), right.parse::<f64>()) {
        (Ok(l), Ok(r)) => l == r,
        _ => false,
    }
}

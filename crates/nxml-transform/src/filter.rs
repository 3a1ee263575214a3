//! Native XML filter
//!
//! Strips an export down to what an import into another installation needs:
//!
//! - only the current publication of each article survives;
//! - submission files not referenced by the current publication's galleys are
//!   dropped, along with dependent files whose owner was dropped;
//! - each remaining submission file keeps only the revision named by its
//!   `file_id`.
//!
//! Nodes are collected before any of them is detached, so a removal never
//! disturbs the traversal that found it.

use crate::document::{Document, NodeId};
use crate::native::{self, ids_match};
use crate::query::PathQuery;
use crate::side_data::SideData;
use nxml_common::{NxmlError, Result};
use tracing::{debug, info};

/// Optional rewrites and collection switches for a filter run
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// Username written to every kept submission file's `uploader`
    pub uploader: Option<String>,
    /// User group written to the current publication's authors
    pub author_user_group: Option<String>,
    /// Record the locales and genres seen in the output
    pub collect_side_data: bool,
}

/// Removal counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub articles: usize,
    pub publications_removed: usize,
    pub submission_files_removed: usize,
    pub file_revisions_removed: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub stats: FilterStats,
    /// Locales and genres of this document, when collection was requested
    pub observed: Option<SideData>,
}

/// Filter the document in place
///
/// Fails on an article whose current publication cannot be found, and on a
/// kept submission file without a matching revision. The document may be
/// partially filtered when that happens.
pub fn filter_document(document: &mut Document, options: &FilterOptions) -> Result<FilterOutcome> {
    let query = PathQuery::new();
    let mut stats = FilterStats::default();
    let mut observed = options.collect_side_data.then(SideData::new);

    for (index, article) in native::articles(&query, document)?.into_iter().enumerate() {
        let position = index + 1;
        stats.articles += 1;

        let current = native::current_publication(&query, document, article)?.ok_or_else(|| {
            NxmlError::MissingCurrentPublication {
                article: position,
                publication_id: native::current_publication_id(document, article),
            }
        })?;

        stats.publications_removed += remove_other_publications(&query, document, article, current)?;

        let kept: Vec<String> = query
            .select(
                document,
                "pkp:article_galley/pkp:submission_file_ref/@id",
                Some(current),
            )?
            .strings(document);
        debug!(article = position, kept = ?kept, "Resolved galley files");

        let submission_files: Vec<NodeId> = query
            .select(document, "pkp:submission_file", Some(article))?
            .nodes()
            .collect();

        for submission_file in submission_files {
            if !is_referenced(&query, document, submission_file, &kept)? {
                document.detach(submission_file);
                stats.submission_files_removed += 1;
                continue;
            }

            if let Some(uploader) = &options.uploader {
                document.set_attribute(submission_file, "uploader", uploader);
            }

            if let Some(observed) = observed.as_mut() {
                match document.attribute(submission_file, "genre") {
                    Some(genre) if !genre.trim().is_empty() => observed.add_genre(genre),
                    _ => {},
                }
            }

            stats.file_revisions_removed += keep_current_revision(&query, document, submission_file)?;
        }

        if let Some(group) = &options.author_user_group {
            let authors: Vec<NodeId> = query
                .select(document, "pkp:authors/pkp:author", Some(current))?
                .nodes()
                .collect();
            for author in authors {
                document.set_attribute(author, "user_group_ref", group);
            }
        }
    }

    if let Some(observed) = observed.as_mut() {
        for locale in query.select(document, "//@locale", None)?.strings(document) {
            observed.add_locale(locale);
        }
    }

    info!(
        articles = stats.articles,
        publications_removed = stats.publications_removed,
        submission_files_removed = stats.submission_files_removed,
        file_revisions_removed = stats.file_revisions_removed,
        "Filtered document"
    );

    Ok(FilterOutcome { stats, observed })
}

fn remove_other_publications(
    query: &PathQuery,
    document: &mut Document,
    article: NodeId,
    current: NodeId,
) -> Result<usize> {
    let others: Vec<NodeId> = query
        .select(document, "pkp:publication", Some(article))?
        .nodes()
        .filter(|&publication| publication != current)
        .collect();

    for &publication in &others {
        document.detach(publication);
    }
    Ok(others.len())
}

/// Whether a submission file belongs to the current publication
///
/// A dependent file (one carrying a `submission_file_ref`) follows its owner,
/// any other file must be referenced directly.
fn is_referenced(
    query: &PathQuery,
    document: &Document,
    submission_file: NodeId,
    kept: &[String],
) -> Result<bool> {
    let owner = query.select_first(document, "pkp:submission_file_ref/@id", Some(submission_file))?;
    let id = match owner {
        Some(owner) => owner.string_value(document),
        None => document
            .attribute(submission_file, "id")
            .unwrap_or_default()
            .to_string(),
    };

    Ok(kept.iter().any(|kept| ids_match(kept, &id)))
}

/// Drop every `pkp:file` except the one named by `file_id`
fn keep_current_revision(
    query: &PathQuery,
    document: &mut Document,
    submission_file: NodeId,
) -> Result<usize> {
    let missing = |file_id: &str| NxmlError::MissingFileRevision {
        submission_file: document
            .attribute(submission_file, "id")
            .unwrap_or_default()
            .to_string(),
        file_id: file_id.to_string(),
    };

    let Some(file_id) = document.attribute(submission_file, "file_id") else {
        return Err(missing(""));
    };

    let files: Vec<NodeId> = query
        .select(document, "pkp:file", Some(submission_file))?
        .nodes()
        .collect();
    let current = files
        .iter()
        .copied()
        .find(|&file| ids_match(document.attribute(file, "id").unwrap_or_default(), file_id))
        .ok_or_else(|| missing(file_id))?;

    let superseded: Vec<NodeId> = files.into_iter().filter(|&file| file != current).collect();
    for &file in &superseded {
        document.detach(file);
    }
    Ok(superseded.len())
}

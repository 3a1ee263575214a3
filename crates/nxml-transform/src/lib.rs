//! NXML Transform Library
//!
//! Batch transformations over Native XML exports produced by PKP software
//! (OJS, OMP, OPS).
//!
//! # Pipelines
//!
//! - **Filter** ([`filter`]): strips non-published publications, orphaned
//!   submission files and superseded file revisions, optionally rewriting
//!   uploader and author-group references and collecting the locales and
//!   genres seen along the way ([`side_data`], [`report`]).
//! - **DOI extraction** ([`doi`]): produces one SQL statement per article that
//!   attaches the current publication's DOI, matching the publication by title.
//!
//! Both pipelines load the whole document into memory ([`document`]) and
//! address it through the path-query engine ([`query`]).
//!
//! # Example
//!
//! ```
//! use nxml_transform::document::Document;
//! use nxml_transform::filter::{filter_document, FilterOptions};
//!
//! let mut doc = Document::parse(r#"<articles xmlns="http://pkp.sfu.ca">
//!   <article current_publication_id="1">
//!     <publication><id type="internal">1</id></publication>
//!     <publication><id type="internal">2</id></publication>
//!   </article>
//! </articles>"#)?;
//!
//! let outcome = filter_document(&mut doc, &FilterOptions::default())?;
//! assert_eq!(outcome.stats.publications_removed, 1);
//! # Ok::<(), nxml_common::NxmlError>(())
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod document;
pub mod doi;
pub mod filter;
pub mod native;
pub mod query;
pub mod report;
pub mod side_data;
pub mod sql;

pub use document::{Document, NodeId};
pub use query::PathQuery;
pub use side_data::SideData;

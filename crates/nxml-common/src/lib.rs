//! NXML Common Library
//!
//! Shared error handling and logging for the Native XML tools.
//!
//! # Overview
//!
//! This crate provides common functionality used across all NXML workspace members:
//!
//! - **Error Handling**: The `NxmlError` type and the `Result` alias
//! - **Logging**: `tracing` subscriber configuration and initialization
//!
//! # Example
//!
//! ```no_run
//! use nxml_common::{NxmlError, Result};
//!
//! fn require_id(id: Option<&str>, article: usize) -> Result<&str> {
//!     id.ok_or_else(|| NxmlError::MissingCurrentPublication {
//!         article,
//!         publication_id: String::new(),
//!     })
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{NxmlError, Result};

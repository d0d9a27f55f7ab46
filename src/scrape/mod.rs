//! Index scraping: turn the origin's category index page into a catalog.
//!
//! The fetch itself goes through
//! [`HttpClient::fetch_page`](crate::download::HttpClient::fetch_page); this
//! module owns the HTML-to-tree step.
//! Browser-driven expansion of lazily loaded categories is out of scope —
//! the parser consumes whatever markup the fetch returns and handles
//! arbitrary nesting.

mod parser;

pub use parser::parse_index;

use thiserror::Error;

use crate::catalog::Catalog;

/// Errors from parsing the index page.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The page carries no `ul.indice` category list. Saving an empty
    /// catalog here would silently wipe resumability, so this is fatal.
    #[error("no category index found in the fetched page")]
    MissingIndex,
}

/// Parses the index page HTML into a full catalog with summary counts.
///
/// # Errors
///
/// Returns [`ScrapeError::MissingIndex`] when the page has no category
/// index at all.
pub fn extract_catalog(html: &str) -> Result<Catalog, ScrapeError> {
    let categories = parser::parse_index(html)?;
    Ok(Catalog::from_categories(categories))
}

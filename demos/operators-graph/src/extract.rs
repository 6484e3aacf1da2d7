//! Pulling operator names out of the documentation page.

use crate::error::GraphError;
use scraper::{Html, Selector};

/// Anchors inside table cells: one per operator
pub const NAME_SELECTOR: &str = "table td a";

/// Names of every `table td a` anchor in `html`, in document order
///
/// Text is trimmed and empty names are dropped. Duplicates are kept.
///
/// # Errors
///
/// Returns [`GraphError::Selector`] if the selector fails to compile.
pub fn extract_names(html: &str) -> Result<Vec<String>, GraphError> {
    extract_with(html, NAME_SELECTOR)
}

/// Like [`extract_names`] with a custom selector
///
/// # Errors
///
/// Returns [`GraphError::Selector`] if `selector` is not valid CSS.
pub fn extract_with(html: &str, selector: &str) -> Result<Vec<String>, GraphError> {
    let parsed = Selector::parse(selector).map_err(|e| GraphError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })?;

    let document = Html::parse_document(html);
    let names: Vec<String> = document
        .select(&parsed)
        .map(|anchor| anchor.text().collect::<String>().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    tracing::debug!(count = names.len(), "Extracted names");
    Ok(names)
}

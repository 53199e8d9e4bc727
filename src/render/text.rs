//! Plain text rendering for analysed documents.

use crate::error::Result;
use crate::model::Document;

/// Convert a document to plain text.
///
/// Pages are separated by a form feed. Within a page, tables and
/// paragraphs appear top to bottom; table rows are tab-separated.
pub fn to_text(doc: &Document) -> Result<String> {
    let output = doc
        .pages
        .iter()
        .map(|page| page.plain_text())
        .collect::<Vec<_>>()
        .join("\n\u{000C}\n");

    Ok(output.trim().to_string())
}

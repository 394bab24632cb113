//! Plain text in reading order.

use crate::error::Result;
use crate::layout::{OrderOptions, ReadingOrderResolver};
use crate::model::{BlockType, Document};

/// Convert a document to plain text, one line of text per LINE block.
///
/// Lines follow the reading order of each page; pages are separated by a
/// blank line.
pub fn to_text(doc: &Document, options: &OrderOptions) -> Result<String> {
    let order = ReadingOrderResolver::with_options(options.clone()).resolve(doc)?;
    let index = doc.index();

    let mut pages = Vec::with_capacity(order.pages.len());
    for page in &order.pages {
        let lines: Vec<&str> = page
            .sequence
            .iter()
            .filter_map(|id| index.get(id))
            .filter(|b| b.block_type == BlockType::Line)
            .filter_map(|b| b.text.as_deref())
            .collect();
        pages.push(lines.join("\n"));
    }

    Ok(pages.join("\n\n").trim().to_string())
}

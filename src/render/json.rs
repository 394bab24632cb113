//! JSON reading and writing for analyzed documents.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::model::Document;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a document to JSON.
///
/// Absent fields are omitted rather than written as `null`.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(doc)?,
        JsonFormat::Compact => serde_json::to_string(doc)?,
    };
    Ok(json)
}

/// Parse a document from JSON text.
pub fn from_json(json: &str) -> Result<Document> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a document from JSON bytes.
pub fn from_json_bytes(data: &[u8]) -> Result<Document> {
    Ok(serde_json::from_slice(data)?)
}

/// Write a document as JSON to a file.
pub fn write_json<P: AsRef<Path>>(doc: &Document, path: P, format: JsonFormat) -> Result<()> {
    let json = to_json(doc, format)?;
    fs::write(path, json)?;
    Ok(())
}

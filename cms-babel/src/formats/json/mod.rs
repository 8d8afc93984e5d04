//! Rich-tree JSON format
//!
//! The editor's exchange format: `{"object": "document", "nodes": [...]}`
//! with `object`/`type`/`data`/`nodes`/`text`/`marks` on every node. Parsing
//! validates node types and payloads (see [`crate::rich::RawNodeError`]);
//! the tree is returned as stored, without normalization.

use crate::error::FormatError;
use crate::format::Format;
use crate::rich::Document;

/// Format implementation for rich-tree JSON
pub struct JsonFormat;

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Rich editor tree as JSON"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        serde_json::from_str(source).map_err(|e| FormatError::ParseError(e.to_string()))
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        serde_json::to_string_pretty(doc)
            .map(|json| json + "\n")
            .map_err(|e| FormatError::SerializationError(e.to_string()))
    }
}

//! Document AST JSON format
//!
//! Reads and writes the document AST (`{"type": "root", "children": [...]}`)
//! that sits between the rich tree and Markdown. Parsing deserializes the
//! AST into the rich tree and normalizes it, like the Markdown format.

use crate::common::{deserialize, serialize, DeserializeOptions, SerializeOptions};
use crate::error::FormatError;
use crate::format::{bool_option, reject_unknown_options, Format};
use crate::mdast::MdNode;
use crate::rich::Document;
use crate::schema::default_schema;
use std::collections::HashMap;

const VOID_CODE_BLOCK: &str = "void-code-block";

/// Format implementation for document AST JSON
#[derive(Debug, Clone, Default)]
pub struct MdastFormat {
    void_code_block: bool,
}

impl MdastFormat {
    pub fn with_void_code_block(mut self, void_code_block: bool) -> Self {
        self.void_code_block = void_code_block;
        self
    }

    fn options(&self, options: &HashMap<String, String>) -> Result<bool, FormatError> {
        reject_unknown_options(self.name(), options, &[VOID_CODE_BLOCK])?;
        bool_option(options, VOID_CODE_BLOCK, self.void_code_block)
    }
}

/// Pretty JSON for a document AST node.
pub fn mdast_to_json(root: &MdNode) -> Result<String, FormatError> {
    serde_json::to_string_pretty(root)
        .map(|json| json + "\n")
        .map_err(|e| FormatError::SerializationError(e.to_string()))
}

impl Format for MdastFormat {
    fn name(&self) -> &str {
        "mdast"
    }

    fn description(&self) -> &str {
        "Markdown document AST as JSON"
    }

    fn file_extensions(&self) -> &[&str] {
        &["mdast"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        self.parse_with_options(source, &HashMap::new())
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        self.serialize_with_options(doc, &HashMap::new())
    }

    fn parse_with_options(
        &self,
        source: &str,
        options: &HashMap<String, String>,
    ) -> Result<Document, FormatError> {
        let void_code_block = self.options(options)?;
        let root: MdNode =
            serde_json::from_str(source).map_err(|e| FormatError::ParseError(e.to_string()))?;
        let document = deserialize(&root, &DeserializeOptions { void_code_block })
            .map_err(|e| FormatError::ParseError(e.to_string()))?;
        Ok(default_schema().normalize(document))
    }

    fn serialize_with_options(
        &self,
        doc: &Document,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        let void_code_block = self.options(options)?;
        let root = serialize(doc, &SerializeOptions { void_code_block })?;
        mdast_to_json(&root)
    }
}

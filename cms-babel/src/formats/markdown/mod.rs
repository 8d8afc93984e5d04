//! Markdown format implementation
//!
//! This module implements bidirectional conversion between the rich editor
//! tree and CommonMark Markdown (with the GFM table and strikethrough
//! extensions).
//!
//! # Library Choice
//!
//! We use the `comrak` crate for Markdown parsing and serialization. A single
//! crate covers both directions and the extensions we need. Comrak's AST is
//! only seen by this module; the rest of the crate works on the document AST
//! ([`crate::mdast`]).
//!
//! # Element Mapping Table
//!
//! | Rich tree        | Document AST     | Markdown                      | Notes                                  |
//! |------------------|------------------|-------------------------------|----------------------------------------|
//! | paragraph        | paragraph        | Paragraph                     | Direct mapping                         |
//! | heading-one..six | heading depth    | `#` .. `######`               | ATX headings on export                 |
//! | quote            | blockquote       | `> quote`                     | Direct mapping                         |
//! | code-block       | code             | Fenced code block             | First info word → lang, rest → meta    |
//! | bulleted-list    | list             | `- item`                      | Bullet configurable                    |
//! | numbered-list    | list (ordered)   | `3. item`                     | Start number preserved                 |
//! | table / row / cell | table / row / cell | GFM table                 | First row is the header                |
//! | thematic-break   | thematicBreak    | `***`                         | Direct mapping                         |
//! | break            | break            | `<br>` block                  | Inline breaks become hard line breaks  |
//! | shortcode        | shortcode        | Component markdown            | Top-level paragraphs only on import    |
//! | link / image     | link / image     | `[t](u)` / `![a](u)`          | Image marks survive only in the tree   |
//! | bold/italic/strikethrough/code marks | strong/emphasis/delete/inlineCode | `**` `*` `~` `` ` `` | Consolidated on export |
//!
//! # Lossy Conversions
//!
//! - Unmarked text is exported as raw inline HTML, so Markdown typed into the
//!   editor stays Markdown (it is not escaped).
//! - Raw HTML blocks are imported as paragraphs holding their source.
//! - Front matter, footnotes and other unsupported constructs are dropped on
//!   import (logged at debug level).
//! - Soft line breaks survive as `"\n"` inside text.

pub mod parser;
pub mod serializer;

use crate::common::{deserialize, serialize, DeserializeOptions, SerializeOptions};
use crate::error::FormatError;
use crate::format::{bool_option, reject_unknown_options, Format};
use crate::plugins::ComponentRegistry;
use crate::rich::Document;
use crate::schema::default_schema;
use comrak::ComrakOptions;
use std::collections::HashMap;

pub use parser::parse_to_mdast;
pub use serializer::{serialize_mdast, BuildOptions};

pub(crate) fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.front_matter_delimiter = Some("---".to_string());
    options.render.unsafe_ = true;
    options.render.prefer_fenced = true;
    options
}

const VOID_CODE_BLOCK: &str = "void-code-block";

/// Format implementation for Markdown
#[derive(Debug, Clone)]
pub struct MarkdownFormat {
    void_code_block: bool,
    bullet_char: char,
    components: ComponentRegistry,
}

impl Default for MarkdownFormat {
    fn default() -> Self {
        MarkdownFormat {
            void_code_block: false,
            bullet_char: '-',
            components: ComponentRegistry::new(),
        }
    }
}

impl MarkdownFormat {
    pub fn new(components: ComponentRegistry) -> Self {
        MarkdownFormat {
            components,
            ..Self::default()
        }
    }

    /// Keep code block values in block data instead of a text child.
    pub fn with_void_code_block(mut self, void_code_block: bool) -> Self {
        self.void_code_block = void_code_block;
        self
    }

    /// Bullet used for bulleted lists on export: `-`, `*` or `+`.
    pub fn with_bullet_char(mut self, bullet_char: char) -> Result<Self, FormatError> {
        if !matches!(bullet_char, '-' | '*' | '+') {
            return Err(FormatError::NotSupported(format!(
                "Bullet '{bullet_char}' is not a Markdown list bullet"
            )));
        }
        self.bullet_char = bullet_char;
        Ok(self)
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    fn void_code_block(&self, options: &HashMap<String, String>) -> Result<bool, FormatError> {
        reject_unknown_options(self.name(), options, &[VOID_CODE_BLOCK])?;
        bool_option(options, VOID_CODE_BLOCK, self.void_code_block)
    }

    fn parse_document(&self, source: &str, void_code_block: bool) -> Result<Document, FormatError> {
        let root = parse_to_mdast(source, &self.components);
        let document = deserialize(&root, &DeserializeOptions { void_code_block })
            .map_err(|e| FormatError::ParseError(e.to_string()))?;
        Ok(default_schema().normalize(document))
    }

    fn serialize_document(&self, doc: &Document, void_code_block: bool) -> Result<String, FormatError> {
        let root = serialize(doc, &SerializeOptions { void_code_block })?;
        let render = |data: &crate::rich::ShortcodeData| self.components.to_block(data);
        serialize_mdast(
            &root,
            &BuildOptions {
                bullet_char: self.bullet_char as u8,
                render_shortcode: &render,
            },
        )
    }
}

impl Format for MarkdownFormat {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "CommonMark Markdown format"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        self.parse_document(source, self.void_code_block)
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        self.serialize_document(doc, self.void_code_block)
    }

    fn parse_with_options(
        &self,
        source: &str,
        options: &HashMap<String, String>,
    ) -> Result<Document, FormatError> {
        let void_code_block = self.void_code_block(options)?;
        self.parse_document(source, void_code_block)
    }

    fn serialize_with_options(
        &self,
        doc: &Document,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        let void_code_block = self.void_code_block(options)?;
        self.serialize_document(doc, void_code_block)
    }
}

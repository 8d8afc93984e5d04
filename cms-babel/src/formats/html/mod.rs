//! HTML format implementation
//!
//! Export-only preview HTML, as shown next to the editor.
//!
//! # Library Choice
//!
//! Rendering reuses `comrak`, the Markdown library behind
//! [`super::markdown`], so the preview and the stored Markdown cannot
//! disagree about syntax.
//!
//! # Element Mapping
//!
//! Elements render as comrak renders their Markdown export (`<p>`, `<h2>`,
//! `<ul>`, `<pre><code class="language-x">`, GFM tables, ...). Shortcodes
//! render through their component's preview template.
//!
//! # Raw HTML
//!
//! Unmarked editor text is exported as raw HTML, and component previews are
//! HTML blocks. With `unsafe-html` off, comrak replaces raw HTML with a
//! placeholder comment, which hides component previews too.

mod serializer;

use crate::error::FormatError;
use crate::format::{bool_option, reject_unknown_options, Format};
use crate::plugins::ComponentRegistry;
use crate::rich::Document;
use serializer::PreviewOptions;
use std::collections::HashMap;

const UNSAFE_HTML: &str = "unsafe-html";
const VOID_CODE_BLOCK: &str = "void-code-block";

/// Format implementation for HTML previews
#[derive(Debug, Clone)]
pub struct HtmlFormat {
    unsafe_html: bool,
    void_code_block: bool,
    components: ComponentRegistry,
}

impl Default for HtmlFormat {
    fn default() -> Self {
        HtmlFormat {
            unsafe_html: true,
            void_code_block: false,
            components: ComponentRegistry::new(),
        }
    }
}

impl HtmlFormat {
    pub fn new(components: ComponentRegistry) -> Self {
        HtmlFormat {
            components,
            ..Self::default()
        }
    }

    /// Pass raw HTML (and component previews) through unchanged.
    pub fn with_unsafe_html(mut self, unsafe_html: bool) -> Self {
        self.unsafe_html = unsafe_html;
        self
    }

    pub fn with_void_code_block(mut self, void_code_block: bool) -> Self {
        self.void_code_block = void_code_block;
        self
    }
}

impl Format for HtmlFormat {
    fn name(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "HTML preview rendered through CommonMark"
    }

    fn file_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        self.serialize_with_options(doc, &HashMap::new())
    }

    fn serialize_with_options(
        &self,
        doc: &Document,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        reject_unknown_options(self.name(), options, &[UNSAFE_HTML, VOID_CODE_BLOCK])?;
        serializer::serialize_to_html(
            doc,
            &PreviewOptions {
                unsafe_html: bool_option(options, UNSAFE_HTML, self.unsafe_html)?,
                void_code_block: bool_option(options, VOID_CODE_BLOCK, self.void_code_block)?,
                components: &self.components,
            },
        )
    }
}

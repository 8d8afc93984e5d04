//! CLI-specific transforms
//!
//! This module defines the views available through `cms-md inspect`. Each
//! transform names the tree it shows and the rendering (e.g. "mdast-treeviz").
//!
//! ## Transform Pipeline
//!
//! 1. **Import** - Markdown, rich JSON or document AST JSON → rich tree, as
//!    stored (no normalization)
//!    - `rich-json`: the imported rich tree
//!    - `schema-violations`: what the default schema finds wrong with it
//!
//! 2. **Normalization** - rich tree → rich tree satisfying the schema
//!    - `normalized-json`: the repaired rich tree
//!
//! 3. **Serialization** - normalized rich tree → document AST
//!    - `mdast-json`: the document AST as JSON
//!    - `mdast-treeviz`: the document AST as a tree with Unicode icons
//!
//! ## Extra Parameters
//!
//! - `show-data`: include node payloads in `mdast-treeviz`
//! - `void-code-block`: keep code block values in block data
//!
//! Example: `cms-md inspect post.md mdast-treeviz --extra-show-data`

use cms_babel::common::{deserialize, serialize, DeserializeOptions, SerializeOptions};
use cms_babel::format::Format;
use cms_babel::formats::markdown::parse_to_mdast;
use cms_babel::formats::mdast::mdast_to_json;
use cms_babel::formats::treeviz::to_treeviz_str;
use cms_babel::formats::JsonFormat;
use cms_babel::{default_schema, ComponentRegistry, Document, MdNode};

/// All available CLI transforms
pub const AVAILABLE_TRANSFORMS: &[&str] = &[
    "rich-json",
    "normalized-json",
    "schema-violations",
    "mdast-json",
    "mdast-treeviz",
];

/// Transform used when `inspect` is given none.
pub const DEFAULT_TRANSFORM: &str = "mdast-treeviz";

/// Settings shared by every transform.
#[derive(Clone, Default)]
pub struct TransformOptions {
    pub void_code_block: bool,
    pub show_data: bool,
    pub components: ComponentRegistry,
}

/// Import a source as a rich tree without normalizing it.
///
/// `from` is a format name: `markdown`, `json` (rich tree) or `mdast`.
pub fn load_document(source: &str, from: &str, options: &TransformOptions) -> Result<Document, String> {
    let deserialize_options = DeserializeOptions {
        void_code_block: options.void_code_block,
    };
    match from {
        "markdown" => {
            let root = parse_to_mdast(source, &options.components);
            deserialize(&root, &deserialize_options).map_err(|e| format!("Import failed: {e}"))
        }
        "json" => JsonFormat.parse(source).map_err(|e| format!("Import failed: {e}")),
        "mdast" => {
            let root: MdNode =
                serde_json::from_str(source).map_err(|e| format!("Import failed: {e}"))?;
            deserialize(&root, &deserialize_options).map_err(|e| format!("Import failed: {e}"))
        }
        other => Err(format!("Cannot inspect '{other}' sources")),
    }
}

/// Execute a named transform on a source
///
/// # Examples
///
/// ```ignore
/// let options = TransformOptions::default();
/// let tree = execute_transform("# Title\n", "markdown", "mdast-treeviz", &options)?;
/// let problems = execute_transform(&json, "json", "schema-violations", &options)?;
/// ```
pub fn execute_transform(
    source: &str,
    from: &str,
    transform_name: &str,
    options: &TransformOptions,
) -> Result<String, String> {
    let document = load_document(source, from, options)?;
    let schema = default_schema();

    match transform_name {
        "rich-json" => to_json(&document),
        "normalized-json" => to_json(&schema.normalize(document)),
        "schema-violations" => {
            let violations = schema.validate(&document);
            if violations.is_empty() {
                return Ok("No schema violations\n".to_string());
            }
            Ok(violations.iter().map(|v| format!("{v}\n")).collect())
        }
        "mdast-json" | "mdast-treeviz" => {
            let root = serialize(
                &schema.normalize(document),
                &SerializeOptions {
                    void_code_block: options.void_code_block,
                },
            )
            .map_err(|e| format!("Transform failed: {e}"))?;
            if transform_name == "mdast-json" {
                mdast_to_json(&root).map_err(|e| format!("JSON serialization failed: {e}"))
            } else {
                Ok(to_treeviz_str(&root, options.show_data))
            }
        }
        _ => Err(format!("Unknown transform: {transform_name}")),
    }
}

fn to_json(document: &Document) -> Result<String, String> {
    JsonFormat
        .serialize(document)
        .map_err(|e| format!("JSON serialization failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_LIST: &str = r#"{
        "object": "document",
        "nodes": [
            { "object": "block", "type": "bulleted-list", "nodes": [] },
            { "object": "block", "type": "paragraph", "nodes": [{ "object": "text", "text": "x" }] }
        ]
    }"#;

    #[test]
    fn every_transform_runs_on_markdown() {
        let options = TransformOptions::default();
        for transform in AVAILABLE_TRANSFORMS {
            let output = execute_transform("# Title\n\n- a\n- b\n", "markdown", transform, &options);
            assert!(output.is_ok(), "{transform}: {output:?}");
        }
    }

    #[test]
    fn treeviz_shows_the_document_ast() {
        let output = execute_transform(
            "Some **bold** text\n",
            "markdown",
            "mdast-treeviz",
            &TransformOptions::default(),
        )
        .unwrap();
        assert!(output.starts_with("⧉ Document (1 blocks)\n"), "{output}");
        assert!(output.contains("𝐁 bold"), "{output}");
    }

    #[test]
    fn violations_are_listed_before_normalization() {
        let options = TransformOptions::default();
        let output = execute_transform(EMPTY_LIST, "json", "schema-violations", &options).unwrap();
        assert!(output.contains("bulleted-list: child_min_invalid"), "{output}");

        let normalized = execute_transform(EMPTY_LIST, "json", "normalized-json", &options).unwrap();
        assert!(!normalized.contains("bulleted-list"), "{normalized}");
    }

    #[test]
    fn clean_documents_report_no_violations() {
        let output = execute_transform(
            "Hello\n",
            "markdown",
            "schema-violations",
            &TransformOptions::default(),
        )
        .unwrap();
        assert_eq!(output, "No schema violations\n");
    }

    #[test]
    fn unknown_sources_are_rejected() {
        let result = execute_transform("<p>x</p>", "html", "rich-json", &TransformOptions::default());
        assert!(result.is_err());
    }
}

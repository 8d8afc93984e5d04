//! Treeviz formatter for document AST nodes
//!
//! Treeviz is a visual representation of the document AST that a rich tree
//! serializes to. It is meant for inspecting conversions: mark consolidation
//! and whitespace hoisting are easy to see here and hard to see in Markdown.
//!
//! It encodes the node structure as box-drawing connectors, with 2 columns per
//! level of nesting.
//!
//! So the format is :
//! <prefix><connector> <icon><space><label> (truncated to 30 characters)
//!
//! Example:
//!
//! ```text
//! ⧉ Document (2 blocks)
//! ├─ § Title
//! │ └─ ◦ Title
//! └─ ¶ Aboldword
//!   ├─ ‹ A
//!   ├─ 𝐁 bold
//!   │ └─ ‹ bold
//!   └─ ‹ word
//! ```
//!
//! With `show-data`, node payloads (code meta, link titles, shortcode fields)
//! are listed as `≔ key=value` lines ahead of the node's children.

use super::icons::get_icon;
use crate::common::{serialize, SerializeOptions};
use crate::error::FormatError;
use crate::format::{bool_option, reject_unknown_options, Format};
use crate::mdast::MdNode;
use crate::rich::Document;
use serde_json::{Map, Value};
use std::collections::HashMap;

const MAX_LABEL: usize = 30;

const SHOW_DATA: &str = "show-data";
const VOID_CODE_BLOCK: &str = "void-code-block";

fn truncate(label: &str) -> String {
    let label = label.replace('\n', "⏎");
    if label.chars().count() <= MAX_LABEL {
        return label;
    }
    let mut short: String = label.chars().take(MAX_LABEL - 1).collect();
    short.push('…');
    short
}

fn display_label(node: &MdNode) -> String {
    match node {
        MdNode::Root { children } => format!("Document ({} blocks)", children.len()),
        MdNode::Code { lang, value, .. } => match lang {
            Some(lang) => format!("{lang}: {value}"),
            None => value.clone(),
        },
        MdNode::List {
            ordered: true,
            start,
            children,
        } => format!("{} items from {start}", children.len()),
        MdNode::List { children, .. } => format!("{} items", children.len()),
        MdNode::Table { children } => format!("{} rows", children.len()),
        MdNode::TableRow { children } => format!("{} cells", children.len()),
        MdNode::Shortcode { data } => data.shortcode.clone(),
        MdNode::Link { url, .. } => url.clone(),
        MdNode::Image { url, alt, .. } => alt.clone().unwrap_or_else(|| url.clone()),
        MdNode::Break | MdNode::ThematicBreak => String::new(),
        other => other.to_plain_text(),
    }
}

fn data_fields(node: &MdNode) -> Vec<(String, String)> {
    fn entries(map: &Map<String, Value>) -> impl Iterator<Item = (String, String)> + '_ {
        map.iter().map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
    }

    let mut fields = Vec::new();
    match node {
        MdNode::Code { data, .. } | MdNode::InlineCode { data, .. } => fields.extend(entries(data)),
        MdNode::Link { title, data, .. } => {
            fields.extend(title.iter().map(|t| ("title".to_string(), t.clone())));
            fields.extend(entries(data));
        }
        MdNode::Image {
            url, title, data, ..
        } => {
            fields.push(("url".to_string(), url.clone()));
            fields.extend(title.iter().map(|t| ("title".to_string(), t.clone())));
            fields.extend(entries(data));
        }
        MdNode::Shortcode { data } => fields.extend(entries(&data.shortcode_data)),
        _ => {}
    }
    fields
}

/// Format a single node and its subtree
fn format_node(
    node: &MdNode,
    prefix: &str,
    child_index: usize,
    child_count: usize,
    show_data: bool,
) -> String {
    let mut output = String::new();
    let is_last = child_index == child_count - 1;
    let connector = if is_last { "└─" } else { "├─" };
    let icon = get_icon(node.type_name());

    output.push_str(&format!(
        "{}{} {} {}\n",
        prefix,
        connector,
        icon,
        truncate(&display_label(node))
    ));

    let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    let children = node.children();

    if show_data {
        let fields = data_fields(node);
        for (i, (key, value)) in fields.iter().enumerate() {
            let connector = if i == fields.len() - 1 && children.is_empty() {
                "└─"
            } else {
                "├─"
            };
            output.push_str(&format!(
                "{}{} {} {}={}\n",
                child_prefix,
                connector,
                get_icon("data"),
                key,
                truncate(value)
            ));
        }
    }

    output + &format_children(children, &child_prefix, show_data)
}

fn format_children(children: &[MdNode], prefix: &str, show_data: bool) -> String {
    let mut output = String::new();
    let child_count = children.len();
    for (i, child) in children.iter().enumerate() {
        output.push_str(&format_node(child, prefix, i, child_count, show_data));
    }
    output
}

/// Render a document AST root as a tree.
pub fn to_treeviz_str(root: &MdNode, show_data: bool) -> String {
    let mut output = format!("{} {}\n", get_icon(root.type_name()), display_label(root));
    output.push_str(&format_children(root.children(), "", show_data));
    output
}

/// Format implementation for treeviz format
#[derive(Debug, Clone, Default)]
pub struct TreevizFormat {
    show_data: bool,
    void_code_block: bool,
}

impl TreevizFormat {
    pub fn with_show_data(mut self, show_data: bool) -> Self {
        self.show_data = show_data;
        self
    }

    pub fn with_void_code_block(mut self, void_code_block: bool) -> Self {
        self.void_code_block = void_code_block;
        self
    }
}

impl Format for TreevizFormat {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn description(&self) -> &str {
        "Visual tree of the Markdown document AST with Unicode icons"
    }

    fn file_extensions(&self) -> &[&str] {
        &["tree", "treeviz"]
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
        reject_unknown_options(self.name(), options, &[SHOW_DATA, VOID_CODE_BLOCK])?;
        let show_data = bool_option(options, SHOW_DATA, self.show_data)?;
        let void_code_block = bool_option(options, VOID_CODE_BLOCK, self.void_code_block)?;
        let root = serialize(doc, &SerializeOptions { void_code_block })?;
        Ok(to_treeviz_str(&root, show_data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rich::ShortcodeData;

    #[test]
    fn test_tree_shape() {
        let root = MdNode::root(vec![
            MdNode::Heading {
                depth: 1,
                children: vec![MdNode::text("Title")],
            },
            MdNode::paragraph(vec![
                MdNode::html("A"),
                MdNode::Strong {
                    children: vec![MdNode::html("bold")],
                },
            ]),
        ]);
        insta::assert_snapshot!(to_treeviz_str(&root, false), @r"
        ⧉ Document (2 blocks)
        ├─ § Title
        │ └─ ◦ Title
        └─ ¶ Abold
          ├─ ‹ A
          └─ 𝐁 bold
            └─ ‹ bold
        ");
    }

    #[test]
    fn test_labels_are_truncated() {
        let root = MdNode::root(vec![MdNode::paragraph(vec![MdNode::text("x".repeat(40))])]);
        let tree = to_treeviz_str(&root, false);
        assert!(tree.contains(&format!("{}…", "x".repeat(29))), "{tree}");
    }

    #[test]
    fn test_show_data_lists_payloads() {
        let mut fields = Map::new();
        fields.insert("id".to_string(), Value::from("abc"));
        let root = MdNode::root(vec![MdNode::Shortcode {
            data: ShortcodeData {
                shortcode: "youtube".to_string(),
                shortcode_data: fields,
            },
        }]);
        assert!(!to_treeviz_str(&root, false).contains("id=abc"));
        assert!(to_treeviz_str(&root, true).contains("└─ ≔ id=abc"));
    }
}

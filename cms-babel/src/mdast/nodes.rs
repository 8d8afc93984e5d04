//! Document AST node types.
//!
//! An MDAST-shaped tagged union. Values are produced fresh by each
//! serialization and serialize to the usual JSON shape
//! (`{"type": "heading", "depth": 2, "children": [...]}`).

use crate::rich::ShortcodeData;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn one() -> u64 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MdNode {
    Root {
        children: Vec<MdNode>,
    },
    Paragraph {
        children: Vec<MdNode>,
    },
    Heading {
        depth: u8,
        children: Vec<MdNode>,
    },
    Blockquote {
        children: Vec<MdNode>,
    },
    Code {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lang: Option<String>,
        value: String,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        data: Map<String, Value>,
    },
    List {
        ordered: bool,
        #[serde(default = "one")]
        start: u64,
        children: Vec<MdNode>,
    },
    ListItem {
        children: Vec<MdNode>,
    },
    Table {
        children: Vec<MdNode>,
    },
    TableRow {
        children: Vec<MdNode>,
    },
    TableCell {
        children: Vec<MdNode>,
    },
    Break,
    ThematicBreak,
    Shortcode {
        data: ShortcodeData,
    },
    Text {
        value: String,
    },
    /// Raw content passed through the stringifier verbatim.
    Html {
        value: String,
    },
    Emphasis {
        children: Vec<MdNode>,
    },
    Strong {
        children: Vec<MdNode>,
    },
    Delete {
        children: Vec<MdNode>,
    },
    InlineCode {
        value: String,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        data: Map<String, Value>,
    },
    Link {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        data: Map<String, Value>,
        children: Vec<MdNode>,
    },
    Image {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        data: Map<String, Value>,
    },
}

impl MdNode {
    pub fn root(children: Vec<MdNode>) -> Self {
        MdNode::Root { children }
    }

    pub fn paragraph(children: Vec<MdNode>) -> Self {
        MdNode::Paragraph { children }
    }

    pub fn text(value: impl Into<String>) -> Self {
        MdNode::Text {
            value: value.into(),
        }
    }

    pub fn html(value: impl Into<String>) -> Self {
        MdNode::Html {
            value: value.into(),
        }
    }

    pub fn inline_code(value: impl Into<String>) -> Self {
        MdNode::InlineCode {
            value: value.into(),
            data: Map::new(),
        }
    }

    /// MDAST type name (`heading`, `inlineCode`, ...).
    pub fn type_name(&self) -> &'static str {
        match self {
            MdNode::Root { .. } => "root",
            MdNode::Paragraph { .. } => "paragraph",
            MdNode::Heading { .. } => "heading",
            MdNode::Blockquote { .. } => "blockquote",
            MdNode::Code { .. } => "code",
            MdNode::List { .. } => "list",
            MdNode::ListItem { .. } => "listItem",
            MdNode::Table { .. } => "table",
            MdNode::TableRow { .. } => "tableRow",
            MdNode::TableCell { .. } => "tableCell",
            MdNode::Break => "break",
            MdNode::ThematicBreak => "thematicBreak",
            MdNode::Shortcode { .. } => "shortcode",
            MdNode::Text { .. } => "text",
            MdNode::Html { .. } => "html",
            MdNode::Emphasis { .. } => "emphasis",
            MdNode::Strong { .. } => "strong",
            MdNode::Delete { .. } => "delete",
            MdNode::InlineCode { .. } => "inlineCode",
            MdNode::Link { .. } => "link",
            MdNode::Image { .. } => "image",
        }
    }

    pub fn children(&self) -> &[MdNode] {
        match self {
            MdNode::Root { children }
            | MdNode::Paragraph { children }
            | MdNode::Heading { children, .. }
            | MdNode::Blockquote { children }
            | MdNode::List { children, .. }
            | MdNode::ListItem { children }
            | MdNode::Table { children }
            | MdNode::TableRow { children }
            | MdNode::TableCell { children }
            | MdNode::Emphasis { children }
            | MdNode::Strong { children }
            | MdNode::Delete { children }
            | MdNode::Link { children, .. } => children,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<MdNode>> {
        match self {
            MdNode::Root { children }
            | MdNode::Paragraph { children }
            | MdNode::Heading { children, .. }
            | MdNode::Blockquote { children }
            | MdNode::List { children, .. }
            | MdNode::ListItem { children }
            | MdNode::Table { children }
            | MdNode::TableRow { children }
            | MdNode::TableCell { children }
            | MdNode::Emphasis { children }
            | MdNode::Strong { children }
            | MdNode::Delete { children }
            | MdNode::Link { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Phrasing content: text, raw html, mark wrappers, inline code, links,
    /// images and inline breaks.
    pub fn is_phrasing(&self) -> bool {
        matches!(
            self,
            MdNode::Text { .. }
                | MdNode::Html { .. }
                | MdNode::Emphasis { .. }
                | MdNode::Strong { .. }
                | MdNode::Delete { .. }
                | MdNode::InlineCode { .. }
                | MdNode::Link { .. }
                | MdNode::Image { .. }
                | MdNode::Break
        )
    }

    /// Concatenated literal text below this node.
    pub fn to_plain_text(&self) -> String {
        match self {
            MdNode::Text { value } | MdNode::Html { value } | MdNode::InlineCode { value, .. } => {
                value.clone()
            }
            MdNode::Code { value, .. } => value.clone(),
            MdNode::Break => "\n".to_string(),
            MdNode::Image { alt, .. } => alt.clone().unwrap_or_default(),
            other => other.children().iter().map(MdNode::to_plain_text).collect(),
        }
    }
}

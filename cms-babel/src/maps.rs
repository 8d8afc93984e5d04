//! Rich tree ⇄ document AST type tables
//!
//! Pure data, consumed by both conversion directions and by the schema
//! engine's selectors.
//!
//! | Rich tree type   | Document AST type |
//! |------------------|-------------------|
//! | (document)       | root              |
//! | paragraph        | paragraph         |
//! | heading-one…six  | heading (depth)   |
//! | quote            | blockquote        |
//! | code-block       | code              |
//! | bulleted-list    | list              |
//! | numbered-list    | list (ordered)    |
//! | list-item        | listItem          |
//! | table            | table             |
//! | table-row        | tableRow          |
//! | table-cell       | tableCell         |
//! | break            | break             |
//! | thematic-break   | thematicBreak     |
//! | shortcode        | shortcode         |
//! | link             | link              |
//! | image            | image             |
//!
//! | Mark           | Document AST wrapper |
//! |----------------|----------------------|
//! | bold           | strong               |
//! | italic         | emphasis             |
//! | strikethrough  | delete               |
//! | code           | inlineCode           |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The `object` half of a node's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Document,
    Block,
    Inline,
    Text,
}

impl ObjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Document => "document",
            ObjectKind::Block => "block",
            ObjectKind::Inline => "inline",
            ObjectKind::Text => "text",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `type` half of a block or inline node's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeType {
    Paragraph,
    HeadingOne,
    HeadingTwo,
    HeadingThree,
    HeadingFour,
    HeadingFive,
    HeadingSix,
    Quote,
    CodeBlock,
    BulletedList,
    NumberedList,
    ListItem,
    Table,
    TableRow,
    TableCell,
    Break,
    ThematicBreak,
    Shortcode,
    Link,
    Image,
}

const TYPE_MAP: &[(NodeType, &str, &str)] = &[
    (NodeType::Paragraph, "paragraph", "paragraph"),
    (NodeType::HeadingOne, "heading-one", "heading"),
    (NodeType::HeadingTwo, "heading-two", "heading"),
    (NodeType::HeadingThree, "heading-three", "heading"),
    (NodeType::HeadingFour, "heading-four", "heading"),
    (NodeType::HeadingFive, "heading-five", "heading"),
    (NodeType::HeadingSix, "heading-six", "heading"),
    (NodeType::Quote, "quote", "blockquote"),
    (NodeType::CodeBlock, "code-block", "code"),
    (NodeType::BulletedList, "bulleted-list", "list"),
    (NodeType::NumberedList, "numbered-list", "list"),
    (NodeType::ListItem, "list-item", "listItem"),
    (NodeType::Table, "table", "table"),
    (NodeType::TableRow, "table-row", "tableRow"),
    (NodeType::TableCell, "table-cell", "tableCell"),
    (NodeType::Break, "break", "break"),
    (NodeType::ThematicBreak, "thematic-break", "thematicBreak"),
    (NodeType::Shortcode, "shortcode", "shortcode"),
    (NodeType::Link, "link", "link"),
    (NodeType::Image, "image", "image"),
];

const HEADINGS: [NodeType; 6] = [
    NodeType::HeadingOne,
    NodeType::HeadingTwo,
    NodeType::HeadingThree,
    NodeType::HeadingFour,
    NodeType::HeadingFive,
    NodeType::HeadingSix,
];

/// Block types allowed at the top level of a document.
pub const TOP_LEVEL_BLOCKS: &[NodeType] = &[
    NodeType::Paragraph,
    NodeType::HeadingOne,
    NodeType::HeadingTwo,
    NodeType::HeadingThree,
    NodeType::HeadingFour,
    NodeType::HeadingFive,
    NodeType::HeadingSix,
    NodeType::Quote,
    NodeType::CodeBlock,
    NodeType::BulletedList,
    NodeType::NumberedList,
    NodeType::Break,
    NodeType::ThematicBreak,
    NodeType::Table,
    NodeType::Shortcode,
];

impl NodeType {
    /// Rich tree type name, e.g. `heading-two`.
    pub fn as_str(self) -> &'static str {
        TYPE_MAP
            .iter()
            .find(|(node_type, _, _)| *node_type == self)
            .map(|(_, name, _)| *name)
            .unwrap_or_default()
    }

    /// Document AST type name, e.g. `heading`.
    pub fn mdast_type(self) -> &'static str {
        TYPE_MAP
            .iter()
            .find(|(node_type, _, _)| *node_type == self)
            .map(|(_, _, mdast)| *mdast)
            .unwrap_or_default()
    }

    pub fn object(self) -> ObjectKind {
        match self {
            NodeType::Link | NodeType::Image => ObjectKind::Inline,
            _ => ObjectKind::Block,
        }
    }

    /// Whether a node of this type may have the given object kind. `break`
    /// is a block between blocks and an inline (hard line break) in text.
    pub fn allows_object(self, object: ObjectKind) -> bool {
        self.object() == object || (self == NodeType::Break && object == ObjectKind::Inline)
    }

    /// Heading level for `heading-*` types.
    pub fn heading_level(self) -> Option<HeadingLevel> {
        HEADINGS
            .iter()
            .position(|heading| *heading == self)
            .map(|index| HeadingLevel::ALL[index])
    }

    pub fn is_heading(self) -> bool {
        self.heading_level().is_some()
    }

    pub fn is_list(self) -> bool {
        matches!(self, NodeType::BulletedList | NodeType::NumberedList)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Level of a heading block. Headings carry this instead of a free
/// [`NodeType`], so a heading can only ever be one of the six heading types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HeadingLevel {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
}

impl HeadingLevel {
    pub const ALL: [HeadingLevel; 6] = [
        HeadingLevel::One,
        HeadingLevel::Two,
        HeadingLevel::Three,
        HeadingLevel::Four,
        HeadingLevel::Five,
        HeadingLevel::Six,
    ];

    /// Level for a Markdown heading depth; depths past six clamp to six.
    pub fn from_depth(depth: u8) -> Option<HeadingLevel> {
        match depth {
            0 => None,
            depth => Some(Self::ALL[usize::from(depth.min(6) - 1)]),
        }
    }

    /// Markdown heading depth, 1–6.
    pub fn depth(self) -> u8 {
        self as u8 + 1
    }

    pub fn node_type(self) -> NodeType {
        HEADINGS[self as usize]
    }
}

/// A type tag that is not part of the mapping tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} type '{name}'")]
pub struct UnknownType {
    pub kind: &'static str,
    pub name: String,
}

impl FromStr for NodeType {
    type Err = UnknownType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TYPE_MAP
            .iter()
            .find(|(_, name, _)| *name == s)
            .map(|(node_type, _, _)| *node_type)
            .ok_or_else(|| UnknownType {
                kind: "node",
                name: s.to_string(),
            })
    }
}

/// Inline styling attached to text leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mark {
    Bold,
    Italic,
    Strikethrough,
    Code,
}

const MARK_MAP: &[(Mark, &str, &str)] = &[
    (Mark::Bold, "bold", "strong"),
    (Mark::Italic, "italic", "emphasis"),
    (Mark::Strikethrough, "strikethrough", "delete"),
    (Mark::Code, "code", "inlineCode"),
];

impl Mark {
    pub const ALL: [Mark; 4] = [Mark::Bold, Mark::Italic, Mark::Strikethrough, Mark::Code];

    pub fn as_str(self) -> &'static str {
        MARK_MAP
            .iter()
            .find(|(mark, _, _)| *mark == self)
            .map(|(_, name, _)| *name)
            .unwrap_or_default()
    }

    /// Document AST node type that expresses this mark.
    pub fn mdast_type(self) -> &'static str {
        MARK_MAP
            .iter()
            .find(|(mark, _, _)| *mark == self)
            .map(|(_, _, mdast)| *mdast)
            .unwrap_or_default()
    }

    /// Inverse of [`Mark::mdast_type`].
    pub fn from_mdast_type(name: &str) -> Option<Mark> {
        MARK_MAP
            .iter()
            .find(|(_, _, mdast)| *mdast == name)
            .map(|(mark, _, _)| *mark)
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mark {
    type Err = UnknownType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MARK_MAP
            .iter()
            .find(|(_, name, _)| *name == s)
            .map(|(mark, _, _)| *mark)
            .ok_or_else(|| UnknownType {
                kind: "mark",
                name: s.to_string(),
            })
    }
}

impl Serialize for Mark {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Mark {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

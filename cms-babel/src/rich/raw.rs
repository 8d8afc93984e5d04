//! Raw JSON shape of the rich tree.
//!
//! The editor exchanges trees as "raw" JSON objects keyed by `object`/`type`
//! with an untyped `data` bag. This is the only place untyped tags are
//! accepted: they are checked against the mapping tables and lifted into the
//! structured per-kind payloads on the way in, and flattened back on the way
//! out.

use super::nodes::{
    Block, BlockKind, CodeBlockData, Document, ImageData, Inline, InlineKind, LinkData, Node,
    ShortcodeData, Text,
};
use crate::maps::{Mark, NodeType, ObjectKind, UnknownType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while lifting raw JSON into the rich tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RawNodeError {
    #[error(transparent)]
    UnknownType(#[from] UnknownType),
    #[error("{0} node is missing its 'type'")]
    MissingType(ObjectKind),
    #[error("'{node_type}' is a {expected} type but was given object '{found}'")]
    ObjectMismatch {
        node_type: NodeType,
        expected: ObjectKind,
        found: ObjectKind,
    },
    #[error("invalid data for '{node_type}': {message}")]
    InvalidData { node_type: NodeType, message: String },
    #[error("expected a document, found object '{0}'")]
    NotADocument(ObjectKind),
    #[error("a document cannot be nested inside another node")]
    NestedDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMark {
    #[serde(rename = "type")]
    pub mark_type: Mark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    pub object: ObjectKind,
    #[serde(default)]
    pub nodes: Vec<RawNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub object: ObjectKind,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<RawNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<RawMark>,
}

impl TryFrom<RawDocument> for Document {
    type Error = RawNodeError;

    fn try_from(raw: RawDocument) -> Result<Self, Self::Error> {
        if raw.object != ObjectKind::Document {
            return Err(RawNodeError::NotADocument(raw.object));
        }
        let nodes = raw
            .nodes
            .into_iter()
            .map(Node::try_from)
            .collect::<Result<_, _>>()?;
        Ok(Document { nodes })
    }
}

impl From<Document> for RawDocument {
    fn from(doc: Document) -> Self {
        RawDocument {
            object: ObjectKind::Document,
            nodes: doc.nodes.into_iter().map(RawNode::from).collect(),
        }
    }
}

impl TryFrom<RawNode> for Node {
    type Error = RawNodeError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        if raw.object == ObjectKind::Text {
            return Ok(Node::Text(Text {
                text: raw.text.unwrap_or_default(),
                marks: raw.marks.into_iter().map(|m| m.mark_type).collect(),
            }));
        }
        if raw.object == ObjectKind::Document {
            return Err(RawNodeError::NestedDocument);
        }

        let name = raw
            .node_type
            .as_deref()
            .ok_or(RawNodeError::MissingType(raw.object))?;
        let node_type: NodeType = name.parse()?;
        if !node_type.allows_object(raw.object) {
            return Err(RawNodeError::ObjectMismatch {
                node_type,
                expected: node_type.object(),
                found: raw.object,
            });
        }

        let nodes = raw
            .nodes
            .into_iter()
            .map(Node::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let mut data = raw.data;

        let node = match node_type {
            NodeType::Break if raw.object == ObjectKind::Inline => Node::Inline(Inline::line_break()),
            NodeType::Link => Node::Inline(Inline {
                kind: InlineKind::Link(LinkData {
                    url: take_string(&mut data, "url", node_type)?.unwrap_or_default(),
                    title: take_string(&mut data, "title", node_type)?,
                    extra: data,
                }),
                nodes,
            }),
            NodeType::Image => {
                let marks = take_marks(&mut data, node_type)?;
                Node::Inline(Inline {
                    kind: InlineKind::Image(ImageData {
                        url: take_string(&mut data, "url", node_type)?.unwrap_or_default(),
                        title: take_string(&mut data, "title", node_type)?,
                        alt: take_string(&mut data, "alt", node_type)?,
                        marks,
                        extra: data,
                    }),
                    nodes,
                })
            }
            other => Node::Block(Block {
                kind: block_kind(other, data)?,
                nodes,
            }),
        };
        Ok(node)
    }
}

fn block_kind(node_type: NodeType, mut data: Map<String, Value>) -> Result<BlockKind, RawNodeError> {
    if let Some(level) = node_type.heading_level() {
        return Ok(BlockKind::Heading(level));
    }
    let kind = match node_type {
        NodeType::Paragraph => BlockKind::Paragraph,
        NodeType::Quote => BlockKind::Quote,
        NodeType::CodeBlock => BlockKind::CodeBlock(CodeBlockData {
            lang: take_string(&mut data, "lang", node_type)?,
            code: take_string(&mut data, "code", node_type)?,
            extra: data,
        }),
        NodeType::BulletedList => BlockKind::BulletedList,
        NodeType::NumberedList => {
            let start = match data.get("start") {
                None | Some(Value::Null) => 1,
                Some(value) => value.as_u64().ok_or_else(|| RawNodeError::InvalidData {
                    node_type,
                    message: format!("'start' must be a non-negative integer, got {value}"),
                })?,
            };
            BlockKind::NumberedList { start }
        }
        NodeType::ListItem => BlockKind::ListItem,
        NodeType::Table => BlockKind::Table,
        NodeType::TableRow => BlockKind::TableRow,
        NodeType::TableCell => BlockKind::TableCell,
        NodeType::Break => BlockKind::Break,
        NodeType::ThematicBreak => BlockKind::ThematicBreak,
        NodeType::Shortcode => {
            let shortcode: ShortcodeData = serde_json::from_value(Value::Object(data)).map_err(
                |e| RawNodeError::InvalidData {
                    node_type,
                    message: e.to_string(),
                },
            )?;
            BlockKind::Shortcode(shortcode)
        }
        inline => {
            return Err(RawNodeError::ObjectMismatch {
                node_type: inline,
                expected: ObjectKind::Inline,
                found: ObjectKind::Block,
            })
        }
    };
    Ok(kind)
}

fn take_string(
    data: &mut Map<String, Value>,
    key: &str,
    node_type: NodeType,
) -> Result<Option<String>, RawNodeError> {
    match data.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(other) => Err(RawNodeError::InvalidData {
            node_type,
            message: format!("'{key}' must be a string, got {other}"),
        }),
    }
}

fn take_marks(data: &mut Map<String, Value>, node_type: NodeType) -> Result<Vec<Mark>, RawNodeError> {
    match data.remove("marks") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => {
            let marks: Vec<RawMark> =
                serde_json::from_value(value).map_err(|e| RawNodeError::InvalidData {
                    node_type,
                    message: e.to_string(),
                })?;
            Ok(marks.into_iter().map(|m| m.mark_type).collect())
        }
    }
}

fn put_string(data: &mut Map<String, Value>, key: &str, value: Option<String>) {
    if let Some(value) = value {
        data.insert(key.to_string(), Value::String(value));
    }
}

fn raw_marks(marks: Vec<Mark>) -> Vec<RawMark> {
    marks
        .into_iter()
        .map(|mark_type| RawMark { mark_type })
        .collect()
}

impl From<Node> for RawNode {
    fn from(node: Node) -> Self {
        match node {
            Node::Text(text) => RawNode {
                object: ObjectKind::Text,
                node_type: None,
                data: Map::new(),
                nodes: Vec::new(),
                text: Some(text.text),
                marks: raw_marks(text.marks),
            },
            Node::Inline(inline) => {
                let node_type = inline.node_type();
                let data = match inline.kind {
                    InlineKind::Link(link) => {
                        let mut data = link.extra;
                        data.insert("url".to_string(), Value::String(link.url));
                        put_string(&mut data, "title", link.title);
                        data
                    }
                    InlineKind::Image(image) => {
                        let mut data = image.extra;
                        data.insert("url".to_string(), Value::String(image.url));
                        put_string(&mut data, "title", image.title);
                        put_string(&mut data, "alt", image.alt);
                        if !image.marks.is_empty() {
                            let marks = raw_marks(image.marks);
                            if let Ok(value) = serde_json::to_value(marks) {
                                data.insert("marks".to_string(), value);
                            }
                        }
                        data
                    }
                    InlineKind::Break => Map::new(),
                };
                RawNode {
                    object: ObjectKind::Inline,
                    node_type: Some(node_type.as_str().to_string()),
                    data,
                    nodes: inline.nodes.into_iter().map(RawNode::from).collect(),
                    text: None,
                    marks: Vec::new(),
                }
            }
            Node::Block(block) => {
                let node_type = block.node_type();
                let data = match block.kind {
                    BlockKind::CodeBlock(code) => {
                        let mut data = code.extra;
                        put_string(&mut data, "lang", code.lang);
                        put_string(&mut data, "code", code.code);
                        data
                    }
                    BlockKind::NumberedList { start } => {
                        let mut data = Map::new();
                        data.insert("start".to_string(), Value::from(start));
                        data
                    }
                    BlockKind::Shortcode(shortcode) => {
                        let mut data = Map::new();
                        data.insert("shortcode".to_string(), Value::String(shortcode.shortcode));
                        data.insert(
                            "shortcodeData".to_string(),
                            Value::Object(shortcode.shortcode_data),
                        );
                        data
                    }
                    _ => Map::new(),
                };
                RawNode {
                    object: ObjectKind::Block,
                    node_type: Some(node_type.as_str().to_string()),
                    data,
                    nodes: block.nodes.into_iter().map(RawNode::from).collect(),
                    text: None,
                    marks: Vec::new(),
                }
            }
        }
    }
}

//! Core data structures for the rich editor tree.
//!
//! The rich tree mirrors the editor's document model: a document owns blocks,
//! blocks own blocks, inlines or text leaves, and text leaves carry marks.
//! Per-kind data is structured; only shortcodes and the pass-through `extra`
//! entries are open maps.

use crate::maps::{HeadingLevel, Mark, NodeType, ObjectKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Root of a rich tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "super::raw::RawDocument", into = "super::raw::RawDocument")]
pub struct Document {
    pub nodes: Vec<Node>,
}

/// Any node below the document root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "super::raw::RawNode", into = "super::raw::RawNode")]
pub enum Node {
    Block(Block),
    Inline(Inline),
    Text(Text),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Paragraph,
    Heading(HeadingLevel),
    Quote,
    CodeBlock(CodeBlockData),
    BulletedList,
    NumberedList { start: u64 },
    ListItem,
    Table,
    TableRow,
    TableCell,
    Break,
    ThematicBreak,
    Shortcode(ShortcodeData),
}

/// Code block payload.
///
/// `code` holds the value when code blocks are void; otherwise the value lives
/// in the block's text children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CodeBlockData {
    pub lang: Option<String>,
    pub code: Option<String>,
    pub extra: Map<String, Value>,
}

/// Opaque payload of a plugin-defined block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShortcodeData {
    /// Id of the editor component that owns this block.
    pub shortcode: String,
    #[serde(rename = "shortcodeData", default)]
    pub shortcode_data: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Inline {
    pub kind: InlineKind,
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InlineKind {
    Link(LinkData),
    Image(ImageData),
    /// Hard line break inside phrasing content. Void, never has children.
    Break,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinkData {
    pub url: String,
    pub title: Option<String>,
    pub extra: Map<String, Value>,
}

/// Image payload. Inlines cannot carry marks, so an image's marks live here.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageData {
    pub url: String,
    pub title: Option<String>,
    pub alt: Option<String>,
    pub marks: Vec<Mark>,
    pub extra: Map<String, Value>,
}

/// A run of text with an ordered set of marks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Text {
    pub text: String,
    pub marks: Vec<Mark>,
}

impl Document {
    pub fn new(nodes: Vec<Node>) -> Self {
        Document { nodes }
    }

    /// Concatenated text of every leaf, in document order.
    pub fn text(&self) -> String {
        self.nodes.iter().map(Node::text).collect()
    }
}

impl Node {
    pub fn object(&self) -> ObjectKind {
        match self {
            Node::Block(_) => ObjectKind::Block,
            Node::Inline(_) => ObjectKind::Inline,
            Node::Text(_) => ObjectKind::Text,
        }
    }

    /// Type tag of blocks and inlines; text leaves have none.
    pub fn node_type(&self) -> Option<NodeType> {
        match self {
            Node::Block(block) => Some(block.kind.node_type()),
            Node::Inline(inline) => Some(inline.kind.node_type()),
            Node::Text(_) => None,
        }
    }

    /// Display name used in diagnostics (`paragraph`, `link`, `text`).
    pub fn name(&self) -> &'static str {
        self.node_type()
            .map(NodeType::as_str)
            .unwrap_or_else(|| self.object().as_str())
    }

    pub fn is_block(&self) -> bool {
        matches!(self, Node::Block(_))
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Block(block) => &block.nodes,
            Node::Inline(inline) => &inline.nodes,
            Node::Text(_) => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Block(block) => Some(&mut block.nodes),
            Node::Inline(inline) => Some(&mut inline.nodes),
            Node::Text(_) => None,
        }
    }

    pub fn text(&self) -> String {
        match self {
            Node::Text(text) => text.text.clone(),
            Node::Inline(Inline {
                kind: InlineKind::Break,
                ..
            }) => "\n".to_string(),
            other => other.children().iter().map(Node::text).collect(),
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<Block> for Node {
    fn from(block: Block) -> Self {
        Node::Block(block)
    }
}

impl From<Inline> for Node {
    fn from(inline: Inline) -> Self {
        Node::Inline(inline)
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}

impl Block {
    pub fn new(kind: BlockKind, nodes: Vec<Node>) -> Self {
        Block { kind, nodes }
    }

    /// Leaf block with no children (`thematic-break`, void code blocks, ...).
    pub fn leaf(kind: BlockKind) -> Self {
        Block::new(kind, Vec::new())
    }

    pub fn paragraph(nodes: Vec<Node>) -> Self {
        Block::new(BlockKind::Paragraph, nodes)
    }

    /// The editor's default block: a paragraph holding one empty text leaf.
    pub fn empty_paragraph() -> Self {
        Block::paragraph(vec![Text::plain("").into()])
    }

    pub fn heading(level: HeadingLevel, nodes: Vec<Node>) -> Self {
        Block::new(BlockKind::Heading(level), nodes)
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }
}

impl BlockKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            BlockKind::Paragraph => NodeType::Paragraph,
            BlockKind::Heading(level) => level.node_type(),
            BlockKind::Quote => NodeType::Quote,
            BlockKind::CodeBlock(_) => NodeType::CodeBlock,
            BlockKind::BulletedList => NodeType::BulletedList,
            BlockKind::NumberedList { .. } => NodeType::NumberedList,
            BlockKind::ListItem => NodeType::ListItem,
            BlockKind::Table => NodeType::Table,
            BlockKind::TableRow => NodeType::TableRow,
            BlockKind::TableCell => NodeType::TableCell,
            BlockKind::Break => NodeType::Break,
            BlockKind::ThematicBreak => NodeType::ThematicBreak,
            BlockKind::Shortcode(_) => NodeType::Shortcode,
        }
    }
}

impl Inline {
    pub fn link(url: impl Into<String>, nodes: Vec<Node>) -> Self {
        Inline {
            kind: InlineKind::Link(LinkData {
                url: url.into(),
                ..LinkData::default()
            }),
            nodes,
        }
    }

    pub fn image(data: ImageData) -> Self {
        Inline {
            kind: InlineKind::Image(data),
            nodes: Vec::new(),
        }
    }

    pub fn line_break() -> Self {
        Inline {
            kind: InlineKind::Break,
            nodes: Vec::new(),
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }
}

impl InlineKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            InlineKind::Link(_) => NodeType::Link,
            InlineKind::Image(_) => NodeType::Image,
            InlineKind::Break => NodeType::Break,
        }
    }
}

impl Text {
    pub fn plain(text: impl Into<String>) -> Self {
        Text {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    pub fn marked(text: impl Into<String>, marks: &[Mark]) -> Self {
        let mut leaf = Text::plain(text);
        for mark in marks {
            leaf.add_mark(*mark);
        }
        leaf
    }

    pub fn has_mark(&self, mark: Mark) -> bool {
        self.marks.contains(&mark)
    }

    /// Adds a mark, keeping the set free of duplicates.
    pub fn add_mark(&mut self, mark: Mark) {
        if !self.has_mark(mark) {
            self.marks.push(mark);
        }
    }

    pub fn remove_mark(&mut self, mark: Mark) {
        self.marks.retain(|existing| *existing != mark);
    }

    /// True when both leaves carry the same marks, ignoring order.
    pub fn same_marks(&self, other: &Text) -> bool {
        self.marks.len() == other.marks.len() && self.marks.iter().all(|m| other.has_mark(*m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_behave_as_a_set() {
        let mut text = Text::marked("a", &[Mark::Bold, Mark::Bold, Mark::Italic]);
        assert_eq!(text.marks, vec![Mark::Bold, Mark::Italic]);
        text.remove_mark(Mark::Bold);
        assert_eq!(text.marks, vec![Mark::Italic]);
        assert!(text.same_marks(&Text::marked("b", &[Mark::Italic])));
    }

    #[test]
    fn text_flattens_leaves() {
        let doc = Document::new(vec![
            Block::paragraph(vec![
                Text::plain("Hello ").into(),
                Inline::link("https://example.com", vec![Text::plain("world").into()]).into(),
                Inline::line_break().into(),
                Text::plain("again").into(),
            ])
            .into(),
        ]);
        assert_eq!(doc.text(), "Hello world\nagain");
    }

    #[test]
    fn node_identity() {
        let node: Node = Block::heading(HeadingLevel::Two, vec![]).into();
        assert_eq!(node.node_type(), Some(NodeType::HeadingTwo));
        assert_eq!(node.object(), ObjectKind::Block);
        assert_eq!(Node::from(Text::plain("x")).name(), "text");
    }
}

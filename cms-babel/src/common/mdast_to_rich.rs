//! Converts the Markdown document AST into the rich editor tree.
//!
//! # The High-Level Concept
//!
//! The reverse of [`super::rich_to_mdast`]. Styling in the document AST is
//! nested (`strong > emphasis > text`), while the rich tree flattens it into
//! a mark set on each text leaf. Walking down through wrapper nodes we keep a
//! stack of the marks seen so far; every terminal string node becomes a text
//! leaf carrying that stack.
//!
//! # The Algorithm
//!
//! 1. **Blocks** map one to one through the type tables, restoring per-kind
//!    data (heading depth, list order and start, code language and value).
//! 2. **Phrasing content** is flattened:
//!    - `strong`, `emphasis`, `delete` push a mark and recurse
//!    - `html` becomes a leaf with the current marks, as is
//!    - `text` is literal, so it is Markdown-escaped before it becomes a leaf
//!      (leaves hold Markdown source, see [`super::escape`])
//!    - `inlineCode` becomes a leaf with the current marks plus `code`
//!    - an inline `break` becomes an inline `break` node
//!    - links recurse with the inherited marks; images store them in data
//! 3. **Canonical form:** marks are kept in table order, adjacent leaves with
//!    the same marks merge, empty leaves are dropped, and empty paragraphs or
//!    headings get a single empty leaf.

use super::escape::escape_markdown;
use crate::error::ConversionError;
use crate::maps::{HeadingLevel, Mark};
use crate::mdast::MdNode;
use crate::rich::{
    Block, BlockKind, CodeBlockData, Document, ImageData, Inline, InlineKind, LinkData, Node,
    Text,
};

/// Options for [`deserialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeserializeOptions {
    /// Store code block values in `data.code` instead of a text child.
    pub void_code_block: bool,
}

/// Converts a document AST `root` into a rich document.
pub fn deserialize(root: &MdNode, options: &DeserializeOptions) -> Result<Document, ConversionError> {
    let MdNode::Root { children } = root else {
        return Err(ConversionError::NotARoot(root.type_name().to_string()));
    };
    Ok(Document::new(convert_blocks("root", children, options)?))
}

fn convert_blocks(
    parent: &str,
    nodes: &[MdNode],
    options: &DeserializeOptions,
) -> Result<Vec<Node>, ConversionError> {
    nodes
        .iter()
        .map(|node| convert_block(parent, node, options).map(Node::Block))
        .collect()
}

/// Children of containers that hold either blocks or phrasing content.
fn convert_mixed(
    parent: &str,
    nodes: &[MdNode],
    options: &DeserializeOptions,
) -> Result<Vec<Node>, ConversionError> {
    match nodes.first() {
        Some(first) if first.is_phrasing() && *first != MdNode::Break => {
            convert_inline_children(parent, nodes)
        }
        _ => convert_blocks(parent, nodes, options),
    }
}

fn convert_block(parent: &str, node: &MdNode, options: &DeserializeOptions) -> Result<Block, ConversionError> {
    let block = match node {
        MdNode::Paragraph { children } => {
            Block::paragraph(text_block_children("paragraph", children)?)
        }
        MdNode::Heading { depth, children } => {
            let level = HeadingLevel::from_depth(*depth)
                .ok_or(ConversionError::InvalidHeadingDepth(*depth))?;
            Block::new(
                BlockKind::Heading(level),
                text_block_children(level.node_type().as_str(), children)?,
            )
        }
        MdNode::Blockquote { children } => Block::new(
            BlockKind::Quote,
            convert_mixed("quote", children, options)?,
        ),
        MdNode::Code { lang, value, data } => {
            let mut code = CodeBlockData {
                lang: lang.clone(),
                code: None,
                extra: data.clone(),
            };
            if options.void_code_block {
                code.code = Some(value.clone());
                Block::leaf(BlockKind::CodeBlock(code))
            } else {
                Block::new(
                    BlockKind::CodeBlock(code),
                    vec![Text::plain(value.clone()).into()],
                )
            }
        }
        MdNode::List {
            ordered,
            start,
            children,
        } => {
            let kind = if *ordered {
                BlockKind::NumberedList { start: *start }
            } else {
                BlockKind::BulletedList
            };
            let parent = kind.node_type().as_str();
            Block::new(kind, convert_blocks(parent, children, options)?)
        }
        MdNode::ListItem { children } => Block::new(
            BlockKind::ListItem,
            convert_mixed("list-item", children, options)?,
        ),
        MdNode::Table { children } => {
            Block::new(BlockKind::Table, convert_blocks("table", children, options)?)
        }
        MdNode::TableRow { children } => Block::new(
            BlockKind::TableRow,
            convert_blocks("table-row", children, options)?,
        ),
        MdNode::TableCell { children } => Block::new(
            BlockKind::TableCell,
            convert_mixed("table-cell", children, options)?,
        ),
        MdNode::Break => Block::leaf(BlockKind::Break),
        MdNode::ThematicBreak => Block::leaf(BlockKind::ThematicBreak),
        MdNode::Shortcode { data } => Block::leaf(BlockKind::Shortcode(data.clone())),
        other => {
            return Err(ConversionError::UnexpectedNode {
                parent: parent.to_string(),
                found: other.type_name().to_string(),
            })
        }
    };
    Ok(block)
}

fn text_block_children(parent: &str, nodes: &[MdNode]) -> Result<Vec<Node>, ConversionError> {
    let children = convert_inline_children(parent, nodes)?;
    if children.is_empty() {
        return Ok(vec![Text::plain("").into()]);
    }
    Ok(children)
}

fn convert_inline_children(parent: &str, nodes: &[MdNode]) -> Result<Vec<Node>, ConversionError> {
    let mut out = Vec::new();
    for node in nodes {
        convert_inline(parent, node, &[], &mut out)?;
    }
    Ok(canonicalize(out))
}

fn leaf(value: &str, marks: &[Mark]) -> Node {
    let mut text = Text::marked(value, marks);
    text.marks.sort();
    Node::Text(text)
}

fn with_mark(marks: &[Mark], mark: Mark) -> Vec<Mark> {
    let mut marks = marks.to_vec();
    if !marks.contains(&mark) {
        marks.push(mark);
    }
    marks
}

fn convert_inline(
    parent: &str,
    node: &MdNode,
    marks: &[Mark],
    out: &mut Vec<Node>,
) -> Result<(), ConversionError> {
    match node {
        MdNode::Text { value } => {
            let line_start = at_line_start(parent, marks, out);
            out.push(leaf(&escape_markdown(value, line_start), marks));
        }
        MdNode::Html { value } => out.push(leaf(value, marks)),
        MdNode::InlineCode { value, .. } => out.push(leaf(value, &with_mark(marks, Mark::Code))),
        MdNode::Break => out.push(Node::Inline(Inline::line_break())),
        MdNode::Strong { children } | MdNode::Emphasis { children } | MdNode::Delete { children } => {
            let mark = Mark::from_mdast_type(node.type_name()).unwrap_or(Mark::Bold);
            let marks = with_mark(marks, mark);
            for child in children {
                convert_inline(parent, child, &marks, out)?;
            }
        }
        MdNode::Link {
            url,
            title,
            data,
            children,
        } => {
            let mut nodes = Vec::new();
            for child in children {
                convert_inline("link", child, marks, &mut nodes)?;
            }
            out.push(Node::Inline(Inline {
                kind: InlineKind::Link(LinkData {
                    url: url.clone(),
                    title: title.clone(),
                    extra: data.clone(),
                }),
                nodes: canonicalize(nodes),
            }));
        }
        MdNode::Image {
            url,
            title,
            alt,
            data,
        } => {
            let mut marks = marks.to_vec();
            marks.sort();
            out.push(Node::Inline(Inline::image(ImageData {
                url: url.clone(),
                title: title.clone(),
                alt: alt.clone(),
                marks,
                extra: data.clone(),
            })));
        }
        other => {
            return Err(ConversionError::UnexpectedNode {
                parent: parent.to_string(),
                found: other.type_name().to_string(),
            })
        }
    }
    Ok(())
}

/// Whether the next leaf starts a line of its block. Text inside a mark
/// wrapper or a link never does: the wrapper's delimiter comes first.
fn at_line_start(parent: &str, marks: &[Mark], out: &[Node]) -> bool {
    if parent == "link" || !marks.is_empty() {
        return false;
    }
    match out.last() {
        None => true,
        Some(Node::Text(text)) => text.text.ends_with('\n'),
        Some(Node::Inline(Inline {
            kind: InlineKind::Break,
            ..
        })) => true,
        Some(_) => false,
    }
}

/// Merges adjacent leaves with the same marks and drops empty ones.
fn canonicalize(nodes: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Text(text) if text.text.is_empty() => {}
            Node::Text(text) => match out.last_mut() {
                Some(Node::Text(previous)) if previous.same_marks(&text) => {
                    previous.text.push_str(&text.text);
                }
                _ => out.push(Node::Text(text)),
            },
            other => out.push(other),
        }
    }
    out
}

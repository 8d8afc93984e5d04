//! Converts the rich editor tree into the Markdown document AST.
//!
//! # The High-Level Concept
//!
//! The rich tree stores styling as a flat set of marks on every text leaf,
//! while the document AST nests styling: a `strong` node wraps its content,
//! which may contain an `emphasis` node, and so on. Converting naively would
//! wrap every leaf separately and produce `**a****_b_**` for text that was
//! written `**a_b_**`. Instead, runs of adjacent leaves that share a mark are
//! consolidated under one wrapper, and the remaining marks are resolved
//! recursively inside it.
//!
//! # The Algorithm
//!
//! 1. **Block children:**
//!    - When a block's first child is a block, each child converts on its own
//!    - Otherwise the children form an inline run (text leaves and inlines)
//!
//! 2. **Grouping an inline run:**
//!    - Start with the marks of the first member (`code` ordered last)
//!    - Extend the group while the running intersection with the next
//!      member's marks stays non-empty
//!    - A hard line break joins the group when the member after it does
//!    - Never let the group shrink to `code` alone while the first member
//!      still carries other marks; stop instead
//!
//! 3. **Emitting a group:**
//!    - `code` only: the single member becomes an `inlineCode` node
//!    - no mark: an inline converts directly, a plain leaf becomes raw text
//!    - otherwise: the first mark is stripped from every member, the members
//!      convert recursively inside the mark's wrapper, and whitespace at the
//!      outer edges is hoisted outside the wrapper as raw text
//!
//! 4. **Repeat** with the members left over until the run is consumed.
//!
//! Plain text is emitted as raw `html` nodes so Markdown typed by the user
//! survives the stringifier verbatim. Literal text was escaped when it entered
//! the tree (see [`super::mdast_to_rich`]), so escapes survive the same way.

use crate::error::ConversionError;
use crate::maps::Mark;
use crate::mdast::MdNode;
use crate::rich::{Block, BlockKind, Document, Inline, InlineKind, Node, Text};

/// Options for [`serialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SerializeOptions {
    /// Read code block values from `data.code` instead of their text
    /// children.
    pub void_code_block: bool,
}

/// Converts a rich document into a document AST `root`.
pub fn serialize(document: &Document, options: &SerializeOptions) -> Result<MdNode, ConversionError> {
    let children = convert_block_list("document", &document.nodes, options)?;
    Ok(MdNode::root(children))
}

fn convert_block_list(
    parent: &str,
    nodes: &[Node],
    options: &SerializeOptions,
) -> Result<Vec<MdNode>, ConversionError> {
    nodes
        .iter()
        .map(|node| match node {
            Node::Block(block) => convert_block(block, options),
            other => Err(ConversionError::UnexpectedNode {
                parent: parent.to_string(),
                found: other.name().to_string(),
            }),
        })
        .collect()
}

fn convert_children(block: &Block, options: &SerializeOptions) -> Result<Vec<MdNode>, ConversionError> {
    let parent = block.node_type().as_str();
    match block.nodes.first() {
        Some(Node::Block(_)) => convert_block_list(parent, &block.nodes, options),
        _ => convert_inline_run(parent, &block.nodes),
    }
}

fn convert_block(block: &Block, options: &SerializeOptions) -> Result<MdNode, ConversionError> {
    let node = match &block.kind {
        BlockKind::Paragraph => MdNode::Paragraph {
            children: convert_children(block, options)?,
        },
        BlockKind::Heading(level) => MdNode::Heading {
            depth: level.depth(),
            children: convert_children(block, options)?,
        },
        BlockKind::Quote => MdNode::Blockquote {
            children: convert_children(block, options)?,
        },
        BlockKind::CodeBlock(data) => {
            let value = if options.void_code_block {
                data.code.clone().unwrap_or_default()
            } else {
                block.nodes.iter().map(Node::text).collect()
            };
            MdNode::Code {
                lang: data.lang.clone(),
                value,
                data: data.extra.clone(),
            }
        }
        BlockKind::BulletedList => MdNode::List {
            ordered: false,
            start: 1,
            children: convert_children(block, options)?,
        },
        BlockKind::NumberedList { start } => MdNode::List {
            ordered: true,
            start: *start,
            children: convert_children(block, options)?,
        },
        BlockKind::ListItem => MdNode::ListItem {
            children: convert_children(block, options)?,
        },
        BlockKind::Table => MdNode::Table {
            children: convert_children(block, options)?,
        },
        BlockKind::TableRow => MdNode::TableRow {
            children: convert_children(block, options)?,
        },
        BlockKind::TableCell => MdNode::TableCell {
            children: convert_children(block, options)?,
        },
        BlockKind::Break => MdNode::Break,
        BlockKind::ThematicBreak => MdNode::ThematicBreak,
        BlockKind::Shortcode(data) => MdNode::Shortcode { data: data.clone() },
    };
    Ok(node)
}

/// Stable dedup with `code` moved last.
fn ordered_marks(marks: &[Mark]) -> Vec<Mark> {
    let mut ordered: Vec<Mark> = Vec::with_capacity(marks.len());
    for mark in marks {
        if *mark != Mark::Code && !ordered.contains(mark) {
            ordered.push(*mark);
        }
    }
    if marks.contains(&Mark::Code) {
        ordered.push(Mark::Code);
    }
    ordered
}

/// Marks a member of an inline run contributes to grouping.
///
/// Links take the marks shared by all their children; images keep theirs in
/// data. `code` never wraps an inline.
fn member_marks(node: &Node) -> Vec<Mark> {
    match node {
        Node::Text(text) => ordered_marks(&text.marks),
        Node::Inline(inline) => match &inline.kind {
            InlineKind::Link(_) => {
                let mut children = inline.nodes.iter().map(member_marks);
                let first = children.next().unwrap_or_default();
                children
                    .fold(first, |shared, marks| {
                        shared.into_iter().filter(|m| marks.contains(m)).collect()
                    })
                    .into_iter()
                    .filter(|m| *m != Mark::Code)
                    .collect()
            }
            InlineKind::Image(image) => ordered_marks(&image.marks)
                .into_iter()
                .filter(|m| *m != Mark::Code)
                .collect(),
            InlineKind::Break => Vec::new(),
        },
        Node::Block(_) => Vec::new(),
    }
}

fn strip_mark(node: &Node, mark: Mark) -> Node {
    match node {
        Node::Text(text) => {
            let mut text = text.clone();
            text.remove_mark(mark);
            Node::Text(text)
        }
        Node::Inline(inline) => {
            let mut inline = inline.clone();
            match &mut inline.kind {
                InlineKind::Link(_) => {
                    inline.nodes = inline.nodes.iter().map(|n| strip_mark(n, mark)).collect();
                }
                InlineKind::Image(image) => image.marks.retain(|m| *m != mark),
                InlineKind::Break => {}
            }
            Node::Inline(inline)
        }
        Node::Block(block) => Node::Block(block.clone()),
    }
}

/// Splits the run into its first group: the shared marks and the member
/// count.
fn first_group(nodes: &[Node]) -> (Vec<Mark>, usize) {
    let mut group = member_marks(&nodes[0]);
    let first_has_other = group.iter().any(|m| *m != Mark::Code);
    let narrow = |group: &[Mark], next: &Node| -> Option<Vec<Mark>> {
        let next_marks = member_marks(next);
        let shared: Vec<Mark> = group
            .iter()
            .copied()
            .filter(|m| next_marks.contains(m))
            .collect();
        let keeps_group = !shared.is_empty() && !(first_has_other && shared == [Mark::Code]);
        keeps_group.then_some(shared)
    };

    let mut split = 1;
    if !group.is_empty() && group != [Mark::Code] {
        while let Some(next) = nodes.get(split) {
            let (member, width) = if is_line_break(next) {
                match nodes.get(split + 1) {
                    Some(after) => (after, 2),
                    None => break,
                }
            } else {
                (next, 1)
            };
            match narrow(&group, member) {
                Some(shared) => {
                    group = shared;
                    split += width;
                }
                None => break,
            }
        }
    }
    (group, split)
}

fn is_line_break(node: &Node) -> bool {
    matches!(
        node,
        Node::Inline(Inline {
            kind: InlineKind::Break,
            ..
        })
    )
}

fn convert_inline_run(parent: &str, nodes: &[Node]) -> Result<Vec<MdNode>, ConversionError> {
    let mut converted = Vec::new();
    let mut remaining = nodes;

    while let Some(next) = remaining.first() {
        match next {
            Node::Block(_) => {
                return Err(ConversionError::UnexpectedNode {
                    parent: parent.to_string(),
                    found: next.name().to_string(),
                })
            }
            Node::Text(text) if text.marks.is_empty() => {
                if !text.text.is_empty() {
                    converted.push(MdNode::html(text.text.clone()));
                }
                remaining = &remaining[1..];
                continue;
            }
            _ => {}
        }

        let (marks, split) = first_group(remaining);
        let (members, rest) = remaining.split_at(split);
        remaining = rest;

        match marks.first() {
            Some(Mark::Code) => {
                if let Node::Text(text) = &members[0] {
                    converted.push(MdNode::inline_code(text.text.clone()));
                }
            }
            None => match &members[0] {
                Node::Inline(_) => converted.push(convert_inline(&members[0])?),
                Node::Text(text) => {
                    if !text.text.is_empty() {
                        converted.push(MdNode::html(text.text.clone()));
                    }
                }
                Node::Block(_) => {}
            },
            Some(mark) => {
                let stripped: Vec<Node> = members.iter().map(|n| strip_mark(n, *mark)).collect();
                let (leading, center, trailing) = hoist_whitespace(stripped);
                if let Some(leading) = leading {
                    converted.push(MdNode::html(leading));
                }
                let children = convert_inline_run(parent, &center)?;
                if !children.is_empty() {
                    converted.push(wrap(*mark, children));
                }
                if let Some(trailing) = trailing {
                    converted.push(MdNode::html(trailing));
                }
            }
        }
    }

    Ok(converted)
}

fn wrap(mark: Mark, children: Vec<MdNode>) -> MdNode {
    match mark {
        Mark::Bold => MdNode::Strong { children },
        Mark::Italic => MdNode::Emphasis { children },
        Mark::Strikethrough => MdNode::Delete { children },
        Mark::Code => MdNode::inline_code(children.iter().map(MdNode::to_plain_text).collect::<String>()),
    }
}

/// Moves whitespace at the outer edges of a group out of its text leaves.
///
/// Leading whitespace moves only when non-whitespace follows it; the
/// trailing whitespace run always moves.
fn hoist_whitespace(mut nodes: Vec<Node>) -> (Option<String>, Vec<Node>, Option<String>) {
    let mut leading = None;
    let mut trailing = None;

    if let Some(Node::Text(first)) = nodes.first_mut() {
        let trimmed = first.text.trim_start_matches(char::is_whitespace);
        if !trimmed.is_empty() && trimmed.len() < first.text.len() {
            let cut = first.text.len() - trimmed.len();
            leading = Some(first.text[..cut].to_string());
            first.text = first.text[cut..].to_string();
        }
    }
    if let Some(Node::Text(last)) = nodes.last_mut() {
        let trimmed = last.text.trim_end_matches(char::is_whitespace);
        if trimmed.len() < last.text.len() {
            trailing = Some(last.text[trimmed.len()..].to_string());
            last.text.truncate(trimmed.len());
        }
    }
    nodes.retain(|node| !matches!(node, Node::Text(Text { text, .. }) if text.is_empty()));

    (leading, nodes, trailing)
}

fn convert_inline(node: &Node) -> Result<MdNode, ConversionError> {
    let Node::Inline(inline) = node else {
        return Err(ConversionError::UnexpectedNode {
            parent: "inline run".to_string(),
            found: node.name().to_string(),
        });
    };
    let converted = match &inline.kind {
        InlineKind::Link(link) => MdNode::Link {
            url: link.url.clone(),
            title: link.title.clone(),
            data: link.extra.clone(),
            children: convert_inline_run("link", &inline.nodes)?,
        },
        InlineKind::Image(image) => MdNode::Image {
            url: image.url.clone(),
            title: image.title.clone(),
            alt: image.alt.clone(),
            data: image.extra.clone(),
        },
        InlineKind::Break => MdNode::Break,
    };
    Ok(converted)
}

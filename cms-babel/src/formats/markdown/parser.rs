//! Markdown parsing (Markdown → document AST)
//!
//! Pipeline: Markdown string → Comrak AST → document AST. The rich tree is
//! built from the result by [`crate::common::deserialize`].

use super::default_comrak_options;
use crate::mdast::MdNode;
use crate::plugins::ComponentRegistry;
use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{parse_document, Arena};
use serde_json::{Map, Value};
use tracing::debug;

/// Parse a Markdown string into a document AST root.
///
/// Top-level paragraphs whose source matches a registered editor component
/// become `shortcode` nodes.
pub fn parse_to_mdast(source: &str, components: &ComponentRegistry) -> MdNode {
    let arena = Arena::new();
    let options = default_comrak_options();
    let root = parse_document(&arena, source, &options);

    let context = Context {
        lines: source.lines().collect(),
        components,
    };
    let children = root
        .children()
        .filter_map(|child| context.convert_block(child, true))
        .collect();
    MdNode::root(children)
}

struct Context<'s> {
    lines: Vec<&'s str>,
    components: &'s ComponentRegistry,
}

impl Context<'_> {
    /// Source text of a node, taken from its line span.
    fn source_of<'a>(&self, node: &'a AstNode<'a>) -> String {
        let sourcepos = node.data.borrow().sourcepos;
        let start = sourcepos.start.line.saturating_sub(1);
        let end = sourcepos.end.line.min(self.lines.len());
        if start >= end {
            return String::new();
        }
        self.lines[start..end].join("\n")
    }

    fn shortcode<'a>(&self, node: &'a AstNode<'a>) -> Option<MdNode> {
        if self.components.is_empty() {
            return None;
        }
        let data = self.components.match_block(&self.source_of(node))?;
        Some(MdNode::Shortcode { data })
    }

    fn convert_blocks<'a>(&self, node: &'a AstNode<'a>) -> Vec<MdNode> {
        node.children()
            .filter_map(|child| self.convert_block(child, false))
            .collect()
    }

    fn convert_block<'a>(&self, node: &'a AstNode<'a>, top_level: bool) -> Option<MdNode> {
        let value = node.data.borrow().value.clone();
        let converted = match value {
            NodeValue::Paragraph => {
                if top_level {
                    if let Some(shortcode) = self.shortcode(node) {
                        return Some(shortcode);
                    }
                }
                MdNode::paragraph(convert_inlines(node))
            }
            NodeValue::Heading(heading) => MdNode::Heading {
                depth: heading.level,
                children: convert_inlines(node),
            },
            NodeValue::BlockQuote => MdNode::Blockquote {
                children: self.convert_blocks(node),
            },
            NodeValue::List(list) => MdNode::List {
                ordered: list.list_type == ListType::Ordered,
                start: if list.list_type == ListType::Ordered {
                    list.start as u64
                } else {
                    1
                },
                children: self.convert_blocks(node),
            },
            NodeValue::Item(_) => MdNode::ListItem {
                children: self.convert_blocks(node),
            },
            NodeValue::CodeBlock(code_block) => {
                let (lang, meta) = split_info(&code_block.info);
                let mut data = Map::new();
                if let Some(meta) = meta {
                    data.insert("meta".to_string(), Value::String(meta));
                }
                let literal = &code_block.literal;
                MdNode::Code {
                    lang,
                    value: literal.strip_suffix('\n').unwrap_or(literal).to_string(),
                    data,
                }
            }
            NodeValue::HtmlBlock(html) => {
                if top_level {
                    if let Some(shortcode) = self.shortcode(node) {
                        return Some(shortcode);
                    }
                }
                let literal = html.literal.trim_end_matches('\n');
                MdNode::paragraph(vec![MdNode::html(literal)])
            }
            NodeValue::ThematicBreak => MdNode::ThematicBreak,
            NodeValue::Table(_) => MdNode::Table {
                children: self.convert_blocks(node),
            },
            NodeValue::TableRow(_) => MdNode::TableRow {
                children: self.convert_blocks(node),
            },
            NodeValue::TableCell => MdNode::TableCell {
                children: convert_inlines(node),
            },
            NodeValue::FrontMatter(_) => {
                debug!("skipping front matter");
                return None;
            }
            other => {
                debug!(node = ?other, "skipping unsupported markdown block");
                return None;
            }
        };
        Some(converted)
    }
}

/// Splits a fence info string into the language and the remaining meta.
fn split_info(info: &str) -> (Option<String>, Option<String>) {
    let info = info.trim();
    if info.is_empty() {
        return (None, None);
    }
    match info.split_once(char::is_whitespace) {
        Some((lang, meta)) => (Some(lang.to_string()), Some(meta.trim().to_string())),
        None => (Some(info.to_string()), None),
    }
}

fn collect_text_content<'a>(node: &'a AstNode<'a>, output: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(text) => output.push_str(text),
        NodeValue::Code(code) => output.push_str(&code.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => output.push(' '),
        _ => {
            for child in node.children() {
                collect_text_content(child, output);
            }
        }
    }
}

fn convert_inlines<'a>(node: &'a AstNode<'a>) -> Vec<MdNode> {
    node.children().filter_map(convert_inline).collect()
}

fn convert_inline<'a>(node: &'a AstNode<'a>) -> Option<MdNode> {
    let value = node.data.borrow().value.clone();
    let converted = match value {
        NodeValue::Text(text) => MdNode::text(text),
        NodeValue::SoftBreak => MdNode::text("\n"),
        NodeValue::LineBreak => MdNode::Break,
        NodeValue::Code(code) => MdNode::inline_code(code.literal),
        NodeValue::HtmlInline(html) => MdNode::html(html),
        NodeValue::Emph => MdNode::Emphasis {
            children: convert_inlines(node),
        },
        NodeValue::Strong => MdNode::Strong {
            children: convert_inlines(node),
        },
        NodeValue::Strikethrough => MdNode::Delete {
            children: convert_inlines(node),
        },
        NodeValue::Link(link) => MdNode::Link {
            url: link.url,
            title: non_empty(link.title),
            data: Map::new(),
            children: convert_inlines(node),
        },
        NodeValue::Image(link) => {
            let mut alt = String::new();
            for child in node.children() {
                collect_text_content(child, &mut alt);
            }
            MdNode::Image {
                url: link.url,
                title: non_empty(link.title),
                alt: non_empty(alt),
                data: Map::new(),
            }
        }
        other => {
            let mut text = String::new();
            collect_text_content(node, &mut text);
            debug!(node = ?other, "flattening unsupported markdown inline to text");
            if text.is_empty() {
                return None;
            }
            MdNode::text(text)
        }
    };
    Some(converted)
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

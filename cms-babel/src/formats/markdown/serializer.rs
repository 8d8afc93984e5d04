//! Markdown serialization (document AST → Markdown export)
//!
//! Pipeline: document AST → Comrak AST → Markdown string. `html` nodes are
//! emitted as raw inline HTML so comrak does not escape them; shortcodes are
//! rendered by a caller-supplied function and emitted as raw HTML blocks.

use super::default_comrak_options;
use crate::error::FormatError;
use crate::mdast::MdNode;
use crate::rich::ShortcodeData;
use comrak::nodes::{
    Ast, AstNode, ListDelimType, ListType, NodeCode, NodeCodeBlock, NodeHeading, NodeHtmlBlock,
    NodeLink, NodeList, NodeTable, NodeValue, TableAlignment,
};
use comrak::{format_commonmark, Arena, ListStyleType};
use std::cell::RefCell;

/// Rendering choices for the Comrak AST.
pub struct BuildOptions<'r> {
    pub bullet_char: u8,
    pub render_shortcode: &'r dyn Fn(&ShortcodeData) -> String,
}

/// Serialize a document AST root to CommonMark.
pub fn serialize_mdast(root: &MdNode, options: &BuildOptions<'_>) -> Result<String, FormatError> {
    let arena = Arena::new();
    let document = build_comrak_ast(&arena, root, options)?;

    let mut comrak_options = default_comrak_options();
    comrak_options.render.list_style = match options.bullet_char {
        b'*' => ListStyleType::Star,
        b'+' => ListStyleType::Plus,
        _ => ListStyleType::Dash,
    };

    let mut output = Vec::new();
    format_commonmark(document, &comrak_options, &mut output).map_err(|e| {
        FormatError::SerializationError(format!("Comrak serialization failed: {e}"))
    })?;

    let markdown = String::from_utf8(output)
        .map_err(|e| FormatError::SerializationError(format!("UTF-8 conversion failed: {e}")))?;

    Ok(strip_end_list_markers(&markdown))
}

/// Drops the `<!-- end list -->` lines comrak writes between adjacent lists.
/// The blank line after each marker stays, so a following list or code block
/// still starts a new block. Same-kind lists joined this way are merged by
/// normalization anyway.
fn strip_end_list_markers(markdown: &str) -> String {
    markdown
        .split_inclusive('\n')
        .filter(|line| {
            line.trim_start_matches(|c: char| c == '>' || c.is_whitespace())
                .trim_end()
                != "<!-- end list -->"
        })
        .collect()
}

fn alloc<'a>(arena: &'a Arena<AstNode<'a>>, value: NodeValue) -> &'a AstNode<'a> {
    arena.alloc(AstNode::new(RefCell::new(Ast::new(value, (0, 0).into()))))
}

/// Build a Comrak AST from a document AST root.
pub(crate) fn build_comrak_ast<'a>(
    arena: &'a Arena<AstNode<'a>>,
    root: &MdNode,
    options: &BuildOptions<'_>,
) -> Result<&'a AstNode<'a>, FormatError> {
    let MdNode::Root { children } = root else {
        return Err(FormatError::SerializationError(format!(
            "Expected a root node, found '{}'",
            root.type_name()
        )));
    };
    let document = alloc(arena, NodeValue::Document);
    for child in children {
        append_block(arena, document, child, options)?;
    }
    Ok(document)
}

fn list_value(ordered: bool, start: u64, bullet_char: u8) -> NodeList {
    NodeList {
        list_type: if ordered {
            ListType::Ordered
        } else {
            ListType::Bullet
        },
        marker_offset: 0,
        padding: 0,
        start: start as usize,
        delimiter: ListDelimType::Period,
        bullet_char,
        tight: true,
    }
}

fn html_block(literal: String) -> NodeValue {
    NodeValue::HtmlBlock(NodeHtmlBlock {
        block_type: 6,
        literal: format!("{}\n", literal.trim_end_matches('\n')),
    })
}

/// Appends children that are either all blocks or all phrasing content.
/// Phrasing content is wrapped in a paragraph.
fn append_flow<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    children: &[MdNode],
    options: &BuildOptions<'_>,
) -> Result<(), FormatError> {
    match children.first() {
        Some(first) if first.is_phrasing() => {
            let paragraph = alloc(arena, NodeValue::Paragraph);
            parent.append(paragraph);
            append_inlines(arena, paragraph, children)
        }
        _ => {
            for child in children {
                append_block(arena, parent, child, options)?;
            }
            Ok(())
        }
    }
}

fn append_block<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    node: &MdNode,
    options: &BuildOptions<'_>,
) -> Result<(), FormatError> {
    match node {
        MdNode::Paragraph { children } => {
            let paragraph = alloc(arena, NodeValue::Paragraph);
            parent.append(paragraph);
            append_inlines(arena, paragraph, children)?;
        }
        MdNode::Heading { depth, children } => {
            let heading = alloc(
                arena,
                NodeValue::Heading(NodeHeading {
                    level: (*depth).clamp(1, 6),
                    setext: false,
                }),
            );
            parent.append(heading);
            append_inlines(arena, heading, children)?;
        }
        MdNode::Blockquote { children } => {
            let quote = alloc(arena, NodeValue::BlockQuote);
            parent.append(quote);
            append_flow(arena, quote, children, options)?;
        }
        MdNode::Code { lang, value, data } => {
            let mut info = lang.clone().unwrap_or_default();
            if let Some(meta) = data.get("meta").and_then(|meta| meta.as_str()) {
                if !info.is_empty() && !meta.is_empty() {
                    info.push(' ');
                    info.push_str(meta);
                }
            }
            let literal = if value.is_empty() {
                String::new()
            } else {
                format!("{value}\n")
            };
            parent.append(alloc(
                arena,
                NodeValue::CodeBlock(NodeCodeBlock {
                    fenced: true,
                    fence_char: b'`',
                    fence_length: 3,
                    fence_offset: 0,
                    info,
                    literal,
                }),
            ));
        }
        MdNode::List {
            ordered,
            start,
            children,
        } => {
            let list = alloc(
                arena,
                NodeValue::List(list_value(*ordered, *start, options.bullet_char)),
            );
            parent.append(list);
            for child in children {
                append_block(arena, list, child, options)?;
            }
        }
        MdNode::ListItem { children } => {
            let item = alloc(arena, NodeValue::Item(list_value(false, 1, options.bullet_char)));
            parent.append(item);
            append_flow(arena, item, children, options)?;
        }
        MdNode::Table { children } => append_table(arena, parent, children)?,
        MdNode::ThematicBreak => parent.append(alloc(arena, NodeValue::ThematicBreak)),
        MdNode::Break => parent.append(alloc(arena, html_block("<br>".to_string()))),
        MdNode::Shortcode { data } => {
            parent.append(alloc(arena, html_block((options.render_shortcode)(data))));
        }
        MdNode::Html { value } => parent.append(alloc(arena, html_block(value.clone()))),
        other if other.is_phrasing() => {
            let paragraph = alloc(arena, NodeValue::Paragraph);
            parent.append(paragraph);
            append_inline(arena, paragraph, other)?;
        }
        other => {
            return Err(FormatError::SerializationError(format!(
                "Unexpected '{}' node in block position",
                other.type_name()
            )))
        }
    }
    Ok(())
}

fn append_table<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    rows: &[MdNode],
) -> Result<(), FormatError> {
    let num_columns = rows.first().map(|row| row.children().len()).unwrap_or(0);
    let table = alloc(
        arena,
        NodeValue::Table(NodeTable {
            alignments: vec![TableAlignment::None; num_columns],
            num_columns,
            num_rows: rows.len(),
            num_nonempty_cells: 0,
        }),
    );
    parent.append(table);

    for (index, row) in rows.iter().enumerate() {
        let row_node = alloc(arena, NodeValue::TableRow(index == 0));
        table.append(row_node);
        for cell in row.children().iter().take(num_columns) {
            let cell_node = alloc(arena, NodeValue::TableCell);
            row_node.append(cell_node);
            // Cells hold inline content only; block children are flattened.
            for child in cell.children() {
                match child {
                    MdNode::Paragraph { children } | MdNode::Heading { children, .. } => {
                        append_inlines(arena, cell_node, children)?
                    }
                    other if other.is_phrasing() => append_inline(arena, cell_node, other)?,
                    other => {
                        append_inline(arena, cell_node, &MdNode::text(other.to_plain_text()))?
                    }
                }
            }
        }
        // Short rows are padded so every row has the header's width.
        for _ in row.children().len()..num_columns {
            row_node.append(alloc(arena, NodeValue::TableCell));
        }
    }
    Ok(())
}

fn append_inlines<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    children: &[MdNode],
) -> Result<(), FormatError> {
    for child in children {
        append_inline(arena, parent, child)?;
    }
    Ok(())
}

fn append_inline<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    node: &MdNode,
) -> Result<(), FormatError> {
    let (value, children) = match node {
        MdNode::Text { value } => (NodeValue::Text(value.clone()), None),
        MdNode::Html { value } => (NodeValue::HtmlInline(value.clone()), None),
        MdNode::InlineCode { value, .. } => (
            NodeValue::Code(NodeCode {
                num_backticks: 1,
                literal: value.clone(),
            }),
            None,
        ),
        MdNode::Break => (NodeValue::LineBreak, None),
        MdNode::Emphasis { children } => (NodeValue::Emph, Some(children)),
        MdNode::Strong { children } => (NodeValue::Strong, Some(children)),
        MdNode::Delete { children } => (NodeValue::Strikethrough, Some(children)),
        MdNode::Link {
            url,
            title,
            children,
            ..
        } => (
            NodeValue::Link(NodeLink {
                url: url.clone(),
                title: title.clone().unwrap_or_default(),
            }),
            Some(children),
        ),
        MdNode::Image {
            url, title, alt, ..
        } => {
            let image = alloc(
                arena,
                NodeValue::Image(NodeLink {
                    url: url.clone(),
                    title: title.clone().unwrap_or_default(),
                }),
            );
            parent.append(image);
            if let Some(alt) = alt.as_ref().filter(|alt| !alt.is_empty()) {
                image.append(alloc(arena, NodeValue::Text(alt.clone())));
            }
            return Ok(());
        }
        other => {
            return Err(FormatError::SerializationError(format!(
                "Unexpected '{}' node in inline position",
                other.type_name()
            )))
        }
    };

    let inline = alloc(arena, value);
    parent.append(inline);
    if let Some(children) = children {
        append_inlines(arena, inline, children)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::markdown::parse_to_mdast;
    use crate::plugins::ComponentRegistry;
    use serde_json::Map;

    fn render(root: &MdNode) -> String {
        let options = BuildOptions {
            bullet_char: b'-',
            render_shortcode: &|data: &ShortcodeData| format!("[{}]", data.shortcode),
        };
        serialize_mdast(root, &options).unwrap()
    }

    #[test]
    fn test_simple_paragraph() {
        let root = MdNode::root(vec![MdNode::paragraph(vec![MdNode::text("Hello")])]);
        assert_eq!(render(&root), "Hello\n");
    }

    #[test]
    fn test_html_is_not_escaped() {
        let root = MdNode::root(vec![MdNode::paragraph(vec![
            MdNode::html("*kept*"),
            MdNode::text(" *escaped*"),
        ])]);
        let markdown = render(&root);
        assert!(markdown.starts_with("*kept* "), "{markdown}");
        assert!(markdown.contains("\\*escaped\\*"), "{markdown}");
    }

    #[test]
    fn test_heading_and_marks() {
        let root = MdNode::root(vec![
            MdNode::Heading {
                depth: 2,
                children: vec![MdNode::text("Title")],
            },
            MdNode::paragraph(vec![
                MdNode::Strong {
                    children: vec![MdNode::text("bold")],
                },
                MdNode::html(" and "),
                MdNode::inline_code("x"),
            ]),
        ]);
        assert_eq!(render(&root), "## Title\n\n**bold** and `x`\n");
    }

    #[test]
    fn test_code_block_with_meta() {
        let mut data = Map::new();
        data.insert("meta".to_string(), "title=x".into());
        let root = MdNode::root(vec![MdNode::Code {
            lang: Some("python".to_string()),
            value: "x=1".to_string(),
            data,
        }]);
        let markdown = render(&root);
        assert!(markdown.starts_with("``` python title=x\n"), "{markdown}");

        let reparsed = parse_to_mdast(&markdown, &ComponentRegistry::new());
        let MdNode::Code { lang, value, data } = &reparsed.children()[0] else {
            panic!("expected a code block in {markdown}");
        };
        assert_eq!(lang.as_deref(), Some("python"));
        assert_eq!(value, "x=1");
        assert_eq!(data.get("meta"), Some(&"title=x".into()));
    }

    #[test]
    fn test_lists() {
        let item = |text: &str| MdNode::ListItem {
            children: vec![MdNode::paragraph(vec![MdNode::html(text)])],
        };
        let bulleted = MdNode::root(vec![MdNode::List {
            ordered: false,
            start: 1,
            children: vec![item("a"), item("b")],
        }]);
        assert_eq!(render(&bulleted), "- a\n- b\n");

        let numbered = MdNode::root(vec![MdNode::List {
            ordered: true,
            start: 3,
            children: vec![item("a"), item("b")],
        }]);
        let markdown = render(&numbered);
        assert!(markdown.starts_with("3."), "{markdown}");
        assert!(markdown.contains("4."), "{markdown}");
    }

    #[test]
    fn test_adjacent_lists_stay_apart_without_markers() {
        let list = |ordered: bool| MdNode::List {
            ordered,
            start: 1,
            children: vec![MdNode::ListItem {
                children: vec![MdNode::paragraph(vec![MdNode::html("x")])],
            }],
        };
        let markdown = render(&MdNode::root(vec![list(false), list(true)]));
        assert!(!markdown.contains("end list"), "{markdown}");
        assert!(markdown.contains("- x\n\n"), "{markdown}");
    }

    #[test]
    fn test_shortcodes_use_the_renderer() {
        let root = MdNode::root(vec![MdNode::Shortcode {
            data: ShortcodeData {
                shortcode: "youtube".to_string(),
                shortcode_data: Map::new(),
            },
        }]);
        assert_eq!(render(&root), "[youtube]\n");
    }

    #[test]
    fn test_rejects_non_root() {
        let options = BuildOptions {
            bullet_char: b'-',
            render_shortcode: &|_: &ShortcodeData| String::new(),
        };
        assert!(serialize_mdast(&MdNode::text("x"), &options).is_err());
    }
}

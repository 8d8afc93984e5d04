//! Import tests for Markdown format (Markdown → rich tree)
//!
//! These tests verify that Markdown documents are correctly converted by
//! checking the resulting rich tree structure.

use cms_babel::format::Format;
use cms_babel::formats::markdown::MarkdownFormat;
use cms_babel::maps::{HeadingLevel, Mark, NodeType};
use cms_babel::rich::{Block, BlockKind, Document, InlineKind, Node, Text};

fn md_to_rich(md: &str) -> Document {
    MarkdownFormat::default()
        .parse(md)
        .expect("Should parse markdown")
}

fn block_types(nodes: &[Node]) -> Vec<&'static str> {
    nodes
        .iter()
        .filter_map(Node::node_type)
        .map(NodeType::as_str)
        .collect()
}

#[test]
fn test_heading_and_marked_paragraph() {
    let doc = md_to_rich("## Title\n\nHello **world**\n");
    assert_eq!(
        doc.nodes,
        vec![
            Block::heading(HeadingLevel::Two, vec![Text::plain("Title").into()]).into(),
            Block::paragraph(vec![
                Text::plain("Hello ").into(),
                Text::marked("world", &[Mark::Bold]).into(),
            ])
            .into(),
        ]
    );
}

#[test]
fn test_nested_marks_flatten_in_canonical_order() {
    let doc = md_to_rich("***both*** `code`\n");
    let Node::Block(paragraph) = &doc.nodes[0] else {
        panic!("expected a paragraph");
    };
    assert_eq!(
        paragraph.nodes,
        vec![
            Text::marked("both", &[Mark::Bold, Mark::Italic]).into(),
            Text::plain(" ").into(),
            Text::marked("code", &[Mark::Code]).into(),
        ]
    );
}

#[test]
fn test_lists_keep_kind_and_start() {
    let doc = md_to_rich("- a\n- b\n\n---\n\n3. x\n4. y\n");
    assert_eq!(
        block_types(&doc.nodes),
        vec!["bulleted-list", "thematic-break", "numbered-list"]
    );
    let Node::Block(Block {
        kind: BlockKind::NumberedList { start },
        nodes,
    }) = &doc.nodes[2]
    else {
        panic!("expected a numbered list");
    };
    assert_eq!(*start, 3);
    assert_eq!(block_types(nodes), vec!["list-item", "list-item"]);
}

#[test]
fn test_code_block_keeps_value_as_text() {
    let doc = md_to_rich("```python\nx=1\n```\n");
    let Node::Block(Block {
        kind: BlockKind::CodeBlock(data),
        nodes,
    }) = &doc.nodes[0]
    else {
        panic!("expected a code block");
    };
    assert_eq!(data.lang.as_deref(), Some("python"));
    assert_eq!(nodes, &vec![Node::from(Text::plain("x=1"))]);
}

#[test]
fn test_links_and_images_become_inlines() {
    let doc = md_to_rich("[site](https://example.org \"Home\") ![logo](logo.png)\n");
    let Node::Block(paragraph) = &doc.nodes[0] else {
        panic!("expected a paragraph");
    };
    let inlines: Vec<_> = paragraph
        .nodes
        .iter()
        .filter_map(|node| match node {
            Node::Inline(inline) => Some(&inline.kind),
            _ => None,
        })
        .collect();
    match inlines.as_slice() {
        [InlineKind::Link(link), InlineKind::Image(image)] => {
            assert_eq!(link.url, "https://example.org");
            assert_eq!(link.title.as_deref(), Some("Home"));
            assert_eq!(image.url, "logo.png");
            assert_eq!(image.alt.as_deref(), Some("logo"));
        }
        other => panic!("expected a link and an image, got {other:?}"),
    }
}

#[test]
fn test_blockquote_and_table() {
    let doc = md_to_rich("> quoted\n\n| a | b |\n|---|---|\n| 1 | 2 |\n");
    assert_eq!(block_types(&doc.nodes), vec!["quote", "table"]);
    assert_eq!(doc.nodes[1].text(), "ab12");
    let rows = doc.nodes[1].children();
    assert_eq!(block_types(rows), vec!["table-row", "table-row"]);
    assert_eq!(block_types(rows[0].children()), vec!["table-cell", "table-cell"]);
}

#[test]
fn test_empty_document_gets_default_paragraph() {
    let doc = md_to_rich("");
    assert_eq!(doc.nodes, vec![Node::from(Block::empty_paragraph())]);
}

#[test]
fn test_adjacent_lists_of_one_kind_merge() {
    // Comrak splits lists whose bullet changes; the schema joins them again.
    let doc = md_to_rich("- a\n- b\n+ c\n");
    assert_eq!(block_types(&doc.nodes), vec!["bulleted-list"]);
    assert_eq!(doc.nodes[0].children().len(), 3);
}

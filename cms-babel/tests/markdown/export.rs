//! Export tests for Markdown format (rich tree → Markdown)

use cms_babel::format::Format;
use cms_babel::formats::markdown::MarkdownFormat;
use cms_babel::maps::{HeadingLevel, Mark};
use cms_babel::rich::{Block, BlockKind, CodeBlockData, Document, Inline, Node, Text};
use insta::assert_snapshot;
use std::collections::HashMap;

fn rich_to_md(nodes: Vec<Node>) -> String {
    MarkdownFormat::default()
        .serialize(&Document::new(nodes))
        .expect("Should serialize to markdown")
}

fn item(text: &str) -> Node {
    Block::new(
        BlockKind::ListItem,
        vec![Block::paragraph(vec![Text::plain(text).into()]).into()],
    )
    .into()
}

#[test]
fn test_heading_and_paragraph() {
    let md = rich_to_md(vec![
        Block::heading(HeadingLevel::Two, vec![Text::plain("Title").into()]).into(),
        Block::paragraph(vec![
            Text::plain("Hello ").into(),
            Text::marked("world", &[Mark::Bold]).into(),
        ])
        .into(),
    ]);
    assert_snapshot!(md, @r"
    ## Title

    Hello **world**
    ");
}

#[test]
fn test_whitespace_is_hoisted_out_of_marks() {
    let md = rich_to_md(vec![Block::paragraph(vec![
        Text::plain("a").into(),
        Text::marked(" bold text ", &[Mark::Bold]).into(),
        Text::plain("b").into(),
    ])
    .into()]);
    assert_eq!(md, "a **bold text** b\n");
}

#[test]
fn test_plain_text_is_not_escaped() {
    let md = rich_to_md(vec![Block::paragraph(vec![Text::plain("*typed* markdown").into()]).into()]);
    assert_eq!(md, "*typed* markdown\n");
}

#[test]
fn test_bulleted_list() {
    let md = rich_to_md(vec![Block::new(BlockKind::BulletedList, vec![item("a"), item("b")]).into()]);
    assert_snapshot!(md, @r"
    - a
    - b
    ");
}

#[test]
fn test_bullet_char_is_configurable() {
    let doc = Document::new(vec![Block::new(BlockKind::BulletedList, vec![item("a")]).into()]);
    let md = MarkdownFormat::default()
        .with_bullet_char('*')
        .unwrap()
        .serialize(&doc)
        .unwrap();
    assert_eq!(md, "* a\n");
}

#[test]
fn test_links_with_marks() {
    let md = rich_to_md(vec![Block::paragraph(vec![
        Text::plain("see ").into(),
        Inline::link("https://example.org", vec![Text::marked("docs", &[Mark::Italic]).into()]).into(),
    ])
    .into()]);
    assert_eq!(md, "see *[docs](https://example.org)*\n");
}

#[test]
fn test_void_code_block_option() {
    let doc = Document::new(vec![Block::leaf(BlockKind::CodeBlock(CodeBlockData {
        lang: Some("python".to_string()),
        code: Some("x=1".to_string()),
        ..CodeBlockData::default()
    }))
    .into()]);
    let mut options = HashMap::new();
    options.insert("void-code-block".to_string(), "true".to_string());
    let md = MarkdownFormat::default()
        .serialize_with_options(&doc, &options)
        .unwrap();
    assert!(md.starts_with("``` python\nx=1\n```"), "{md}");
}

#[test]
fn test_thematic_break_between_paragraphs() {
    let md = rich_to_md(vec![
        Block::paragraph(vec![Text::plain("above").into()]).into(),
        Block::leaf(BlockKind::ThematicBreak).into(),
        Block::paragraph(vec![Text::plain("below").into()]).into(),
    ]);
    let lines: Vec<&str> = md.lines().filter(|line| !line.is_empty()).collect();
    assert_eq!(lines.len(), 3, "{md}");
    assert_eq!(lines[0], "above");
    assert_eq!(lines[2], "below");
}

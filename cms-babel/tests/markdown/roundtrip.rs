//! Round-trip stability
//!
//! Markdown → rich tree → Markdown must settle after one pass: exporting the
//! re-imported export gives the same text. Normal-form rich trees survive the
//! document AST unchanged in both code block modes.

use cms_babel::common::{deserialize, serialize, DeserializeOptions, SerializeOptions};
use cms_babel::format::Format;
use cms_babel::formats::markdown::MarkdownFormat;
use cms_babel::maps::{HeadingLevel, Mark};
use cms_babel::rich::{
    Block, BlockKind, CodeBlockData, Document, ImageData, Inline, Node, Text,
};
use cms_babel::schema::default_schema;
use proptest::prelude::*;

fn export(md: &str) -> String {
    let format = MarkdownFormat::default();
    let doc = format.parse(md).expect("Should parse markdown");
    assert!(default_schema().validate(&doc).is_empty(), "invalid import of:\n{md}");
    format.serialize(&doc).expect("Should serialize markdown")
}

/// Exports `md`, checks the export is a fixed point and returns it.
fn assert_stable(md: &str) -> String {
    let first = export(md);
    let second = export(&first);
    assert_eq!(first, second, "unstable round trip through:\n{first}");
    first
}

#[test]
fn test_paragraph_marks() {
    let md = assert_stable("Some **bold** and *italic* and ~~struck~~ text with `code`.\n");
    assert!(md.contains("**bold**"), "{md}");
    assert!(md.contains("~struck~"), "{md}");
    assert!(md.contains("`code`."), "{md}");
}

#[test]
fn test_nested_marks() {
    let md = assert_stable("**bold *both* bold** after\n");
    assert!(md.ends_with(" after\n"), "{md}");
}

#[test]
fn test_headings() {
    assert_eq!(
        assert_stable("# One\n\n## Two\n\n###### Six\n"),
        "# One\n\n## Two\n\n###### Six\n"
    );
}

#[test]
fn test_soft_and_hard_breaks() {
    assert_eq!(
        assert_stable("line one\nline two\n\nhard  \nbreak\n"),
        "line one\nline two\n\nhard\\\nbreak\n"
    );
}

#[test]
fn test_hard_break_is_an_inline_in_the_tree() {
    let format = MarkdownFormat::default();
    for md in ["hard  \nbreak\n", "hard\\\nbreak\n"] {
        let doc = format.parse(md).unwrap();
        assert_eq!(
            doc.nodes[0].children(),
            &[
                Node::from(Text::plain("hard")),
                Inline::line_break().into(),
                Text::plain("break").into(),
            ]
        );
    }
}

#[test]
fn test_hard_break_inside_emphasis() {
    let md = assert_stable("*one  \ntwo*\n");
    assert_eq!(md, "*one\\\ntwo*\n");
}

#[test]
fn test_escaped_markup_stays_literal() {
    assert_eq!(
        assert_stable("1 \\*not emphasis\\* here\n"),
        "1 \\*not emphasis\\* here\n"
    );
    assert_eq!(assert_stable("\\# not a heading\n"), "\\# not a heading\n");
    assert_eq!(assert_stable("3\\. not a list\n"), "3\\. not a list\n");
    assert_eq!(assert_stable("\\[not\\](a link)\n"), "\\[not\\](a link)\n");
}

#[test]
fn test_literal_markup_characters_are_escaped_on_export() {
    assert_eq!(assert_stable("snake_case and a\\_b\n"), "snake\\_case and a\\_b\n");
}

#[test]
fn test_lists() {
    let md = assert_stable("- one\n- two\n  - nested\n\n3. three\n4. four\n");
    let marker = |text: &str| {
        md.lines()
            .find(|line| line.ends_with(text))
            .map(|line| line.split_whitespace().next().unwrap_or_default().to_string())
    };
    assert_eq!(marker("nested").as_deref(), Some("-"), "{md}");
    assert_eq!(marker("three").as_deref(), Some("3."), "{md}");
    assert_eq!(marker("four").as_deref(), Some("4."), "{md}");
}

#[test]
fn test_quote_code_and_rule() {
    let md = assert_stable("> quoted **text**\n\n```rust\nfn main() {}\n```\n\n---\n\nafter\n");
    assert!(md.starts_with("> quoted **text**\n"), "{md}");
    assert!(md.contains("``` rust\nfn main() {}\n```\n"), "{md}");
    assert!(md.ends_with("after\n"), "{md}");
}

#[test]
fn test_links_and_images() {
    let md = assert_stable("A [link](https://example.org \"Title\") and ![alt](img.png).\n");
    assert!(md.contains("[link](https://example.org \"Title\")"), "{md}");
    assert!(md.contains("![alt](img.png)"), "{md}");
}

#[test]
fn test_table() {
    let md = assert_stable("| a | b |\n|---|---|\n| 1 | **2** |\n");
    assert!(md.contains("**2**"), "{md}");
}

// Normal-form trees through the document AST.

/// Merges adjacent leaves with equal marks, as import does.
fn merged(nodes: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        if let (Some(Node::Text(previous)), Node::Text(text)) = (out.last_mut(), &node) {
            if previous.marks == text.marks {
                previous.text.push_str(&text.text);
                continue;
            }
        }
        out.push(node);
    }
    out
}

fn leaf() -> impl Strategy<Value = Node> {
    let marks = proptest::sample::subsequence(
        vec![Mark::Bold, Mark::Italic, Mark::Strikethrough, Mark::Code],
        0..=2,
    );
    marks.prop_flat_map(|marks| {
        // Marked text never carries edge whitespace; export hoists it out.
        let text = if marks.is_empty() { "[a-z ]{1,6}" } else { "[a-z]{1,4}" };
        text.prop_map(move |text| Node::from(Text::marked(text, &marks)))
    })
}

fn image() -> impl Strategy<Value = Node> {
    let marks = proptest::sample::subsequence(vec![Mark::Bold, Mark::Italic, Mark::Strikethrough], 0..=2);
    (marks, proptest::option::of("[a-z]{1,4}")).prop_map(|(marks, alt)| {
        Node::from(Inline::image(ImageData {
            url: "pic.png".to_string(),
            alt,
            marks,
            ..ImageData::default()
        }))
    })
}

fn phrasing() -> impl Strategy<Value = Vec<Node>> {
    let member = prop_oneof![
        4 => leaf(),
        1 => proptest::collection::vec(leaf(), 1..3)
            .prop_map(|nodes| Node::from(Inline::link("https://example.org", merged(nodes)))),
        1 => image(),
        1 => Just(Node::from(Inline::line_break())),
    ];
    proptest::collection::vec(member, 1..6).prop_map(merged)
}

fn code_block(void: bool) -> impl Strategy<Value = Node> {
    (proptest::option::of("[a-z]{1,6}"), "[a-z =\n]{0,12}").prop_map(move |(lang, value)| {
        let mut data = CodeBlockData {
            lang,
            ..CodeBlockData::default()
        };
        if void {
            data.code = Some(value);
            Node::from(Block::leaf(BlockKind::CodeBlock(data)))
        } else {
            Node::from(Block::new(BlockKind::CodeBlock(data), vec![Text::plain(value).into()]))
        }
    })
}

fn list(kind: BlockKind, items: Vec<Vec<Node>>) -> Node {
    let items = items
        .into_iter()
        .map(|nodes| Block::new(BlockKind::ListItem, vec![Block::paragraph(nodes).into()]).into())
        .collect();
    Block::new(kind, items).into()
}

fn block(void: bool) -> impl Strategy<Value = Node> {
    let items = || proptest::collection::vec(phrasing(), 1..3);
    prop_oneof![
        phrasing().prop_map(|nodes| Node::from(Block::paragraph(nodes))),
        (proptest::sample::select(HeadingLevel::ALL.to_vec()), phrasing())
            .prop_map(|(level, nodes)| Node::from(Block::heading(level, nodes))),
        phrasing().prop_map(|nodes| {
            Node::from(Block::new(BlockKind::Quote, vec![Block::paragraph(nodes).into()]))
        }),
        items().prop_map(|items| list(BlockKind::BulletedList, items)),
        (1u64..5, items()).prop_map(|(start, items)| list(BlockKind::NumberedList { start }, items)),
        code_block(void),
        Just(Node::from(Block::leaf(BlockKind::ThematicBreak))),
    ]
}

fn document(void: bool) -> impl Strategy<Value = Document> {
    proptest::collection::vec(block(void), 1..5).prop_map(Document::new)
}

fn through_mdast(doc: &Document, void_code_block: bool) -> Document {
    let root = serialize(doc, &SerializeOptions { void_code_block }).expect("Should serialize");
    deserialize(&root, &DeserializeOptions { void_code_block }).expect("Should deserialize")
}

proptest! {
    #[test]
    fn normal_form_trees_survive_the_document_ast(doc in document(false)) {
        prop_assert_eq!(through_mdast(&doc, false), doc);
    }

    #[test]
    fn void_code_block_trees_survive_the_document_ast(doc in document(true)) {
        prop_assert_eq!(through_mdast(&doc, true), doc);
    }

}

//! Editor components in Markdown: top-level paragraphs matching a component
//! pattern import as shortcode blocks and export through the component.

use cms_babel::format::Format;
use cms_babel::formats::markdown::MarkdownFormat;
use cms_babel::plugins::{ComponentRegistry, TemplateComponent};
use cms_babel::rich::{Block, BlockKind, Node};
use serde_json::Value;

fn format() -> MarkdownFormat {
    let mut components = ComponentRegistry::new();
    components.register(
        TemplateComponent::new(
            "youtube",
            r"^\{\{<\s*youtube\s+(?P<id>\S+)\s*>\}\}$",
            "{{< youtube {{id}} >}}",
        )
        .unwrap(),
    );
    MarkdownFormat::new(components)
}

#[test]
fn test_import_matches_whole_paragraphs() {
    let doc = format()
        .parse("Intro\n\n{{< youtube abc >}}\n\nOutro\n")
        .unwrap();
    let Node::Block(Block {
        kind: BlockKind::Shortcode(data),
        nodes,
    }) = &doc.nodes[1]
    else {
        panic!("expected a shortcode, got {:?}", doc.nodes[1]);
    };
    assert_eq!(data.shortcode, "youtube");
    assert_eq!(data.shortcode_data.get("id"), Some(&Value::from("abc")));
    assert!(nodes.is_empty());
}

#[test]
fn test_inline_mentions_stay_text() {
    let doc = format().parse("Watch {{< youtube abc >}} now\n").unwrap();
    assert!(matches!(
        &doc.nodes[0],
        Node::Block(Block {
            kind: BlockKind::Paragraph,
            ..
        })
    ));
}

#[test]
fn test_export_renders_component_markdown() {
    let format = format();
    let doc = format.parse("{{< youtube abc >}}\n").unwrap();
    assert_eq!(format.serialize(&doc).unwrap(), "{{< youtube abc >}}\n");
}

#[test]
fn test_without_components_shortcodes_are_paragraphs() {
    let doc = MarkdownFormat::default()
        .parse("{{< youtube abc >}}\n")
        .unwrap();
    assert_eq!(doc.nodes[0].text(), "{{< youtube abc >}}");
}

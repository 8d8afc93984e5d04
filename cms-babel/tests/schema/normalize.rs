//! Normalization properties

use cms_babel::maps::NodeType;
use cms_babel::rich::{Block, BlockKind, Document, Node, Text};
use cms_babel::schema::default_schema;
use proptest::prelude::*;

fn list(kind: BlockKind, items: Vec<String>) -> Node {
    Block::new(
        kind,
        items
            .into_iter()
            .map(|text| {
                Block::new(
                    BlockKind::ListItem,
                    vec![Block::paragraph(vec![Text::plain(text).into()]).into()],
                )
                .into()
            })
            .collect(),
    )
    .into()
}

fn block() -> impl Strategy<Value = Node> {
    let items = || proptest::collection::vec("[a-z]{1,5}", 0..3);
    prop_oneof![
        "[a-z ]{0,8}".prop_map(|text| Block::paragraph(vec![Text::plain(text).into()]).into()),
        items().prop_map(|items| list(BlockKind::BulletedList, items)),
        (1u64..5, items()).prop_map(|(start, items)| list(BlockKind::NumberedList { start }, items)),
        Just(Block::leaf(BlockKind::ThematicBreak).into()),
    ]
}

fn document() -> impl Strategy<Value = Document> {
    proptest::collection::vec(block(), 0..6).prop_map(Document::new)
}

proptest! {
    #[test]
    fn normalize_is_idempotent(doc in document()) {
        let schema = default_schema();
        let once = schema.normalize(doc);
        let twice = schema.normalize(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalized_documents_validate(doc in document()) {
        let schema = default_schema();
        let normalized = schema.normalize(doc);
        prop_assert!(schema.validate(&normalized).is_empty());
        prop_assert!(!normalized.nodes.is_empty());
    }

    #[test]
    fn lists_are_never_empty_or_adjacent_to_their_own_kind(doc in document()) {
        let normalized = default_schema().normalize(doc);
        let types: Vec<Option<NodeType>> = normalized.nodes.iter().map(Node::node_type).collect();
        for node in &normalized.nodes {
            if node.node_type().is_some_and(NodeType::is_list) {
                prop_assert!(!node.children().is_empty());
            }
        }
        for pair in types.windows(2) {
            if pair[0].is_some_and(NodeType::is_list) {
                prop_assert_ne!(pair[0], pair[1]);
            }
        }
    }

    #[test]
    fn normalization_keeps_list_item_text(doc in document()) {
        let before: String = doc.nodes.iter()
            .filter(|n| n.node_type().is_some_and(NodeType::is_list))
            .map(Node::text)
            .collect();
        let normalized = default_schema().normalize(doc);
        let after: String = normalized.nodes.iter()
            .filter(|n| n.node_type().is_some_and(NodeType::is_list))
            .map(Node::text)
            .collect();
        prop_assert_eq!(before, after);
    }
}

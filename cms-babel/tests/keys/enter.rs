//! Enter beside void blocks

use cms_babel::keys::{KeyEvent, KeyHandler, KeyOutcome, Platform};
use cms_babel::rich::{Block, BlockKind, Document, EditorState, Node, Point, Selection, Text};
use cms_babel::schema::default_schema;

fn rule() -> Node {
    Block::leaf(BlockKind::ThematicBreak).into()
}

fn paragraph(text: &str) -> Node {
    Block::paragraph(vec![Text::plain(text).into()]).into()
}

fn press_enter(document: Document, path: Vec<usize>) -> KeyOutcome {
    let state = EditorState::new(document, Selection::collapsed(Point::new(path, 0)));
    KeyHandler::new(default_schema(), Platform::Other).handle(&KeyEvent::key("Enter"), &state)
}

#[test]
fn test_enter_on_first_void_inserts_above() {
    let outcome = press_enter(Document::new(vec![rule(), paragraph("x")]), vec![0]);
    let KeyOutcome::Handled(state) = outcome else {
        panic!("Enter on a thematic break should be handled");
    };
    assert_eq!(
        state.document.nodes,
        vec![Block::empty_paragraph().into(), rule(), paragraph("x")]
    );
    assert_eq!(state.selection, Selection::collapsed(Point::new(vec![0, 0], 0)));
}

#[test]
fn test_enter_on_later_void_inserts_below() {
    let outcome = press_enter(Document::new(vec![paragraph("a"), rule()]), vec![1]);
    let KeyOutcome::Handled(state) = outcome else {
        panic!("Enter on a thematic break should be handled");
    };
    assert_eq!(
        state.document.nodes,
        vec![paragraph("a"), rule(), Block::empty_paragraph().into()]
    );
    assert_eq!(state.selection, Selection::collapsed(Point::new(vec![2, 0], 0)));
}

fn bulleted(item_children: Vec<Node>) -> Document {
    Document::new(vec![Block::new(
        BlockKind::BulletedList,
        vec![Block::new(BlockKind::ListItem, item_children).into()],
    )
    .into()])
}

#[test]
fn test_enter_on_void_first_in_list_item_inserts_above() {
    let outcome = press_enter(bulleted(vec![rule(), paragraph("x")]), vec![0, 0, 0]);
    let KeyOutcome::Handled(state) = outcome else {
        panic!("Enter on a nested thematic break should be handled");
    };
    assert_eq!(
        state.document,
        bulleted(vec![Block::empty_paragraph().into(), rule(), paragraph("x")])
    );
    assert_eq!(
        state.selection,
        Selection::collapsed(Point::new(vec![0, 0, 0, 0], 0))
    );
}

#[test]
fn test_enter_on_later_void_in_list_item_inserts_below() {
    let outcome = press_enter(bulleted(vec![paragraph("x"), rule()]), vec![0, 0, 1]);
    let KeyOutcome::Handled(state) = outcome else {
        panic!("Enter on a nested thematic break should be handled");
    };
    assert_eq!(
        state.document,
        bulleted(vec![paragraph("x"), rule(), Block::empty_paragraph().into()])
    );
    assert_eq!(
        state.selection,
        Selection::collapsed(Point::new(vec![0, 0, 2, 0], 0))
    );
}

#[test]
fn test_enter_inside_a_paragraph_is_ignored() {
    let outcome = press_enter(Document::new(vec![paragraph("hello")]), vec![0, 0]);
    assert_eq!(outcome, KeyOutcome::Ignored);
}

#[test]
fn test_shift_enter_is_ignored() {
    let state = EditorState::new(
        Document::new(vec![rule(), paragraph("x")]),
        Selection::collapsed(Point::new(vec![0], 0)),
    );
    let outcome = KeyHandler::new(default_schema(), Platform::Other)
        .handle(&KeyEvent::key("Enter").shift(), &state);
    assert_eq!(outcome, KeyOutcome::Ignored);
}

#[test]
fn test_selection_spanning_blocks_is_ignored() {
    let state = EditorState::new(
        Document::new(vec![rule(), paragraph("x")]),
        Selection::new(Point::new(vec![0], 0), Point::new(vec![1, 0], 1)),
    );
    let outcome =
        KeyHandler::new(default_schema(), Platform::Other).handle(&KeyEvent::key("Enter"), &state);
    assert_eq!(outcome, KeyOutcome::Ignored);
}

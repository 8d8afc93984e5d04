//! Mark hotkeys

use cms_babel::keys::{KeyEvent, KeyHandler, KeyOutcome, Platform};
use cms_babel::maps::Mark;
use cms_babel::rich::{Block, Document, EditorState, Node, Point, Selection, Text};
use cms_babel::schema::default_schema;

fn hello_world(from: usize, to: usize) -> EditorState {
    EditorState::new(
        Document::new(vec![Block::paragraph(vec![Text::plain("hello world").into()]).into()]),
        Selection::new(Point::new(vec![0, 0], from), Point::new(vec![0, 0], to)),
    )
}

fn handled(outcome: KeyOutcome) -> EditorState {
    match outcome {
        KeyOutcome::Handled(state) => state,
        KeyOutcome::Ignored => panic!("expected the key to be handled"),
    }
}

fn leaves(state: &EditorState) -> Vec<Node> {
    state.document.nodes[0].children().to_vec()
}

#[test]
fn test_ctrl_b_bolds_the_selection() {
    let handler = KeyHandler::new(default_schema(), Platform::Other);
    let state = handled(handler.handle(&KeyEvent::key("b").ctrl(), &hello_world(0, 5)));
    assert_eq!(
        leaves(&state),
        vec![
            Text::marked("hello", &[Mark::Bold]).into(),
            Text::plain(" world").into(),
        ]
    );
    assert_eq!(
        state.selection,
        Selection::new(Point::new(vec![0, 0], 0), Point::new(vec![0, 0], 5))
    );
}

#[test]
fn test_ctrl_s_strikes_the_selection() {
    let handler = KeyHandler::new(default_schema(), Platform::Other);
    let state = handled(handler.handle(&KeyEvent::key("s").ctrl(), &hello_world(0, 5)));
    assert_eq!(
        leaves(&state),
        vec![
            Text::marked("hello", &[Mark::Strikethrough]).into(),
            Text::plain(" world").into(),
        ]
    );
}

#[test]
fn test_ctrl_backtick_marks_code() {
    let handler = KeyHandler::new(default_schema(), Platform::Other);
    let state = handled(handler.handle(&KeyEvent::key("`").ctrl(), &hello_world(6, 11)));
    assert_eq!(
        leaves(&state),
        vec![
            Text::plain("hello ").into(),
            Text::marked("world", &[Mark::Code]).into(),
        ]
    );
}

#[test]
fn test_mark_hotkeys_stack_in_canonical_order() {
    let handler = KeyHandler::new(default_schema(), Platform::Mac);
    let coded = handled(handler.handle(&KeyEvent::key("`").meta(), &hello_world(0, 5)));
    let struck = handled(handler.handle(&KeyEvent::key("s").meta(), &coded));
    assert_eq!(
        leaves(&struck)[0],
        Node::from(Text::marked("hello", &[Mark::Strikethrough, Mark::Code]))
    );
}

#[test]
fn test_toggling_twice_removes_the_mark() {
    let handler = KeyHandler::new(default_schema(), Platform::Other);
    let bold = handled(handler.handle(&KeyEvent::key("b").ctrl(), &hello_world(0, 5)));
    let plain = handled(handler.handle(&KeyEvent::key("b").ctrl(), &bold));
    assert!(leaves(&plain)
        .iter()
        .all(|leaf| matches!(leaf, Node::Text(text) if text.marks.is_empty())));
    assert_eq!(plain.document.text(), "hello world");
}

#[test]
fn test_selection_follows_the_split_leaf() {
    let handler = KeyHandler::new(default_schema(), Platform::Other);
    let state = handled(handler.handle(&KeyEvent::key("i").ctrl(), &hello_world(6, 11)));
    assert_eq!(
        leaves(&state),
        vec![
            Text::plain("hello ").into(),
            Text::marked("world", &[Mark::Italic]).into(),
        ]
    );
    assert_eq!(
        state.selection,
        Selection::new(Point::new(vec![0, 1], 0), Point::new(vec![0, 1], 5))
    );
}

#[test]
fn test_collapsed_selection_sets_pending_marks() {
    let handler = KeyHandler::new(default_schema(), Platform::Other);
    let before = hello_world(2, 2);
    let state = handled(handler.handle(&KeyEvent::key("b").ctrl(), &before));
    assert_eq!(state.pending_marks, Some(vec![Mark::Bold]));
    assert_eq!(state.document, before.document);
}

#[test]
fn test_mod_means_command_on_mac() {
    let handler = KeyHandler::new(default_schema(), Platform::Mac);
    assert!(matches!(
        handler.handle(&KeyEvent::key("b").meta(), &hello_world(0, 5)),
        KeyOutcome::Handled(_)
    ));
    assert_eq!(
        handler.handle(&KeyEvent::key("b").ctrl(), &hello_world(0, 5)),
        KeyOutcome::Ignored
    );
}

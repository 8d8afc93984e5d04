//! Keyboard command interpreter
//!
//! Maps key events to edits of an [`EditorState`]:
//!
//! - `Enter` while a single void block is selected inserts an empty paragraph
//!   next to it (above when it is the first child, below otherwise) and moves
//!   the caret into it.
//! - Mark hotkeys (`mod+b`, `mod+i`, `mod+s`, ``mod+` ``) toggle a mark over
//!   the selection, or over the pending marks when the selection is
//!   collapsed.
//!
//! Every other event is ignored. Handled events commit the new state through
//! the schema, so callers always receive a normalized snapshot.

pub mod hotkey;

pub use hotkey::{Hotkey, HotkeyError, KeyEvent, Platform};

use crate::maps::Mark;
use crate::rich::{Block, Document, EditorState, Node, Path, Point, Selection, Text};
use crate::schema::Schema;
use tracing::debug;

/// Result of handling a key event.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    /// The event was consumed; the host should prevent its default action.
    Handled(EditorState),
    Ignored,
}

pub struct KeyHandler<'a> {
    schema: &'a Schema,
    platform: Platform,
    enter: Hotkey,
    mark_hotkeys: Vec<(Hotkey, Mark)>,
}

impl<'a> KeyHandler<'a> {
    pub fn new(schema: &'a Schema, platform: Platform) -> Self {
        KeyHandler {
            schema,
            platform,
            enter: Hotkey::new("Enter"),
            mark_hotkeys: vec![
                (Hotkey::new("b").with_mod(), Mark::Bold),
                (Hotkey::new("i").with_mod(), Mark::Italic),
                (Hotkey::new("s").with_mod(), Mark::Strikethrough),
                (Hotkey::new("`").with_mod(), Mark::Code),
            ],
        }
    }

    /// Binds an extra hotkey to a mark toggle. Earlier bindings win.
    pub fn bind_mark(mut self, hotkey: Hotkey, mark: Mark) -> Self {
        self.mark_hotkeys.push((hotkey, mark));
        self
    }

    pub fn handle(&self, event: &KeyEvent, state: &EditorState) -> KeyOutcome {
        if self.enter.matches(event, self.platform) {
            return match self.insert_beside_void(state) {
                Some(next) => KeyOutcome::Handled(next.commit(self.schema)),
                None => KeyOutcome::Ignored,
            };
        }

        let mark = self
            .mark_hotkeys
            .iter()
            .find(|(hotkey, _)| hotkey.matches(event, self.platform))
            .map(|(_, mark)| *mark);
        match mark {
            Some(mark) => {
                debug!(%mark, "toggling mark");
                KeyOutcome::Handled(toggle_mark(state, mark).commit(self.schema))
            }
            None => KeyOutcome::Ignored,
        }
    }

    fn insert_beside_void(&self, state: &EditorState) -> Option<EditorState> {
        let document = &state.document;
        let anchor_block = document.closest_block_path(&state.selection.anchor.path)?;
        let focus_block = document.closest_block_path(&state.selection.focus.path)?;
        if anchor_block != focus_block || !self.schema.is_void(document.node(&focus_block)?) {
            return None;
        }

        let (index, parent) = focus_block.split_last()?;
        let new_index = if *index == 0 { 0 } else { index + 1 };
        let document = document
            .insert_node(parent, new_index, Block::empty_paragraph().into())
            .ok()?;

        let mut caret = parent.to_vec();
        caret.extend([new_index, 0]);
        debug!(path = ?focus_block, new_index, "inserted paragraph beside void block");
        Some(EditorState {
            document,
            selection: Selection::collapsed(Point::new(caret, 0)),
            pending_marks: None,
        })
    }
}

fn toggle_in(marks: &mut Vec<Mark>, mark: Mark) {
    if marks.contains(&mark) {
        marks.retain(|m| *m != mark);
    } else {
        marks.push(mark);
        marks.sort();
    }
}

/// Character range of a leaf covered by the selection.
fn covered(path: &Path, len: usize, start: &Point, end: &Point) -> (usize, usize) {
    let from = if *path == start.path { start.offset.min(len) } else { 0 };
    let to = if *path == end.path { end.offset.min(len) } else { len };
    (from, to)
}

fn toggle_mark(state: &EditorState, mark: Mark) -> EditorState {
    let selection = &state.selection;
    let (start, end) = (selection.start().clone(), selection.end().clone());
    let document = &state.document;

    let paths = document.text_paths();
    let range = paths
        .iter()
        .position(|p| *p == start.path)
        .zip(paths.iter().position(|p| *p == end.path));
    let selected: Vec<(Path, Text, usize, usize)> = match range {
        Some((first, last)) if !selection.is_collapsed() => paths[first..=last]
            .iter()
            .filter_map(|path| match document.node(path) {
                Some(Node::Text(text)) => {
                    let (from, to) = covered(path, text.text.chars().count(), &start, &end);
                    (from < to).then(|| (path.clone(), text.clone(), from, to))
                }
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    if selected.is_empty() {
        let mut pending = state.pending_marks.clone().unwrap_or_else(|| {
            match document.node(&selection.focus.path) {
                Some(Node::Text(text)) => text.marks.clone(),
                _ => Vec::new(),
            }
        });
        toggle_in(&mut pending, mark);
        return EditorState {
            pending_marks: Some(pending),
            ..state.clone()
        };
    }

    let remove = selected.iter().all(|(_, text, _, _)| text.has_mark(mark));
    let edit = |marks: &mut Vec<Mark>| {
        if remove {
            marks.retain(|m| *m != mark);
        } else if !marks.contains(&mark) {
            marks.push(mark);
            marks.sort();
        }
    };

    // Reverse order keeps the paths of earlier leaves valid while later ones
    // are split.
    let mut next = document.clone();
    for (path, text, from, to) in selected.iter().rev() {
        next = replace_with_pieces(next, path, split_pieces(text, *from, *to, &edit));
    }

    // Only the first leaf can gain a piece in front of its selected part, and
    // that piece shifts the last leaf when both share a parent.
    let (first_path, _, first_from, _) = &selected[0];
    let (last_path, _, last_from, last_to) = &selected[selected.len() - 1];
    let mut start_path = first_path.clone();
    bump(&mut start_path, usize::from(*first_from > 0));
    let mut end_path = last_path.clone();
    let shifted = selected.len() > 1 && *first_from > 0 && same_parent(first_path, last_path);
    bump(&mut end_path, usize::from(*last_from > 0) + usize::from(shifted));
    let start_point = Point::new(start_path, 0);
    let end_point = Point::new(end_path, last_to - last_from);

    let selection = if selection.anchor <= selection.focus {
        Selection::new(start_point, end_point)
    } else {
        Selection::new(end_point, start_point)
    };
    EditorState {
        document: next,
        selection,
        pending_marks: None,
    }
}

fn bump(path: &mut Path, by: usize) {
    if let Some(last) = path.last_mut() {
        *last += by;
    }
}

fn same_parent(a: &[usize], b: &[usize]) -> bool {
    a.len() == b.len() && a[..a.len().saturating_sub(1)] == b[..b.len().saturating_sub(1)]
}

/// Splits a leaf into up to three pieces; the covered middle gets `edit`
/// applied to its marks.
fn split_pieces(text: &Text, from: usize, to: usize, edit: impl Fn(&mut Vec<Mark>)) -> Vec<Text> {
    let chars: Vec<char> = text.text.chars().collect();
    let slice = |a: usize, b: usize| chars[a..b].iter().collect::<String>();
    let mut middle = Text {
        text: slice(from, to),
        marks: text.marks.clone(),
    };
    edit(&mut middle.marks);

    let mut pieces = Vec::with_capacity(3);
    if from > 0 {
        pieces.push(Text {
            text: slice(0, from),
            marks: text.marks.clone(),
        });
    }
    pieces.push(middle);
    if to < chars.len() {
        pieces.push(Text {
            text: slice(to, chars.len()),
            marks: text.marks.clone(),
        });
    }
    pieces
}

fn replace_with_pieces(document: Document, path: &[usize], pieces: Vec<Text>) -> Document {
    let Some((index, parent)) = path.split_last() else {
        return document;
    };
    let mut pieces = pieces.into_iter();
    let Some(first) = pieces.next() else {
        return document;
    };
    let mut next = match document.replace_node(path, first.into()) {
        Ok(next) => next,
        Err(_) => return document,
    };
    for (offset, piece) in pieces.enumerate() {
        next = match next.insert_node(parent, index + 1 + offset, piece.into()) {
            Ok(doc) => doc,
            Err(_) => return next,
        };
    }
    next
}

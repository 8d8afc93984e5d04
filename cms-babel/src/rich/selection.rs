//! Editor state: a document snapshot plus the user's selection.

use super::edit::Path;
use super::nodes::{Document, Node};
use crate::maps::Mark;
use crate::schema::Schema;

/// A caret position: a text leaf and a character offset inside it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Point {
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: Path, offset: usize) -> Self {
        Point { path, offset }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn collapsed(point: Point) -> Self {
        Selection {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn new(anchor: Point, focus: Point) -> Self {
        Selection { anchor, focus }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// The earlier of anchor and focus in document order.
    pub fn start(&self) -> &Point {
        std::cmp::min(&self.anchor, &self.focus)
    }

    pub fn end(&self) -> &Point {
        std::cmp::max(&self.anchor, &self.focus)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditorState {
    pub document: Document,
    pub selection: Selection,
    /// Marks to apply to the next inserted text, set by toggling a mark over a
    /// collapsed selection.
    pub pending_marks: Option<Vec<Mark>>,
}

impl EditorState {
    pub fn new(document: Document, selection: Selection) -> Self {
        EditorState {
            document,
            selection,
            pending_marks: None,
        }
    }

    /// Normalizes the document against `schema` and clamps the selection
    /// onto the result.
    pub fn commit(self, schema: &Schema) -> EditorState {
        let document = schema.normalize(self.document);
        let selection = Selection {
            anchor: clamp(&document, self.selection.anchor),
            focus: clamp(&document, self.selection.focus),
        };
        EditorState {
            document,
            selection,
            pending_marks: self.pending_marks,
        }
    }
}

/// Moves a point onto the nearest valid text position.
fn clamp(document: &Document, point: Point) -> Point {
    if let Some(Node::Text(text)) = document.node(&point.path) {
        let len = text.text.chars().count();
        return Point::new(point.path, point.offset.min(len));
    }
    let texts = document.text_paths();
    let nearest = texts
        .iter()
        .find(|path| **path >= point.path)
        .or_else(|| texts.last());
    match nearest {
        Some(path) => Point::new(path.clone(), 0),
        None => Point::new(vec![0], 0),
    }
}

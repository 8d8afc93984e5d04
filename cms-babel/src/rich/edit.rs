//! Copy-on-write edit operations on the rich tree.
//!
//! Nodes are addressed by paths: `[2, 0]` is the first child of the third
//! top-level node. Every operation leaves `self` untouched and returns the
//! edited document.

use super::nodes::{Document, Node, Text};
use crate::maps::Mark;
use thiserror::Error;

pub type Path = Vec<usize>;

/// Byte index of the `offset`-th character, or the end of the string.
pub(crate) fn char_to_byte(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("no node at path {0:?}")]
    InvalidPath(Path),
    #[error("index {index} is out of bounds for {len} children at {path:?}")]
    IndexOutOfBounds {
        path: Path,
        index: usize,
        len: usize,
    },
    #[error("cannot merge node at {path:?}: {reason}")]
    CannotMerge { path: Path, reason: String },
}

impl Document {
    pub fn node(&self, path: &[usize]) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.nodes.get(*first)?;
        for index in rest {
            node = node.children().get(*index)?;
        }
        Some(node)
    }

    /// Children of the node at `path`; the empty path addresses the document.
    pub fn children_at(&self, path: &[usize]) -> Option<&[Node]> {
        if path.is_empty() {
            return Some(&self.nodes);
        }
        self.node(path).map(Node::children)
    }

    fn children_at_mut(&mut self, path: &[usize]) -> Option<&mut Vec<Node>> {
        let mut children = &mut self.nodes;
        for index in path {
            children = children.get_mut(*index)?.children_mut()?;
        }
        Some(children)
    }

    pub fn insert_node(&self, parent: &[usize], index: usize, node: Node) -> Result<Document, EditError> {
        let mut doc = self.clone();
        let children = doc
            .children_at_mut(parent)
            .ok_or_else(|| EditError::InvalidPath(parent.to_vec()))?;
        if index > children.len() {
            return Err(EditError::IndexOutOfBounds {
                path: parent.to_vec(),
                index,
                len: children.len(),
            });
        }
        children.insert(index, node);
        Ok(doc)
    }

    pub fn remove_node(&self, path: &[usize]) -> Result<Document, EditError> {
        let (index, parent) = path
            .split_last()
            .ok_or_else(|| EditError::InvalidPath(Vec::new()))?;
        let mut doc = self.clone();
        let children = doc
            .children_at_mut(parent)
            .ok_or_else(|| EditError::InvalidPath(path.to_vec()))?;
        if *index >= children.len() {
            return Err(EditError::InvalidPath(path.to_vec()));
        }
        children.remove(*index);
        Ok(doc)
    }

    pub fn replace_node(&self, path: &[usize], node: Node) -> Result<Document, EditError> {
        let (index, parent) = path
            .split_last()
            .ok_or_else(|| EditError::InvalidPath(Vec::new()))?;
        let mut doc = self.clone();
        let slot = doc
            .children_at_mut(parent)
            .and_then(|children| children.get_mut(*index))
            .ok_or_else(|| EditError::InvalidPath(path.to_vec()))?;
        *slot = node;
        Ok(doc)
    }

    /// Merges the node at `path` into its previous sibling.
    ///
    /// Blocks and inlines append their children to the sibling's; text leaves
    /// concatenate and keep the sibling's marks.
    pub fn merge_node(&self, path: &[usize]) -> Result<Document, EditError> {
        let (index, parent) = path
            .split_last()
            .ok_or_else(|| EditError::InvalidPath(Vec::new()))?;
        if *index == 0 {
            return Err(EditError::CannotMerge {
                path: path.to_vec(),
                reason: "node has no previous sibling".to_string(),
            });
        }
        let mut doc = self.clone();
        let children = doc
            .children_at_mut(parent)
            .ok_or_else(|| EditError::InvalidPath(path.to_vec()))?;
        if *index >= children.len() {
            return Err(EditError::InvalidPath(path.to_vec()));
        }

        let current = children.remove(*index);
        let previous = &mut children[*index - 1];
        match (previous, current) {
            (Node::Text(prev), Node::Text(cur)) => prev.text.push_str(&cur.text),
            (Node::Block(prev), Node::Block(cur)) => prev.nodes.extend(cur.nodes),
            (Node::Inline(prev), Node::Inline(cur)) => prev.nodes.extend(cur.nodes),
            (prev, cur) => {
                return Err(EditError::CannotMerge {
                    path: path.to_vec(),
                    reason: format!("cannot merge {} into {}", cur.name(), prev.name()),
                })
            }
        }
        Ok(doc)
    }

    /// Replaces the marks of the text leaf at `path`.
    pub fn set_marks(&self, path: &[usize], marks: Vec<Mark>) -> Result<Document, EditError> {
        let Some(Node::Text(text)) = self.node(path) else {
            return Err(EditError::InvalidPath(path.to_vec()));
        };
        let leaf = Text::marked(text.text.clone(), &marks);
        self.replace_node(path, leaf.into())
    }

    /// Splits the text leaf at `path` into two leaves at a character offset.
    /// Splitting at either end is a no-op.
    pub fn split_text(&self, path: &[usize], offset: usize) -> Result<Document, EditError> {
        let Some(Node::Text(text)) = self.node(path) else {
            return Err(EditError::InvalidPath(path.to_vec()));
        };
        let len = text.text.chars().count();
        if offset > len {
            return Err(EditError::IndexOutOfBounds {
                path: path.to_vec(),
                index: offset,
                len,
            });
        }
        if offset == 0 || offset == len {
            return Ok(self.clone());
        }
        let at = char_to_byte(&text.text, offset);
        let head = Text {
            text: text.text[..at].to_string(),
            marks: text.marks.clone(),
        };
        let tail = Text {
            text: text.text[at..].to_string(),
            marks: text.marks.clone(),
        };
        let (index, parent) = path
            .split_last()
            .ok_or_else(|| EditError::InvalidPath(Vec::new()))?;
        self.replace_node(path, head.into())?
            .insert_node(parent, index + 1, tail.into())
    }

    /// Paths of every text leaf, in document order.
    pub fn text_paths(&self) -> Vec<Path> {
        fn walk(nodes: &[Node], prefix: &mut Path, out: &mut Vec<Path>) {
            for (index, node) in nodes.iter().enumerate() {
                prefix.push(index);
                match node {
                    Node::Text(_) => out.push(prefix.clone()),
                    other => walk(other.children(), prefix, out),
                }
                prefix.pop();
            }
        }
        let mut out = Vec::new();
        walk(&self.nodes, &mut Vec::new(), &mut out);
        out
    }

    /// Path of the innermost block that contains `path` (or is it).
    pub fn closest_block_path(&self, path: &[usize]) -> Option<Path> {
        (1..=path.len())
            .rev()
            .map(|len| &path[..len])
            .find(|prefix| self.node(prefix).is_some_and(Node::is_block))
            .map(<[usize]>::to_vec)
    }
}

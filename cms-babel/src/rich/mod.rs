//! The rich editor tree
//!
//! - [`nodes`]: the closed node types (`Document`, `Block`, `Inline`, `Text`)
//! - [`raw`]: the raw JSON exchange shape and its validation
//! - [`edit`]: path addressing and copy-on-write edit operations
//! - [`selection`]: editor state, selection and schema commits

pub mod edit;
pub mod nodes;
pub mod raw;
pub mod selection;

pub use edit::{EditError, Path};
pub use nodes::{
    Block, BlockKind, CodeBlockData, Document, ImageData, Inline, InlineKind, LinkData, Node,
    ShortcodeData, Text,
};
pub use raw::{RawDocument, RawNode, RawNodeError};
pub use selection::{EditorState, Point, Selection};

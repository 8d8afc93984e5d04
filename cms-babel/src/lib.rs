//! Rich-editor ⇄ Markdown interoperability for a git-backed CMS
//!
//!     This crate converts between the tree a rich-text editor keeps (blocks, inlines and text
//!     leaves with marks) and Markdown, the format content is stored in. It also keeps editor
//!     trees structurally valid and interprets the editor's keyboard commands.
//!
//!     TLDR: For format authors:
//!         - Babel never parses or renders Markdown text itself, it relies on comrak for that
//!         - Conversions go through the document AST (./mdast), using the common code in ./common
//!         - Anything parsed into a rich tree is normalized with the default schema before it is
//!           handed out
//!         - Each format has unit tests next to its code, and integration tests under tests/
//!
//! Architecture
//!
//!     The core is format agnostic: two value trees and the mappings between them.
//!
//!     - rich:    the editor tree, its JSON exchange shape, paths, edits and selection
//!     - mdast:   the Markdown-shaped document AST
//!     - maps:    the type and mark tables shared by both directions
//!     - common:  rich → mdast (mark consolidation) and mdast → rich (mark flattening)
//!     - schema:  declarative structural rules, validation and repair to a fixpoint
//!     - keys:    keyboard commands (Enter beside void blocks, mark toggles)
//!     - plugins: editor components (shortcodes) registered by the host
//!
//!     This is a pure lib, that is, it powers the cms-md cli but is shell agnostic: no code
//!     should be written that supposes a shell environment, be it std print, env vars etc.
//!     Diagnostics go through `tracing`; the binary decides where they end up.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── maps.rs                 # Type tables and marks
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── plugins.rs              # Editor components
//!     ├── rich                    # Rich tree
//!     ├── mdast                   # Document AST
//!     ├── common                  # Rich tree ⇄ document AST
//!     ├── schema                  # Rules and normalization
//!     ├── keys                    # Keyboard commands
//!     └── formats
//!         ├── <format>
//!         │   ├── parser.rs       # Parser implementation
//!         │   ├── serializer.rs   # Serializer implementation
//!         │   └── mod.rs
//!         └── icons.rs            # Shared tree icons
//!
//! Testing
//!     tests
//!     └── <area>
//!         └── <testname>.rs
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to include these
//!     in the mod.
//!
//! Core Algorithms
//!
//!     The most delicate part is mark consolidation: the rich tree stores a flat mark set per
//!     leaf, Markdown nests `strong`/`emphasis`/`delete` wrappers. Runs of leaves sharing marks
//!     are grouped under one wrapper, `code` always ends up innermost, and whitespace at the
//!     edge of a marked run is hoisted outside it (`** bold**` is not valid emphasis). See
//!     ./common/rich_to_mdast.rs. The reverse walk keeps a mark stack and canonicalizes leaves.
//!
//! Formats
//!
//!     Formats implement the Format trait (./format.rs) and are looked up through the
//!     FormatRegistry:
//!     - markdown: both ways, the storage format
//!     - json:     the rich tree as the editor exchanges it
//!     - mdast:    the document AST as JSON, both ways
//!     - html:     preview rendering
//!     - treeviz:  a tree view of the document AST for inspection
//!
pub mod common;
pub mod error;
pub mod format;
pub mod formats;
pub mod keys;
pub mod maps;
pub mod mdast;
pub mod plugins;
pub mod registry;
pub mod rich;
pub mod schema;

pub use error::{ConversionError, FormatError};
pub use format::Format;
pub use keys::{KeyEvent, KeyHandler, KeyOutcome, Platform};
pub use maps::{Mark, NodeType, ObjectKind};
pub use mdast::MdNode;
pub use plugins::{ComponentRegistry, EditorComponent, TemplateComponent};
pub use registry::FormatRegistry;
pub use rich::{Document, EditorState};
pub use schema::{default_schema, Schema};

/// Serializes a rich document into the document AST.
///
/// Shorthand for [`common::serialize`] with default options.
pub fn to_mdast(doc: &Document) -> Result<MdNode, ConversionError> {
    common::serialize(doc, &common::SerializeOptions::default())
}

/// Builds a normalized rich document from a document AST root.
pub fn from_mdast(root: &MdNode) -> Result<Document, ConversionError> {
    let doc = common::deserialize(root, &common::DeserializeOptions::default())?;
    Ok(default_schema().normalize(doc))
}

//! Markdown-oriented document AST
//!
//! The intermediate tree between the rich editor tree and Markdown text. The
//! conversions live in [`crate::common`]; the comrak bridge lives in
//! [`crate::formats::markdown`].

pub mod nodes;

pub use nodes::MdNode;

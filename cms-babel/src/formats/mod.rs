//! Format implementations
//!
//! This module contains all format implementations that convert between
//! the rich editor tree and text representations.

pub mod html;
pub mod icons;
pub mod json;
pub mod markdown;
pub mod mdast;
pub mod treeviz;

pub use html::HtmlFormat;
pub use json::JsonFormat;
pub use markdown::MarkdownFormat;
pub use mdast::MdastFormat;
pub use treeviz::TreevizFormat;

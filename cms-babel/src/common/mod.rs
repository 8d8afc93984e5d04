//! Contains logic for mapping between the rich tree and the document AST.

mod escape;
pub mod mdast_to_rich;
pub mod rich_to_mdast;

pub use mdast_to_rich::{deserialize, DeserializeOptions};
pub use rich_to_mdast::{serialize, SerializeOptions};

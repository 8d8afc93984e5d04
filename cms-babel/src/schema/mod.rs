//! Structural schema for the rich tree
//!
//! Rules are declared as data ([`rules`]), compiled once into a dispatch
//! table keyed by `(object, type)` ([`engine`]), and used to validate trees
//! and repair them to a fixpoint.

pub mod engine;
pub mod rules;

pub use engine::{Schema, SchemaError, Violation};
pub use rules::{default_rules, ChildRule, ErrorCode, NormalizeAction, Rule, Selector};

use once_cell::sync::Lazy;

static DEFAULT_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::compile(default_rules())
        .unwrap_or_else(|err| panic!("default schema rules are invalid: {err}"))
});

/// The Markdown editor's schema, compiled on first use.
///
/// # Panics
///
/// Panics when the built-in rules fail [`Schema::compile`]. That is an
/// authoring bug in [`default_rules`], never a property of the input.
pub fn default_schema() -> &'static Schema {
    &DEFAULT_SCHEMA
}

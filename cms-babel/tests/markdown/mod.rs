//! Markdown format tests
//!
//! Tests for bidirectional Markdown ↔ rich tree conversion.

mod export;
mod import;
mod roundtrip;
mod shortcodes;

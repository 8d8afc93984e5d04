//! Library half of the cms-md command line tool.
//!
//! Holds the inspect transforms so they can be tested without spawning the
//! binary.

pub mod transforms;

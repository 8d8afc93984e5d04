//! Keyboard command tests
//!
//! Each test builds an editor state, feeds one key event through the
//! handler and checks the committed state.

mod enter;
mod marks;

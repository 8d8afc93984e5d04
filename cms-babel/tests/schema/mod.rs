//! Schema tests
//!
//! Property tests for normalization over generated documents.

mod normalize;

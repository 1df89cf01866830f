//! Block planning: byte ranges, descriptors, and resume filtering.
//!
//! Splits a file into fixed-size blocks for parallel fetch, skipping indices
//! that already exist on disk (resume) or are recorded as finished in the
//! shared store (distributed resume).

mod block;
mod plan;

pub use block::{BlockDescriptor, ByteRange};
pub use plan::plan_blocks;

//! Range planning for a file of known total size.

use std::collections::HashSet;

use super::block::{BlockDescriptor, ByteRange};

/// Number of blocks a file of `total_size` splits into.
fn block_count(total_size: u64, block_size: u64) -> usize {
    if total_size <= block_size {
        1
    } else {
        (total_size.div_ceil(block_size)) as usize
    }
}

/// Builds the ordered sequence of blocks still to fetch.
///
/// Block 0 spans `0-<block_size>` inclusive; every later block starts one
/// byte past the previous block's end; the final block is always open-ended
/// so the union of ranges covers exactly `[0, total_size)` regardless of the
/// server's idea of the last byte. A file no larger than one block yields a
/// single `0-` range.
///
/// Indices in `existing` are skipped: those blocks are already materialized
/// on disk or recorded as finished. Output is ordered by ascending index;
/// callers may fetch in any order (only the merger needs index order).
pub fn plan_blocks(
    total_size: u64,
    block_size: u64,
    existing: &HashSet<usize>,
) -> Vec<BlockDescriptor> {
    if block_size == 0 {
        return Vec::new();
    }

    let count = block_count(total_size, block_size);
    let mut out = Vec::with_capacity(count);
    for index in 0..count {
        if existing.contains(&index) {
            continue;
        }
        let start = if index == 0 {
            0
        } else {
            index as u64 * block_size + 1
        };
        let end = if index + 1 == count {
            None
        } else {
            Some((index as u64 + 1) * block_size)
        };
        out.push(BlockDescriptor {
            index,
            range: ByteRange { start, end },
        });
    }
    out
}

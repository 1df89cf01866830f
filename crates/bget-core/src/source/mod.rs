//! Work distribution: where fetch workers take their blocks from.
//!
//! Two backends share one contract: `take` hands each pending block to
//! exactly one caller, and `mark_done` records completion for distributed
//! resume. The backend is chosen once when the engine is built.

mod local;
mod shared;

pub use local::LocalQueue;
pub use shared::{SharedJobs, SharedSet, StoreParams};

use anyhow::Result;
use std::sync::Arc;

use crate::planner::BlockDescriptor;

/// Source of pending blocks for one worker pool.
pub enum WorkSource {
    /// In-process queue: single host, one job.
    Local(LocalQueue),
    /// External atomic set store: many hosts pulling from one key.
    Shared(Arc<SharedSet>),
}

impl WorkSource {
    /// Removes and returns a pending block, or `None` when the source is
    /// drained (the worker's signal to exit). Atomic per block: no two
    /// callers ever receive the same descriptor.
    pub fn take(&self) -> Result<Option<BlockDescriptor>> {
        match self {
            WorkSource::Local(queue) => Ok(queue.take()),
            WorkSource::Shared(set) => set.take(),
        }
    }

    /// Records a completed block. The local queue tracks completion through
    /// block files on disk, so only the shared backend does anything here.
    pub fn mark_done(&self, block: &BlockDescriptor) -> Result<()> {
        match self {
            WorkSource::Local(_) => Ok(()),
            WorkSource::Shared(set) => set.mark_done(block),
        }
    }

    /// Advisory count of pending blocks.
    pub fn len(&self) -> Result<usize> {
        match self {
            WorkSource::Local(queue) => Ok(queue.len()),
            WorkSource::Shared(set) => set.len(),
        }
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Completed-block count from the shared finished set, for progress
    /// display across hosts. `None` for the local backend, whose tracker is
    /// updated directly.
    pub fn finished_count(&self) -> Result<Option<usize>> {
        match self {
            WorkSource::Local(_) => Ok(None),
            WorkSource::Shared(set) => set.finished_count().map(Some),
        }
    }
}

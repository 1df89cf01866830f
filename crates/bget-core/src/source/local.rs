//! In-process work queue for single-host downloads.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::planner::BlockDescriptor;

/// Thread-safe FIFO of pending blocks, seeded once with the full plan before
/// the worker pool starts. Draining it is the pool's shutdown signal.
pub struct LocalQueue {
    inner: Mutex<VecDeque<BlockDescriptor>>,
}

impl LocalQueue {
    pub fn new(blocks: Vec<BlockDescriptor>) -> Self {
        LocalQueue {
            inner: Mutex::new(blocks.into()),
        }
    }

    pub(crate) fn take(&self) -> Option<BlockDescriptor> {
        self.inner.lock().unwrap().pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::ByteRange;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn blocks(n: usize) -> Vec<BlockDescriptor> {
        (0..n)
            .map(|index| BlockDescriptor {
                index,
                range: ByteRange {
                    start: index as u64 * 100,
                    end: Some(index as u64 * 100 + 99),
                },
            })
            .collect()
    }

    #[test]
    fn drains_in_seed_order() {
        let queue = LocalQueue::new(blocks(3));
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.take().unwrap().index, 0);
        assert_eq!(queue.take().unwrap().index, 1);
        assert_eq!(queue.take().unwrap().index, 2);
        assert!(queue.take().is_none());
    }

    #[test]
    fn each_block_goes_to_exactly_one_taker() {
        // Hammer the queue from many threads; every descriptor must be
        // returned exactly once across all of them.
        const BLOCKS: usize = 500;
        const TAKERS: usize = 8;

        let queue = Arc::new(LocalQueue::new(blocks(BLOCKS)));
        let mut handles = Vec::new();
        for _ in 0..TAKERS {
            let queue = Arc::clone(&queue);
            handles.push(std::thread::spawn(move || {
                let mut taken = Vec::new();
                while let Some(block) = queue.take() {
                    taken.push(block.index);
                }
                taken
            }));
        }

        let mut seen = Vec::new();
        for handle in handles {
            seen.extend(handle.join().unwrap());
        }
        assert_eq!(seen.len(), BLOCKS, "no block lost or duplicated");
        let unique: HashSet<usize> = seen.iter().copied().collect();
        assert_eq!(unique.len(), BLOCKS);
    }
}

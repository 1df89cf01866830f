//! Multi-file supervision: a bounded pool of file workers over a job queue.

use anyhow::Result;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::checkpoint::JobRecord;
use crate::progress::ProgressTracker;

use super::{download_file, EngineOptions};

/// Downloads every job with up to `file_workers` files in flight at once.
///
/// A job that fails (unprobeable size, block exhausted its retries) is
/// logged and does not abort its siblings; its temp directory stays on disk
/// so a checkpoint resume can pick it up. Returns `(completed, failed)`
/// counts.
pub fn run_many(
    jobs: Vec<JobRecord>,
    file_workers: usize,
    opts: &EngineOptions,
    tracker: &Arc<ProgressTracker>,
) -> Result<(usize, usize)> {
    let workers = file_workers.clamp(1, jobs.len().max(1));
    let queue: Arc<Mutex<VecDeque<JobRecord>>> = Arc::new(Mutex::new(jobs.into()));
    let completed = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let queue = Arc::clone(&queue);
        let completed = Arc::clone(&completed);
        let failed = Arc::clone(&failed);
        let tracker = Arc::clone(tracker);
        let opts = opts.clone();
        handles.push(std::thread::spawn(move || {
            loop {
                let Some(job) = queue.lock().unwrap().pop_front() else {
                    return;
                };
                match download_file(&job, &opts, &tracker) {
                    Ok(_) => {
                        completed.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(err) => {
                        tracing::warn!(url = %job.url, "job failed: {err:#}");
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        }));
    }
    for handle in handles {
        handle
            .join()
            .unwrap_or_else(|e| panic!("file worker panicked: {:?}", e));
    }

    Ok((
        completed.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
    ))
}

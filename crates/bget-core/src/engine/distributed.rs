//! Distributed modes: whole jobs or single-file blocks pulled from the
//! shared store by any number of independent hosts.

use anyhow::Result;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::checkpoint::{Checkpoint, JobRecord};
use crate::planner;
use crate::progress::ProgressTracker;
use crate::source::{SharedJobs, SharedSet, StoreParams, WorkSource};
use crate::store;

use super::{download_file, resolve_size, worker, EngineOptions};

/// Uploads every record in the job list to the store's job set, enabling
/// other hosts to start pulling immediately. Returns the upload count.
pub fn push_jobs(params: &StoreParams, key: &str, jobs: &[JobRecord]) -> Result<usize> {
    let shared = SharedJobs::connect(params, key)?;
    for job in jobs {
        shared.push(job)?;
    }
    Ok(jobs.len())
}

/// Distributed multi-file download: `file_workers` loops each pop a job
/// record from the store, give it a temp directory recorded in the local
/// checkpoint, and download it. Workers exit on an empty pop. Returns
/// `(completed, failed)` counts for this host.
pub fn run_shared_jobs(
    params: &StoreParams,
    key: &str,
    ckpt: &Checkpoint,
    file_workers: usize,
    opts: &EngineOptions,
    tracker: &Arc<ProgressTracker>,
) -> Result<(usize, usize)> {
    let jobs = Arc::new(SharedJobs::connect(params, key)?);
    let ckpt = Arc::new(Mutex::new(ckpt.clone()));
    let counts = Arc::new(Mutex::new((0usize, 0usize)));

    let workers = file_workers.max(1);
    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let jobs = Arc::clone(&jobs);
        let ckpt = Arc::clone(&ckpt);
        let counts = Arc::clone(&counts);
        let tracker = Arc::clone(tracker);
        let opts = opts.clone();
        handles.push(std::thread::spawn(move || -> Result<()> {
            loop {
                let Some(mut job) = jobs.pop()? else {
                    return Ok(());
                };
                if job.temp_folder.is_none() {
                    let dir = store::create_temp_dir(&opts.work_dir)?;
                    job.temp_folder = dir
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned());
                    ckpt.lock().unwrap().append(&job)?;
                }
                match download_file(&job, &opts, &tracker) {
                    Ok(_) => counts.lock().unwrap().0 += 1,
                    Err(err) => {
                        tracing::warn!(url = %job.url, "job failed: {err:#}");
                        counts.lock().unwrap().1 += 1;
                    }
                }
            }
        }));
    }
    let results: Vec<Result<()>> = handles
        .into_iter()
        .map(|handle| {
            handle
                .join()
                .unwrap_or_else(|e| panic!("job worker panicked: {:?}", e))
        })
        .collect();
    for result in results {
        result?;
    }

    let counts = counts.lock().unwrap();
    Ok(*counts)
}

/// Distributed single-file download: seeds the block set (skipping ranges
/// already in the finished set), drains it alongside any other hosts on the
/// same key, then clears the finished set once this node's pool exits.
///
/// Each host keeps only its own blocks; merging happens separately once
/// every host's temp directory is gathered in one place. Returns the file's
/// total size and the temp directory used.
pub fn run_shared_blocks(
    params: &StoreParams,
    key: &str,
    job: &JobRecord,
    opts: &EngineOptions,
    tracker: &Arc<ProgressTracker>,
) -> Result<(u64, PathBuf)> {
    let size = resolve_size(job, job.temp_folder.as_deref(), opts)?;
    tracker.add_bytes(size);

    let set = Arc::new(SharedSet::connect(params, key)?);
    let all_blocks = planner::plan_blocks(size, opts.block_size, &HashSet::new());
    tracker.add_planned(all_blocks.len());
    let seeded = set.seed(&all_blocks)?;
    tracing::info!(seeded, total = all_blocks.len(), "pending blocks in store");

    let temp_dir = match &job.temp_folder {
        Some(folder) => opts.temp_path(folder),
        None => store::create_temp_dir(&opts.work_dir)?,
    };
    tracing::info!(dir = %temp_dir.display(), "fetching this node's share of {key}");

    let source = Arc::new(WorkSource::Shared(Arc::clone(&set)));
    worker::run_pool(source, &job.url, &temp_dir, opts, tracker)?;

    set.clear_finished()?;
    Ok((size, temp_dir))
}

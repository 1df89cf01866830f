//! Download supervision.
//!
//! One job runs as: ensure temp dir → probe size if unknown → plan missing
//! blocks → seed a work source → drain it with the fetch-worker pool →
//! merge. The multi-file and distributed entry points wrap that same job
//! pipeline in a job-level pool.

mod distributed;
mod multi;
mod worker;

pub use distributed::{push_jobs, run_shared_blocks, run_shared_jobs};
pub use multi::run_many;

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::checkpoint::{self, JobRecord};
use crate::merger;
use crate::name;
use crate::planner;
use crate::probe;
use crate::progress::ProgressTracker;
use crate::retry::RetryPolicy;
use crate::source::{LocalQueue, WorkSource};
use crate::store;

/// Engine parameters shared by every mode (config defaults + CLI overrides).
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Block size in bytes for range planning.
    pub block_size: u64,
    /// Fetch workers per file.
    pub block_workers: usize,
    /// Per-attempt fetch timeout.
    pub fetch_timeout: Duration,
    /// Bounded-retry policy for transient fetch errors.
    pub retry: RetryPolicy,
    /// Directory that temp dirs and outputs are created in.
    pub work_dir: PathBuf,
    /// Error log receiving one record per unprobeable job.
    pub error_log: PathBuf,
}

impl EngineOptions {
    /// Resolves a checkpoint temp-folder name against the working directory.
    pub(crate) fn temp_path(&self, temp_folder: &str) -> PathBuf {
        self.work_dir.join(temp_folder)
    }
}

/// Returns the job's total size, probing when unknown. A failed probe is
/// recorded to the error log and surfaced as an error; callers running
/// sibling jobs log it and continue.
pub(crate) fn resolve_size(
    job: &JobRecord,
    temp_folder: Option<&str>,
    opts: &EngineOptions,
) -> Result<u64> {
    if let Some(size) = job.size {
        return Ok(size);
    }
    match probe::probe_size(&job.url) {
        Ok(size) => Ok(size),
        Err(err) => {
            let record = JobRecord {
                url: job.url.clone(),
                size: None,
                name: job.name.clone(),
                temp_folder: temp_folder.map(str::to_string),
            };
            if let Err(log_err) = checkpoint::append_error(&opts.error_log, &record) {
                tracing::warn!("cannot record failed job: {log_err:#}");
            }
            Err(err).with_context(|| format!("cannot determine size of {}", job.url))
        }
    }
}

/// Downloads one file end to end and returns its total size.
///
/// Reuses the job's temp directory when it has one (resume: already
/// materialized blocks are not re-fetched), creating a fresh one otherwise.
/// A block failure after retries fails the job but leaves the temp
/// directory in place so the next run fetches only what is missing.
pub fn download_file(
    job: &JobRecord,
    opts: &EngineOptions,
    tracker: &Arc<ProgressTracker>,
) -> Result<u64> {
    let temp_dir = match &job.temp_folder {
        Some(folder) => opts.temp_path(folder),
        None => store::create_temp_dir(&opts.work_dir)?,
    };
    let folder_name = temp_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());

    let size = resolve_size(job, folder_name.as_deref(), opts)?;
    tracker.add_bytes(size);

    let output = job.name.clone().unwrap_or_else(|| name::display_name(&job.url));
    let existing = store::existing_indices(&temp_dir)?;
    let blocks = planner::plan_blocks(size, opts.block_size, &existing);
    tracker.add_planned(blocks.len());
    tracing::info!(
        blocks = blocks.len(),
        resumed = existing.len(),
        dir = %temp_dir.display(),
        "downloading {output}"
    );

    let source = Arc::new(WorkSource::Local(LocalQueue::new(blocks)));
    worker::run_pool(source, &job.url, &temp_dir, opts, tracker)?;

    if let Some(path) = merger::merge(&opts.work_dir.join(&output), &temp_dir)? {
        tracing::info!("assembled {}", path.display());
    }
    Ok(size)
}

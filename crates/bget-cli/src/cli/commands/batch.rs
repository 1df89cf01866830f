//! `bget batch <files>` – multi-file download with a resumable checkpoint.
//!
//! Fresh runs create a temp directory per job and record all of them in a
//! new checkpoint file; `--checkpoint` runs re-attach to whichever temp
//! directories survived the interruption. Ctrl-C compacts the checkpoint so
//! the next run resumes exactly the unfinished jobs.

use anyhow::{bail, Result};
use bget_core::checkpoint::{self, Checkpoint, JobRecord};
use bget_core::config::BgetConfig;
use bget_core::engine;
use bget_core::progress::ProgressTracker;
use bget_core::store;
use std::path::Path;
use std::sync::Arc;

use crate::cli::TuneArgs;

use super::{engine_options, spawn_printer};

pub async fn run_batch(
    cfg: &BgetConfig,
    tracker: &Arc<ProgressTracker>,
    files: Option<String>,
    checkpoint_path: Option<String>,
    file_workers: Option<usize>,
    tune: &TuneArgs,
) -> Result<()> {
    let opts = engine_options(cfg, tune)?;
    let file_workers = file_workers.unwrap_or(cfg.file_workers);

    let (ckpt, jobs) = match checkpoint_path {
        Some(path) => {
            if !Path::new(&path).is_file() {
                bail!("checkpoint file {path} does not exist");
            }
            let ckpt = Checkpoint::new(opts.work_dir.join(&path));
            // Only jobs whose temp directory survived are still resumable;
            // the rest finished and were merged before the interruption.
            let live_dirs = store::list_temp_dirs(&opts.work_dir)?;
            let jobs: Vec<JobRecord> = ckpt
                .load()?
                .into_iter()
                .filter(|record| {
                    record
                        .temp_folder
                        .as_deref()
                        .map(|dir| live_dirs.iter().any(|d| d == dir))
                        .unwrap_or(false)
                })
                .collect();
            println!(
                "[+] resuming {} job(s) from {}",
                jobs.len(),
                ckpt.path().display()
            );
            (ckpt, jobs)
        }
        None => {
            let Some(files) = files else {
                bail!("either a job-list file or --checkpoint is required");
            };
            let ckpt = Checkpoint::new(
                opts.work_dir
                    .join(format!("temp_{}.jsonl", store::short_token())),
            );
            let mut jobs = Vec::new();
            for mut record in checkpoint::read_records(Path::new(&files))? {
                let dir = store::create_temp_dir(&opts.work_dir)?;
                record.temp_folder = dir.file_name().map(|n| n.to_string_lossy().into_owned());
                ckpt.append(&record)?;
                jobs.push(record);
            }
            println!("[+] checkpoint file: {}", ckpt.path().display());
            (ckpt, jobs)
        }
    };

    let printer = spawn_printer(Arc::clone(tracker));
    let engine_task = tokio::task::spawn_blocking({
        let tracker = Arc::clone(tracker);
        let opts = opts.clone();
        move || engine::run_many(jobs, file_workers, &opts, &tracker)
    });

    tokio::select! {
        result = engine_task => {
            printer.finish();
            let (completed, failed) = result??;
            if failed == 0 {
                ckpt.remove()?;
            } else {
                // Failed jobs keep their temp directories; compacting instead
                // of deleting leaves them resumable with --checkpoint.
                let live_dirs = store::list_temp_dirs(&opts.work_dir)?;
                let kept = ckpt.compact(&live_dirs)?;
                println!(
                    "[+] checkpoint {} keeps {kept} failed job(s) for retry",
                    ckpt.path().display()
                );
            }
            println!("[+] {completed} job(s) done, {failed} failed");
            Ok(())
        }
        _ = tokio::signal::ctrl_c() => {
            // Keep only the jobs whose temp directory still exists; the next
            // run resumes those and re-fetches nothing already on disk.
            let live_dirs = store::list_temp_dirs(&opts.work_dir)?;
            let kept = ckpt.compact(&live_dirs)?;
            println!(
                "\n[+] interrupted; checkpoint {} keeps {} unfinished job(s)",
                ckpt.path().display(),
                kept
            );
            std::process::exit(130);
        }
    }
}

//! `bget swarm` – distributed multi-file download.
//!
//! This host pops whole job records from the shared store until the set is
//! empty, checkpointing its own jobs locally. Ctrl-C compacts the local
//! checkpoint; the resulting file resumes with `bget batch --checkpoint`.

use anyhow::Result;
use bget_core::checkpoint::Checkpoint;
use bget_core::config::BgetConfig;
use bget_core::engine;
use bget_core::progress::ProgressTracker;
use bget_core::source::StoreParams;
use bget_core::store;
use std::sync::Arc;

use crate::cli::TuneArgs;

use super::{engine_options, spawn_printer};

pub async fn run_swarm(
    cfg: &BgetConfig,
    tracker: &Arc<ProgressTracker>,
    params: &StoreParams,
    key: &str,
    file_workers: Option<usize>,
    tune: &TuneArgs,
) -> Result<()> {
    let opts = engine_options(cfg, tune)?;
    let file_workers = file_workers.unwrap_or(cfg.file_workers);

    let ckpt = Checkpoint::new(
        opts.work_dir
            .join(format!("temp_{}.jsonl", store::short_token())),
    );
    println!("[+] checkpoint file: {}", ckpt.path().display());

    let printer = spawn_printer(Arc::clone(tracker));
    let engine_task = tokio::task::spawn_blocking({
        let tracker = Arc::clone(tracker);
        let opts = opts.clone();
        let params = params.clone();
        let key = key.to_string();
        let ckpt = ckpt.clone();
        move || engine::run_shared_jobs(&params, &key, &ckpt, file_workers, &opts, &tracker)
    });

    tokio::select! {
        result = engine_task => {
            printer.finish();
            let (completed, failed) = result??;
            if failed == 0 {
                ckpt.remove()?;
            } else {
                let live_dirs = store::list_temp_dirs(&opts.work_dir)?;
                let kept = ckpt.compact(&live_dirs)?;
                println!(
                    "[+] {kept} failed job(s) kept; retry with: bget batch --checkpoint {}",
                    ckpt.path().display()
                );
            }
            println!("[+] {completed} job(s) done on this host, {failed} failed");
            Ok(())
        }
        _ = tokio::signal::ctrl_c() => {
            let live_dirs = store::list_temp_dirs(&opts.work_dir)?;
            let kept = ckpt.compact(&live_dirs)?;
            println!(
                "\n[+] interrupted; resume {} local job(s) with: bget batch --checkpoint {}",
                kept,
                ckpt.path().display()
            );
            std::process::exit(130);
        }
    }
}

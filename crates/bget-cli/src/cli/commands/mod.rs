//! CLI command handlers, one file per operating mode.

mod batch;
mod get;
mod merge;
mod seed;
mod swarm;
mod swarm_one;

pub use batch::run_batch;
pub use get::run_get;
pub use merge::run_merge;
pub use seed::run_seed;
pub use swarm::run_swarm;
pub use swarm_one::run_swarm_one;

use anyhow::Result;
use bget_core::config::BgetConfig;
use bget_core::engine::EngineOptions;
use bget_core::progress::ProgressTracker;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::cli::TuneArgs;

/// Engine options from config defaults plus per-run flag overrides. Temp
/// dirs and outputs land in the current working directory.
pub(crate) fn engine_options(cfg: &BgetConfig, tune: &TuneArgs) -> Result<EngineOptions> {
    let work_dir = std::env::current_dir()?;
    Ok(EngineOptions {
        block_size: tune.block_size.unwrap_or(cfg.block_size),
        block_workers: tune.workers.unwrap_or(cfg.block_workers),
        fetch_timeout: Duration::from_secs(cfg.fetch_timeout_secs),
        retry: cfg.retry_policy(),
        error_log: work_dir.join(bget_core::checkpoint::ERROR_LOG),
        work_dir,
    })
}

/// In-place progress line, refreshed on a fixed cadence until stopped.
pub(crate) struct ProgressPrinter {
    stop: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

pub(crate) fn spawn_printer(tracker: Arc<ProgressTracker>) -> ProgressPrinter {
    const PRINT_INTERVAL: Duration = Duration::from_millis(500);
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = Arc::clone(&stop);
    let handle = std::thread::spawn(move || {
        let mut printed = false;
        while !stop_flag.load(Ordering::Relaxed) {
            let snapshot = tracker.snapshot();
            if snapshot.blocks_total > 0 {
                print!("\r{}", snapshot.render());
                let _ = std::io::stdout().flush();
                printed = true;
            }
            std::thread::sleep(PRINT_INTERVAL);
        }
        if printed {
            let snapshot = tracker.snapshot();
            println!("\r{}", snapshot.render());
        }
    });
    ProgressPrinter {
        stop,
        handle: Some(handle),
    }
}

impl ProgressPrinter {
    /// Stops the refresh loop and prints the final line.
    pub(crate) fn finish(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ProgressPrinter {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

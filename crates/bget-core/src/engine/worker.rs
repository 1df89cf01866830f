//! Fetch-worker pool: N threads draining one work source.

use anyhow::Result;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::fetcher;
use crate::progress::ProgressTracker;
use crate::retry::{run_with_retry, FetchError};
use crate::source::WorkSource;
use crate::store;

use super::EngineOptions;

/// Runs `opts.block_workers` workers until the source is drained.
///
/// Each worker loops: take, fetch with bounded retry, append the block
/// file, progress tick, mark done. Workers never wait on each other. A
/// block whose retries are exhausted is recorded and the worker moves on,
/// so the remaining blocks still land on disk for a cheaper resume; the
/// pool then reports the failure and the job as a whole fails.
pub(crate) fn run_pool(
    source: Arc<WorkSource>,
    url: &str,
    temp_dir: &Path,
    opts: &EngineOptions,
    tracker: &Arc<ProgressTracker>,
) -> Result<()> {
    let workers = opts.block_workers.max(1);
    let failures: Arc<Mutex<Vec<(usize, FetchError)>>> = Arc::new(Mutex::new(Vec::new()));

    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let source = Arc::clone(&source);
        let failures = Arc::clone(&failures);
        let tracker = Arc::clone(tracker);
        let url = url.to_string();
        let temp_dir = temp_dir.to_path_buf();
        let opts = opts.clone();
        handles.push(std::thread::spawn(move || -> Result<()> {
            loop {
                let Some(block) = source.take()? else {
                    return Ok(());
                };
                let fetched = run_with_retry(&opts.retry, || {
                    fetcher::fetch_range(&url, &block.range, opts.fetch_timeout)
                });
                match fetched {
                    Ok(bytes) => {
                        store::write_block(&temp_dir, block.index, &bytes)?;
                        tracker.on_block_done();
                        source.mark_done(&block)?;
                        if let Some(done) = source.finished_count()? {
                            tracker.set_done(done);
                        }
                    }
                    Err(err) => {
                        tracing::warn!(
                            index = block.index,
                            range = %block.range,
                            "block failed after retries: {err}"
                        );
                        failures.lock().unwrap().push((block.index, err));
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
                .unwrap_or_else(|e| panic!("fetch worker panicked: {:?}", e))
        })
        .collect();
    for result in results {
        result?;
    }

    let failures = failures.lock().unwrap();
    if let Some((index, err)) = failures.first() {
        anyhow::bail!(
            "{} block(s) failed; first was block {}: {}",
            failures.len(),
            index,
            err
        );
    }
    Ok(())
}

//! Integration tests: block download, resume, probe failure, boundary slack.
//!
//! A local range-capable server backs each test; the engine runs exactly as
//! the CLI drives it, with the working directory pointed at a tempdir.

mod common;

use bget_core::checkpoint::{self, JobRecord};
use bget_core::engine::{self, EngineOptions};
use bget_core::planner;
use bget_core::progress::ProgressTracker;
use bget_core::retry::RetryPolicy;
use bget_core::store;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

fn options(work_dir: PathBuf, block_size: u64) -> EngineOptions {
    EngineOptions {
        block_size,
        block_workers: 4,
        fetch_timeout: Duration::from_secs(10),
        retry: RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(50),
        },
        error_log: work_dir.join("failed_downloads.jsonl"),
        work_dir,
    }
}

fn job(url: String, name: &str) -> JobRecord {
    JobRecord {
        url,
        size: None,
        name: Some(name.to_string()),
        temp_folder: None,
    }
}

#[test]
fn multi_block_download_reassembles_the_body() {
    let body: Vec<u8> = (0u8..251).cycle().take(64 * 1024).collect();
    let base = common::range_server::start(body.clone());

    let work = tempdir().unwrap();
    let opts = options(work.path().to_path_buf(), 8 * 1024);
    let tracker = Arc::new(ProgressTracker::new());

    let size =
        engine::download_file(&job(format!("{base}file.bin"), "file.bin"), &opts, &tracker)
            .expect("download");
    assert_eq!(size, body.len() as u64, "probe found the real size");

    let content = std::fs::read(work.path().join("file.bin")).unwrap();
    assert_eq!(content, body, "reassembled bytes match the served body");
    assert!(
        store::list_temp_dirs(work.path()).unwrap().is_empty(),
        "temp dir is removed after merge"
    );

    let snapshot = tracker.snapshot();
    assert!(snapshot.blocks_total > 1, "file was actually split");
    assert_eq!(snapshot.blocks_done, snapshot.blocks_total);
}

#[test]
fn resume_fetches_only_the_missing_blocks() {
    let body: Vec<u8> = (7u8..=255).cycle().take(48 * 1024).collect();
    let base = common::range_server::start(body.clone());

    let work = tempdir().unwrap();
    let block_size = 8 * 1024u64;
    let opts = options(work.path().to_path_buf(), block_size);
    let tracker = Arc::new(ProgressTracker::new());

    // Materialize blocks 0 and 2 as a previous interrupted run would have.
    let temp_dir = store::create_temp_dir(work.path()).unwrap();
    let plan = planner::plan_blocks(body.len() as u64, block_size, &HashSet::new());
    for block in plan.iter().filter(|b| b.index == 0 || b.index == 2) {
        let slice = match block.range.end {
            Some(end) => &body[block.range.start as usize..=end as usize],
            None => &body[block.range.start as usize..],
        };
        store::write_block(&temp_dir, block.index, slice).unwrap();
    }

    let mut resumed = job(format!("{base}file.bin"), "file.bin");
    resumed.size = Some(body.len() as u64);
    resumed.temp_folder = temp_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());

    engine::download_file(&resumed, &opts, &tracker).expect("resume download");

    let content = std::fs::read(work.path().join("file.bin")).unwrap();
    assert_eq!(content, body);
    assert_eq!(
        tracker.snapshot().blocks_total,
        plan.len() - 2,
        "only the missing blocks were planned"
    );
}

#[test]
fn failed_probe_is_recorded_and_skips_the_job() {
    let body = vec![1u8; 4096];
    let base = common::range_server::start_with_options(
        body,
        common::range_server::RangeServerOptions {
            support_ranges: false,
        },
    );

    let work = tempdir().unwrap();
    let opts = options(work.path().to_path_buf(), 1024);
    let tracker = Arc::new(ProgressTracker::new());

    let url = format!("{base}file.bin");
    let err = engine::download_file(&job(url.clone(), "file.bin"), &opts, &tracker)
        .expect_err("no Content-Range means the job is unprobeable");
    assert!(err.to_string().contains("size"), "error names the probe: {err:#}");

    let records = checkpoint::read_records(&opts.error_log).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, url);
    let recorded_dir = records[0].temp_folder.as_deref().expect("dir recorded");
    assert!(
        work.path().join(recorded_dir).is_dir(),
        "temp dir is kept with the error record"
    );
    assert!(!work.path().join("file.bin").exists(), "no output written");
}

#[test]
fn final_open_block_tolerates_exact_boundary_slack() {
    // total = block_size + 1 plans an open tail block that starts at
    // end-of-file; the server answers 416 and the tail is simply empty.
    let body: Vec<u8> = (0u8..=255).cycle().take(8 * 1024 + 1).collect();
    let base = common::range_server::start(body.clone());

    let work = tempdir().unwrap();
    let opts = options(work.path().to_path_buf(), 8 * 1024);
    let tracker = Arc::new(ProgressTracker::new());

    let mut sized = job(format!("{base}file.bin"), "file.bin");
    sized.size = Some(body.len() as u64);
    engine::download_file(&sized, &opts, &tracker).expect("download");

    let content = std::fs::read(work.path().join("file.bin")).unwrap();
    assert_eq!(content, body);
    assert_eq!(tracker.snapshot().blocks_done, 2);
}

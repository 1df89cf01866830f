//! `bget get <url>` – single-file parallel block download.

use anyhow::{bail, Result};
use bget_core::checkpoint::JobRecord;
use bget_core::config::BgetConfig;
use bget_core::engine;
use bget_core::progress::ProgressTracker;
use std::path::Path;
use std::sync::Arc;

use crate::cli::TuneArgs;

use super::{engine_options, spawn_printer};

pub async fn run_get(
    cfg: &BgetConfig,
    tracker: &Arc<ProgressTracker>,
    url: String,
    size: Option<u64>,
    name: Option<String>,
    temp_dir: Option<String>,
    tune: &TuneArgs,
) -> Result<()> {
    if let Some(dir) = &temp_dir {
        if !Path::new(dir).is_dir() {
            bail!("temp directory {dir} does not exist");
        }
    }

    let opts = engine_options(cfg, tune)?;
    let job = JobRecord {
        url,
        size,
        name,
        temp_folder: temp_dir,
    };

    let printer = spawn_printer(Arc::clone(tracker));
    let result = tokio::task::spawn_blocking({
        let tracker = Arc::clone(tracker);
        move || engine::download_file(&job, &opts, &tracker)
    })
    .await?;
    printer.finish();

    result.map(|_| ())
}

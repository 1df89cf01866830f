//! `bget swarm-one <url>` – distributed single-file download by blocks.
//!
//! Every participating host runs this with the same key; the store's atomic
//! pop spreads the blocks across them. Each host keeps its own temp
//! directory; once all hosts finish, gather the directories and run
//! `bget merge`.

use anyhow::{bail, Result};
use bget_core::checkpoint::JobRecord;
use bget_core::config::BgetConfig;
use bget_core::engine;
use bget_core::progress::ProgressTracker;
use bget_core::source::StoreParams;
use std::path::Path;
use std::sync::Arc;

use crate::cli::TuneArgs;

use super::{engine_options, spawn_printer};

pub async fn run_swarm_one(
    cfg: &BgetConfig,
    tracker: &Arc<ProgressTracker>,
    url: String,
    params: &StoreParams,
    key: &str,
    size: Option<u64>,
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
        name: None,
        temp_folder: temp_dir,
    };

    let printer = spawn_printer(Arc::clone(tracker));
    let result = tokio::task::spawn_blocking({
        let tracker = Arc::clone(tracker);
        let params = params.clone();
        let key = key.to_string();
        move || engine::run_shared_blocks(&params, &key, &job, &opts, &tracker)
    })
    .await?;
    printer.finish();

    let (_, local_dir) = result?;
    println!(
        "[+] this node's blocks are complete in {}; merge once every node finishes",
        local_dir.display()
    );
    Ok(())
}

//! `bget seed <files>` – upload a job list to the shared store.

use anyhow::Result;
use bget_core::checkpoint;
use bget_core::engine;
use bget_core::source::StoreParams;
use std::path::Path;

pub fn run_seed(files: &str, params: &StoreParams, key: &str) -> Result<()> {
    let jobs = checkpoint::read_records(Path::new(files))?;
    let uploaded = engine::push_jobs(params, key, &jobs)?;
    println!("[+] {uploaded} job(s) uploaded under key {key}; hosts can start pulling");
    Ok(())
}

//! `bget merge <name> <temp_dir>` – assemble blocks into the final file.

use anyhow::Result;
use bget_core::merger;
use std::path::Path;

pub fn run_merge(name: &str, temp_dir: &str) -> Result<()> {
    match merger::merge(Path::new(name), Path::new(temp_dir))? {
        Some(path) => println!("[+] assembled {}", path.display()),
        None => println!("[+] {temp_dir} does not exist; nothing to merge"),
    }
    Ok(())
}

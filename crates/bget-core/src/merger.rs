//! Reassembles a temp directory's block files into the final output.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::store;

/// Concatenates `temp_dir`'s block files in ascending index order into
/// `output`, then removes the temp directory.
///
/// Never overwrites: if `output` already exists, a `_<token>` suffix is
/// appended until the name is free. Returns the path actually written, or
/// `None` when the temp directory does not exist (nothing to merge; the
/// job was already assembled).
pub fn merge(output: &Path, temp_dir: &Path) -> Result<Option<PathBuf>> {
    if !temp_dir.is_dir() {
        return Ok(None);
    }

    let output = non_clobbering_path(output);
    let blocks = store::sorted_block_files(temp_dir)?;
    tracing::info!(
        blocks = blocks.len(),
        "assembling {} from {}",
        output.display(),
        temp_dir.display()
    );

    let mut out = fs::File::options()
        .append(true)
        .create(true)
        .open(&output)
        .with_context(|| format!("cannot create output {}", output.display()))?;
    for (index, path) in blocks {
        let data = fs::read(&path)
            .with_context(|| format!("cannot read block {}", path.display()))?;
        out.write_all(&data)
            .with_context(|| format!("write of block {} failed", index))?;
    }

    fs::remove_dir_all(temp_dir)
        .with_context(|| format!("cannot remove {}", temp_dir.display()))?;
    Ok(Some(output))
}

/// First free variant of `path`: the path itself, else `name_<token>`.
fn non_clobbering_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    loop {
        let mut name = path.as_os_str().to_os_string();
        name.push(format!("_{}", store::short_token()));
        let candidate = PathBuf::from(name);
        if !candidate.exists() {
            return candidate;
        }
    }
}

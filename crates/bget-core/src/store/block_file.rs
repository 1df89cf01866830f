//! Append-only block files named `<index>.dat`.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends `bytes` to `<temp_dir>/<index>.dat`, creating the file if absent.
///
/// No file lock: the at-most-one-writer-per-block guarantee comes from the
/// work source's atomic take, never from this layer.
pub fn write_block(temp_dir: &Path, index: usize, bytes: &[u8]) -> Result<()> {
    let path = temp_dir.join(format!("{index}.dat"));
    let mut file = fs::File::options()
        .append(true)
        .create(true)
        .open(&path)
        .with_context(|| format!("cannot open block file {}", path.display()))?;
    file.write_all(bytes)
        .with_context(|| format!("write to {} failed", path.display()))?;
    Ok(())
}

/// Indices already materialized as block files in `temp_dir` (resume input
/// for the planner). A missing directory means nothing is materialized.
pub fn existing_indices(temp_dir: &Path) -> Result<HashSet<usize>> {
    Ok(sorted_block_files(temp_dir)?
        .into_iter()
        .map(|(index, _)| index)
        .collect())
}

/// Block files in `temp_dir` as `(index, path)`, sorted by ascending numeric
/// index regardless of filesystem listing order. Non-block entries are
/// ignored.
pub fn sorted_block_files(temp_dir: &Path) -> Result<Vec<(usize, PathBuf)>> {
    let mut out = Vec::new();
    if !temp_dir.is_dir() {
        return Ok(out);
    }
    let entries = fs::read_dir(temp_dir)
        .with_context(|| format!("cannot scan {}", temp_dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        let index = path
            .extension()
            .filter(|ext| *ext == "dat")
            .and_then(|_| path.file_stem())
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.parse::<usize>().ok());
        if let Some(index) = index {
            out.push((index, path));
        }
    }
    out.sort_by_key(|(index, _)| *index);
    Ok(out)
}

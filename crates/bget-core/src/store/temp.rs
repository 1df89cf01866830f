//! Temp directory lifecycle for in-progress downloads.

use anyhow::{Context, Result};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix marking a directory as an in-progress download; checkpoint
/// compaction scans for it to decide which jobs are still resumable.
pub const TEMP_PREFIX: &str = "temp_";

/// 6-character lowercase alphanumeric token for collision-free names.
pub fn short_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}

/// Creates a fresh `temp_<token>` directory under `base` and returns its path.
pub fn create_temp_dir(base: &Path) -> Result<PathBuf> {
    let dir = base.join(format!("{}{}", TEMP_PREFIX, short_token()));
    fs::create_dir(&dir)
        .with_context(|| format!("cannot create temp directory {}", dir.display()))?;
    Ok(dir)
}

/// Names of `temp_*` directories directly under `base`: the set of jobs
/// whose blocks are still on disk and therefore resumable.
pub fn list_temp_dirs(base: &Path) -> Result<Vec<String>> {
    let mut out = Vec::new();
    let entries = fs::read_dir(base)
        .with_context(|| format!("cannot scan {}", base.display()))?;
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(TEMP_PREFIX) {
            out.push(name);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn token_is_short_and_lowercase() {
        let token = short_token();
        assert_eq!(token.len(), 6);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(token, token.to_ascii_lowercase());
    }

    #[test]
    fn created_dirs_are_listed() {
        let base = tempdir().unwrap();
        let a = create_temp_dir(base.path()).unwrap();
        let b = create_temp_dir(base.path()).unwrap();
        // A plain file with the prefix must not be listed.
        std::fs::write(base.path().join("temp_notadir"), b"x").unwrap();
        std::fs::create_dir(base.path().join("unrelated")).unwrap();

        let mut listed = list_temp_dirs(base.path()).unwrap();
        listed.sort();
        let mut expected = vec![
            a.file_name().unwrap().to_string_lossy().into_owned(),
            b.file_name().unwrap().to_string_lossy().into_owned(),
        ];
        expected.sort();
        assert_eq!(listed, expected);
    }
}

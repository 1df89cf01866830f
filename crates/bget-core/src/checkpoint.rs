//! Newline-delimited JSON job records.
//!
//! One record shape serves the job-list input, the resumable checkpoint
//! file, the shared store's job set, and the failed-downloads log:
//! `{"url":..., "size":..., "name":..., "temp_folder":...}` with the
//! optional fields omitted when unknown.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default error-log file: one record per job whose size probe failed.
pub const ERROR_LOG: &str = "failed_downloads.jsonl";

/// One download job as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub url: String,
    /// Total size in bytes; probed when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Output filename; derived from the URL when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Temp directory name (relative to the working directory) once the job
    /// has one; its presence is what makes a checkpoint line resumable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_folder: Option<String>,
}

impl JobRecord {
    /// A record carrying only a URL (single-file entry points).
    pub fn for_url(url: impl Into<String>) -> Self {
        JobRecord {
            url: url.into(),
            size: None,
            name: None,
            temp_folder: None,
        }
    }
}

/// Reads a job-list or checkpoint file: one JSON object per non-empty line.
/// A line that does not parse is an error; malformed input is fatal at
/// startup rather than silently skipped.
pub fn read_records(path: &Path) -> Result<Vec<JobRecord>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("cannot read job file {}", path.display()))?;
    let mut out = Vec::new();
    for (lineno, line) in data.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: JobRecord = serde_json::from_str(line).with_context(|| {
            format!("{}:{}: malformed job record", path.display(), lineno + 1)
        })?;
        out.push(record);
    }
    Ok(out)
}

fn append_line(path: &Path, record: &JobRecord) -> Result<()> {
    let mut file = fs::File::options()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("cannot open {}", path.display()))?;
    writeln!(file, "{}", serde_json::to_string(record)?)
        .with_context(|| format!("write to {} failed", path.display()))?;
    Ok(())
}

/// Appends a failed-job record to the error log for later inspection/retry.
pub fn append_error(path: &Path, record: &JobRecord) -> Result<()> {
    append_line(path, record)
}

/// Checkpoint of in-progress jobs: appended as temp directories are created,
/// compacted on interruption, deleted after a fully successful run.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    path: PathBuf,
}

impl Checkpoint {
    pub fn new(path: PathBuf) -> Self {
        Checkpoint { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record; called as each job's temp directory is created.
    pub fn append(&self, record: &JobRecord) -> Result<()> {
        append_line(&self.path, record)
    }

    pub fn load(&self) -> Result<Vec<JobRecord>> {
        read_records(&self.path)
    }

    /// Rewrites the file keeping only records whose temp directory is in
    /// `existing_dirs`, preserving their relative order. A record whose
    /// directory is gone was merged and needs no resume. Returns the number
    /// of records kept. A checkpoint that was never written is left alone.
    pub fn compact(&self, existing_dirs: &[String]) -> Result<usize> {
        if !self.path.exists() {
            return Ok(0);
        }
        let kept: Vec<JobRecord> = self
            .load()?
            .into_iter()
            .filter(|r| {
                r.temp_folder
                    .as_deref()
                    .map(|dir| existing_dirs.iter().any(|d| d == dir))
                    .unwrap_or(false)
            })
            .collect();
        let mut lines = String::new();
        for record in &kept {
            lines.push_str(&serde_json::to_string(record)?);
            lines.push('\n');
        }
        fs::write(&self.path, lines)
            .with_context(|| format!("cannot rewrite {}", self.path.display()))?;
        Ok(kept.len())
    }

    /// Deletes the checkpoint after a fully successful run. A checkpoint
    /// that was never written (zero jobs) is already gone.
    pub fn remove(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        fs::remove_file(&self.path)
            .with_context(|| format!("cannot remove {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(url: &str, temp_folder: Option<&str>) -> JobRecord {
        JobRecord {
            url: url.to_string(),
            size: None,
            name: None,
            temp_folder: temp_folder.map(str::to_string),
        }
    }

    #[test]
    fn wire_format_keys_and_optional_fields() {
        let full = JobRecord {
            url: "http://h/f".into(),
            size: Some(42),
            name: Some("f".into()),
            temp_folder: Some("temp_abc123".into()),
        };
        let json = serde_json::to_string(&full).unwrap();
        assert_eq!(
            json,
            r#"{"url":"http://h/f","size":42,"name":"f","temp_folder":"temp_abc123"}"#
        );

        let bare = serde_json::to_string(&JobRecord::for_url("http://h/g")).unwrap();
        assert_eq!(bare, r#"{"url":"http://h/g"}"#);
    }

    #[test]
    fn append_then_load_roundtrips() {
        let dir = tempdir().unwrap();
        let ckpt = Checkpoint::new(dir.path().join("run.jsonl"));
        let a = record("http://h/a", Some("temp_a"));
        let b = record("http://h/b", Some("temp_b"));
        ckpt.append(&a).unwrap();
        ckpt.append(&b).unwrap();
        assert_eq!(ckpt.load().unwrap(), vec![a, b]);
    }

    #[test]
    fn blank_lines_are_skipped_and_garbage_is_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jobs.jsonl");
        fs::write(&path, "\n{\"url\":\"http://h/a\"}\n\n").unwrap();
        assert_eq!(read_records(&path).unwrap().len(), 1);

        fs::write(&path, "{\"url\":\"http://h/a\"}\nnot json\n").unwrap();
        let err = read_records(&path).unwrap_err();
        assert!(err.to_string().contains(":2"));
    }

    #[test]
    fn compact_keeps_only_live_dirs_in_order() {
        let dir = tempdir().unwrap();
        let ckpt = Checkpoint::new(dir.path().join("run.jsonl"));
        let records = [
            record("http://h/a", Some("temp_a")),
            record("http://h/b", Some("temp_b")),
            record("http://h/c", Some("temp_c")),
            record("http://h/d", None),
        ];
        for r in &records {
            ckpt.append(r).unwrap();
        }

        let live = vec!["temp_c".to_string(), "temp_a".to_string()];
        assert_eq!(ckpt.compact(&live).unwrap(), 2);
        let kept = ckpt.load().unwrap();
        assert_eq!(kept, vec![records[0].clone(), records[2].clone()]);
    }

    #[test]
    fn compact_without_a_file_is_a_noop() {
        let dir = tempdir().unwrap();
        let ckpt = Checkpoint::new(dir.path().join("never-written.jsonl"));
        assert_eq!(ckpt.compact(&[]).unwrap(), 0);
        assert!(!ckpt.path().exists());
    }

    #[test]
    fn remove_deletes_the_file() {
        let dir = tempdir().unwrap();
        let ckpt = Checkpoint::new(dir.path().join("run.jsonl"));
        ckpt.append(&record("http://h/a", Some("temp_a"))).unwrap();
        ckpt.remove().unwrap();
        assert!(!ckpt.path().exists());
    }
}

//! Progress accounting for one run.
//!
//! An explicitly scoped tracker handed to the engine: workers bump the
//! counters, the CLI renders snapshots. Display only; completion is always
//! signaled by work-source exhaustion, never by these numbers.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

/// Shared counters for one run (single job or a whole job set).
pub struct ProgressTracker {
    blocks_total: AtomicUsize,
    blocks_done: AtomicUsize,
    bytes_total: AtomicU64,
    started: Instant,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            blocks_total: AtomicUsize::new(0),
            blocks_done: AtomicUsize::new(0),
            bytes_total: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    /// Adds freshly planned blocks to the advisory total.
    pub fn add_planned(&self, n: usize) {
        self.blocks_total.fetch_add(n, Ordering::Relaxed);
    }

    /// Records one completed block.
    pub fn on_block_done(&self) {
        self.blocks_done.fetch_add(1, Ordering::Relaxed);
    }

    /// Overwrites the done count from an authoritative external source (the
    /// shared finished set's cardinality). Never moves the count backwards.
    pub fn set_done(&self, n: usize) {
        self.blocks_done.fetch_max(n, Ordering::Relaxed);
    }

    /// Adds a job's total size once known, for the throughput summary.
    pub fn add_bytes(&self, n: u64) {
        self.bytes_total.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            blocks_total: self.blocks_total.load(Ordering::Relaxed),
            blocks_done: self.blocks_done.load(Ordering::Relaxed),
            bytes_total: self.bytes_total.load(Ordering::Relaxed),
            elapsed_secs: self.started.elapsed().as_secs_f64(),
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of a tracker, safe to format off-thread.
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    pub blocks_total: usize,
    pub blocks_done: usize,
    pub bytes_total: u64,
    pub elapsed_secs: f64,
}

impl ProgressSnapshot {
    /// Fraction complete in [0.0, 1.0]; 0.0 before anything is planned.
    pub fn fraction(&self) -> f64 {
        if self.blocks_total == 0 {
            return 0.0;
        }
        (self.blocks_done as f64 / self.blocks_total as f64).min(1.0)
    }

    /// Average seconds per completed block; `None` before the first
    /// completion (the rate is undefined, not infinite).
    pub fn secs_per_block(&self) -> Option<f64> {
        if self.blocks_done == 0 {
            return None;
        }
        Some(self.elapsed_secs / self.blocks_done as f64)
    }

    /// Estimated seconds remaining; `None` until the first block completes.
    pub fn eta_secs(&self) -> Option<f64> {
        let remaining = self.blocks_total.saturating_sub(self.blocks_done);
        let per_block = self.secs_per_block()?;
        Some(per_block * remaining as f64)
    }

    /// Average throughput in KB/s over the whole run; `None` while no sized
    /// job has been seen or no time has passed.
    pub fn kb_per_sec(&self) -> Option<f64> {
        if self.bytes_total == 0 || self.elapsed_secs <= 0.0 {
            return None;
        }
        Some(self.bytes_total as f64 / 1024.0 / self.elapsed_secs)
    }

    /// One-line in-place display: `done/total pct s-per-block elapsed eta`.
    pub fn render(&self) -> String {
        let spb = self
            .secs_per_block()
            .map(|s| format!("{:.2}", s))
            .unwrap_or_else(|| "?".to_string());
        let eta = self
            .eta_secs()
            .map(|s| format!("{}", s as u64))
            .unwrap_or_else(|| "?".to_string());
        format!(
            "[+] {}/{} {:.2}% {}s/block {}s >={}s",
            self.blocks_done,
            self.blocks_total,
            self.fraction() * 100.0,
            spb,
            self.elapsed_secs as u64,
            eta
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimates_are_suppressed_before_first_block() {
        let tracker = ProgressTracker::new();
        tracker.add_planned(10);
        let snap = tracker.snapshot();
        assert_eq!(snap.fraction(), 0.0);
        assert!(snap.secs_per_block().is_none());
        assert!(snap.eta_secs().is_none());
        assert!(snap.kb_per_sec().is_none());
        assert!(snap.render().contains('?'));
    }

    #[test]
    fn counters_accumulate() {
        let tracker = ProgressTracker::new();
        tracker.add_planned(4);
        tracker.on_block_done();
        tracker.on_block_done();
        tracker.add_bytes(1024);
        let snap = tracker.snapshot();
        assert_eq!(snap.blocks_total, 4);
        assert_eq!(snap.blocks_done, 2);
        assert!((snap.fraction() - 0.5).abs() < 1e-9);
        assert!(snap.secs_per_block().is_some());
        assert!(snap.eta_secs().is_some());
    }

    #[test]
    fn external_done_count_never_regresses() {
        let tracker = ProgressTracker::new();
        tracker.add_planned(8);
        tracker.set_done(5);
        tracker.set_done(3);
        assert_eq!(tracker.snapshot().blocks_done, 5);
    }

    #[test]
    fn fraction_is_clamped() {
        let tracker = ProgressTracker::new();
        tracker.add_planned(1);
        tracker.set_done(2);
        assert_eq!(tracker.snapshot().fraction(), 1.0);
    }
}

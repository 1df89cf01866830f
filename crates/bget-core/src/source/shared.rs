//! Shared atomic-set work source for multi-host downloads.
//!
//! Every mutation is a single atomic store command (`SPOP`, `SADD`,
//! `SISMEMBER`, `SCARD`, `DEL`); the store is never read-then-written
//! across two calls where one atomic call exists. That atomicity is the
//! whole correctness story for hosts pulling from the same key.

use anyhow::{Context, Result};
use redis::Commands;
use std::sync::Mutex;

use crate::checkpoint::JobRecord;
use crate::planner::BlockDescriptor;

/// Store connection parameters, passed through from the caller (credentials
/// are forwarded, never persisted).
#[derive(Debug, Clone)]
pub struct StoreParams {
    pub host: String,
    pub port: u16,
    pub db: i64,
    pub password: Option<String>,
}

impl StoreParams {
    fn url(&self) -> String {
        match &self.password {
            Some(password) => format!(
                "redis://:{}@{}:{}/{}",
                password, self.host, self.port, self.db
            ),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }

    fn connect(&self) -> Result<redis::Connection> {
        let client = redis::Client::open(self.url().as_str())
            .context("invalid shared-store address")?;
        client
            .get_connection()
            .with_context(|| format!("cannot reach shared store at {}:{}", self.host, self.port))
    }
}

/// Pending-block set under the job key; completed ranges recorded in
/// `<key>_finished` so a late-joining or restarted node can skip them.
pub struct SharedSet {
    conn: Mutex<redis::Connection>,
    key: String,
}

impl SharedSet {
    pub fn connect(params: &StoreParams, key: &str) -> Result<Self> {
        Ok(SharedSet {
            conn: Mutex::new(params.connect()?),
            key: key.to_string(),
        })
    }

    fn finished_key(&self) -> String {
        format!("{}_finished", self.key)
    }

    /// Adds every planned block whose range is not already in the finished
    /// set. Idempotent across nodes seeding the same key concurrently.
    /// Returns how many members this call added.
    pub fn seed(&self, blocks: &[BlockDescriptor]) -> Result<usize> {
        let mut conn = self.conn.lock().unwrap();
        let finished = self.finished_key();
        let mut added = 0usize;
        for block in blocks {
            let done: bool = conn
                .sismember(&finished, block.range.to_string())
                .context("shared store: finished-set check failed")?;
            if done {
                continue;
            }
            let n: i64 = conn
                .sadd(&self.key, block.encode())
                .context("shared store: cannot add pending block")?;
            added += n as usize;
        }
        Ok(added)
    }

    /// Atomically pops one pending block; `None` when the set is empty.
    pub(crate) fn take(&self) -> Result<Option<BlockDescriptor>> {
        let raw: Option<String> = self
            .conn
            .lock()
            .unwrap()
            .spop(&self.key)
            .context("shared store: pop failed")?;
        match raw {
            None => Ok(None),
            Some(member) => BlockDescriptor::decode(&member)
                .with_context(|| format!("malformed block descriptor in store: {member:?}"))
                .map(Some),
        }
    }

    /// Records the block's range in the finished set.
    pub(crate) fn mark_done(&self, block: &BlockDescriptor) -> Result<()> {
        let _: i64 = self
            .conn
            .lock()
            .unwrap()
            .sadd(self.finished_key(), block.range.to_string())
            .context("shared store: cannot record finished block")?;
        Ok(())
    }

    pub(crate) fn len(&self) -> Result<usize> {
        let n: usize = self
            .conn
            .lock()
            .unwrap()
            .scard(&self.key)
            .context("shared store: cannot read pending count")?;
        Ok(n)
    }

    pub(crate) fn finished_count(&self) -> Result<usize> {
        let n: usize = self
            .conn
            .lock()
            .unwrap()
            .scard(self.finished_key())
            .context("shared store: cannot read finished count")?;
        Ok(n)
    }

    /// Drops the finished set once this node's pool has drained.
    pub fn clear_finished(&self) -> Result<()> {
        let _: i64 = self
            .conn
            .lock()
            .unwrap()
            .del(self.finished_key())
            .context("shared store: cannot clear finished set")?;
        Ok(())
    }
}

/// Job-level set for the distributed multi-file mode: the key holds one JSON
/// job record per file, popped whole by whichever host gets there first.
pub struct SharedJobs {
    conn: Mutex<redis::Connection>,
    key: String,
}

impl SharedJobs {
    pub fn connect(params: &StoreParams, key: &str) -> Result<Self> {
        Ok(SharedJobs {
            conn: Mutex::new(params.connect()?),
            key: key.to_string(),
        })
    }

    /// Uploads one job record to the set.
    pub fn push(&self, record: &JobRecord) -> Result<()> {
        let _: i64 = self
            .conn
            .lock()
            .unwrap()
            .sadd(&self.key, serde_json::to_string(record)?)
            .context("shared store: cannot upload job")?;
        Ok(())
    }

    /// Atomically pops one job record; `None` when the set is empty.
    pub fn pop(&self) -> Result<Option<JobRecord>> {
        let raw: Option<String> = self
            .conn
            .lock()
            .unwrap()
            .spop(&self.key)
            .context("shared store: job pop failed")?;
        match raw {
            None => Ok(None),
            Some(json) => serde_json::from_str(&json)
                .with_context(|| format!("malformed job record in store: {json:?}"))
                .map(Some),
        }
    }
}

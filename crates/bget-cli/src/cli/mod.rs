//! CLI for the bget block downloader.

mod commands;

use anyhow::Result;
use bget_core::config;
use bget_core::progress::ProgressTracker;
use bget_core::source::StoreParams;
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;

use commands::{run_batch, run_get, run_merge, run_seed, run_swarm, run_swarm_one};

/// Top-level CLI for the bget block downloader.
#[derive(Debug, Parser)]
#[command(name = "bget")]
#[command(about = "bget: resumable parallel block downloader", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Shared-store connection flags for the distributed modes.
#[derive(Debug, Args)]
pub struct StoreArgs {
    /// Job key in the shared store.
    #[arg(long)]
    pub key: String,

    /// Store host.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Store port.
    #[arg(long, default_value = "6379")]
    pub port: u16,

    /// Store database index.
    #[arg(long, default_value = "0")]
    pub db: i64,

    /// Store password (passed through to the store, never persisted).
    #[arg(long)]
    pub password: Option<String>,
}

impl StoreArgs {
    fn params(&self) -> StoreParams {
        StoreParams {
            host: self.host.clone(),
            port: self.port,
            db: self.db,
            password: self.password.clone(),
        }
    }
}

/// Tuning flags shared by the downloading modes (config supplies defaults).
#[derive(Debug, Args)]
pub struct TuneArgs {
    /// Block size in bytes.
    #[arg(long)]
    pub block_size: Option<u64>,

    /// Fetch workers per file.
    #[arg(long)]
    pub workers: Option<usize>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download one file with parallel block fetches.
    Get {
        /// Direct HTTP/HTTPS URL to download.
        url: String,

        /// Known total size in bytes (skips the probe).
        #[arg(long)]
        size: Option<u64>,

        /// Save under this name instead of the URL's last path segment.
        #[arg(long)]
        name: Option<String>,

        /// Existing temp directory to resume into.
        #[arg(long)]
        temp_dir: Option<String>,

        #[command(flatten)]
        tune: TuneArgs,
    },

    /// Download every file in a newline-delimited JSON job list.
    Batch {
        /// Path to the job list (one JSON object per line).
        files: Option<String>,

        /// Checkpoint file from an interrupted run to resume instead.
        #[arg(long)]
        checkpoint: Option<String>,

        /// Concurrently downloading files.
        #[arg(long)]
        file_workers: Option<usize>,

        #[command(flatten)]
        tune: TuneArgs,
    },

    /// Upload a job list to the shared store for distributed download.
    Seed {
        /// Path to the job list (one JSON object per line).
        files: String,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Pull whole files from the shared store's job set (multi-host).
    Swarm {
        #[command(flatten)]
        store: StoreArgs,

        /// Concurrently downloading files on this host.
        #[arg(long)]
        file_workers: Option<usize>,

        #[command(flatten)]
        tune: TuneArgs,
    },

    /// Pull blocks of one large file from the shared store (multi-host);
    /// merge separately once every host's blocks are gathered.
    SwarmOne {
        /// Direct HTTP/HTTPS URL to download.
        url: String,

        #[command(flatten)]
        store: StoreArgs,

        /// Known total size in bytes (skips the probe).
        #[arg(long)]
        size: Option<u64>,

        /// Existing temp directory to resume into.
        #[arg(long)]
        temp_dir: Option<String>,

        #[command(flatten)]
        tune: TuneArgs,
    },

    /// Merge a temp directory's blocks into the final file.
    Merge {
        /// Output file name.
        name: String,

        /// Temp directory holding `<index>.dat` block files.
        temp_dir: String,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let tracker = Arc::new(ProgressTracker::new());

        match cli.command {
            CliCommand::Get {
                url,
                size,
                name,
                temp_dir,
                tune,
            } => run_get(&cfg, &tracker, url, size, name, temp_dir, &tune).await?,
            CliCommand::Batch {
                files,
                checkpoint,
                file_workers,
                tune,
            } => run_batch(&cfg, &tracker, files, checkpoint, file_workers, &tune).await?,
            CliCommand::Seed { files, store } => run_seed(&files, &store.params(), &store.key)?,
            CliCommand::Swarm {
                store,
                file_workers,
                tune,
            } => {
                run_swarm(&cfg, &tracker, &store.params(), &store.key, file_workers, &tune).await?
            }
            CliCommand::SwarmOne {
                url,
                store,
                size,
                temp_dir,
                tune,
            } => {
                run_swarm_one(
                    &cfg,
                    &tracker,
                    url,
                    &store.params(),
                    &store.key,
                    size,
                    temp_dir,
                    &tune,
                )
                .await?
            }
            CliCommand::Merge { name, temp_dir } => run_merge(&name, &temp_dir)?,
        }

        // Run summary: elapsed always, throughput once any sized job ran.
        let snapshot = tracker.snapshot();
        println!("[+] total time: {:.2}s", snapshot.elapsed_secs);
        if let Some(kbps) = snapshot.kb_per_sec() {
            println!("[+] average speed: {:.2} KB/s", kbps);
        }
        Ok(())
    }
}

//! wbs-sync - WBS snapshot synchronization tool
//!
//! Pulls a work-breakdown-structure database from Notion, normalizes every
//! record into the canonical item shape, computes progress statistics, and
//! writes an idempotent JSON snapshot that is only rewritten when the
//! source content actually changed.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use wbs_common::config::SyncConfig;
use wbs_sync::sync::{SyncEngine, SyncOutcome};

#[derive(Debug, Parser)]
#[command(name = "wbs-sync", version, about = "Sync a WBS database to a JSON snapshot")]
struct Args {
    /// Config file path (default: $WBS_SYNC_CONFIG, then the platform
    /// config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the snapshot output path from the config
    #[arg(long)]
    output: Option<PathBuf>,

    /// Rewrite the snapshot even when the source content is unchanged
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!("Starting wbs-sync v{}", env!("CARGO_PKG_VERSION"));

    let mut config = SyncConfig::resolve(args.config.as_deref())?;
    if let Some(output) = args.output {
        config.snapshot_path = output;
    }
    info!(database_id = %config.database_id, "Syncing WBS database");

    let engine = SyncEngine::new(config, args.force)?;
    match engine.run().await? {
        SyncOutcome::Written {
            total,
            unit_project_total,
            management_total,
            average_progress,
            path,
        } => {
            info!(
                total,
                unit_project = unit_project_total,
                management = management_total,
                "Sync complete: average progress {:.1}%, snapshot written to {}",
                average_progress,
                path.display()
            );
        }
        SyncOutcome::Unchanged { total } => {
            info!(total, "Sync complete: no changes, snapshot left untouched");
        }
    }

    Ok(())
}

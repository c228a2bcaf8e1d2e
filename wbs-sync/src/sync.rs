//! Sync orchestration
//!
//! Drives the one-way chain: page source -> item builder -> sorted canonical
//! collection -> change detector -> statistics -> snapshot sink. The
//! fingerprint comparison runs before aggregation so an unchanged source
//! skips all downstream work, and the fingerprint state is only advanced
//! after the snapshot write succeeded.

use crate::fingerprint::{self, FingerprintStore};
use crate::item::ItemBuilder;
use crate::notion::NotionClient;
use crate::snapshot;
use crate::sortkey::SortKey;
use chrono::Utc;
use std::path::PathBuf;
use tracing::info;
use wbs_common::config::SyncConfig;
use wbs_common::model::CanonicalItem;
use wbs_common::Result;

/// What a run did, for callers that gate downstream work on it
#[derive(Debug)]
pub enum SyncOutcome {
    /// The snapshot was rewritten
    Written {
        total: usize,
        unit_project_total: usize,
        management_total: usize,
        average_progress: f64,
        path: PathBuf,
    },
    /// Source content matched the previous fingerprint; the sink was not
    /// touched
    Unchanged { total: usize },
}

/// One-shot sync run over a configured source
pub struct SyncEngine {
    config: SyncConfig,
    client: NotionClient,
    force: bool,
}

impl SyncEngine {
    /// Build the engine and its page-source client
    ///
    /// `force` bypasses the change gate and always rewrites the snapshot.
    pub fn new(config: SyncConfig, force: bool) -> Result<Self> {
        let client = NotionClient::new(&config.api_key)?;
        Ok(Self {
            config,
            client,
            force,
        })
    }

    /// Fetch, normalize, and persist (when changed) one full snapshot
    pub async fn run(&self) -> Result<SyncOutcome> {
        let pages = self.client.fetch_all(&self.config.database_id).await?;
        info!(total = pages.len(), "Fetched all records");

        let builder = ItemBuilder::new(
            &self.config.people,
            &self.config.status_groups,
            &self.config.management_categories,
        );
        let mut items: Vec<CanonicalItem> =
            pages.iter().map(|page| builder.build_inferred(page)).collect();
        items.sort_by_cached_key(|item| SortKey::from_code(item.code.as_deref()));

        let store = FingerprintStore::new(&self.config.fingerprint_path);
        let previous = store.load();
        let (changed, current) = fingerprint::has_changed(&items, previous.as_deref())?;

        if !changed && !self.force {
            info!(total = items.len(), "Source unchanged; skipping snapshot write");
            return Ok(SyncOutcome::Unchanged {
                total: items.len(),
            });
        }

        let document = snapshot::build_document(items, &self.config, Utc::now());
        snapshot::write_snapshot(&document, &self.config.snapshot_path)?;
        store.store(&current)?;

        Ok(SyncOutcome::Written {
            total: document.metadata.total_items,
            unit_project_total: document.statistics.unit_project.total,
            management_total: document.statistics.management.total,
            average_progress: document.statistics.combined.average_progress,
            path: self.config.snapshot_path.clone(),
        })
    }
}

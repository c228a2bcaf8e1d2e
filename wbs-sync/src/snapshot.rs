//! Snapshot document assembly and persistence
//!
//! The persisted JSON carries metadata, one statistics snapshot per logical
//! grouping (combined and per WBS type), the full item collection in display
//! order plus per-type partitions, and an items-by-area grouping for
//! consumers that render one area at a time. The write is temp-file +
//! rename so a failure cannot leave a truncated snapshot behind.

use crate::stats::{self, StatisticsSnapshot};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;
use wbs_common::config::SyncConfig;
use wbs_common::model::{CanonicalItem, WbsType, UNSPECIFIED};
use wbs_common::{Error, Result};

/// Top-level persisted document
#[derive(Debug, Serialize)]
pub struct SnapshotDocument {
    pub metadata: SnapshotMetadata,
    pub statistics: SnapshotStatistics,
    pub items: SnapshotItems,
    pub grouped_by_area: BTreeMap<String, Vec<CanonicalItem>>,
}

#[derive(Debug, Serialize)]
pub struct SnapshotMetadata {
    pub synced_at: DateTime<Utc>,
    pub database_id: String,
    pub database_url: String,
    pub total_items: usize,
    pub business_areas: Vec<String>,
}

/// One statistics snapshot per logical grouping
#[derive(Debug, Serialize)]
pub struct SnapshotStatistics {
    pub combined: StatisticsSnapshot,
    pub unit_project: StatisticsSnapshot,
    pub management: StatisticsSnapshot,
}

/// The canonical collection, in display order, plus per-type partitions
#[derive(Debug, Serialize)]
pub struct SnapshotItems {
    pub all: Vec<CanonicalItem>,
    pub unit_project: Vec<CanonicalItem>,
    pub management: Vec<CanonicalItem>,
}

/// Assemble the full document from a sorted item collection
pub fn build_document(
    items: Vec<CanonicalItem>,
    config: &SyncConfig,
    synced_at: DateTime<Utc>,
) -> SnapshotDocument {
    let statistics = SnapshotStatistics {
        combined: stats::aggregate(&items),
        unit_project: stats::aggregate_for(&items, WbsType::UnitProject),
        management: stats::aggregate_for(&items, WbsType::Management),
    };

    let mut grouped_by_area: BTreeMap<String, Vec<CanonicalItem>> = BTreeMap::new();
    for item in &items {
        grouped_by_area
            .entry(
                item.area
                    .clone()
                    .unwrap_or_else(|| UNSPECIFIED.to_string()),
            )
            .or_default()
            .push(item.clone());
    }

    let unit_project: Vec<CanonicalItem> = items
        .iter()
        .filter(|i| i.wbs_type == WbsType::UnitProject)
        .cloned()
        .collect();
    let management: Vec<CanonicalItem> = items
        .iter()
        .filter(|i| i.wbs_type == WbsType::Management)
        .cloned()
        .collect();

    SnapshotDocument {
        metadata: SnapshotMetadata {
            synced_at,
            database_id: config.database_id.clone(),
            database_url: format!(
                "https://www.notion.so/{}",
                config.database_id.replace('-', "")
            ),
            total_items: items.len(),
            business_areas: config.business_areas.clone(),
        },
        statistics,
        items: SnapshotItems {
            all: items,
            unit_project,
            management,
        },
        grouped_by_area,
    }
}

/// Write the document to the sink path, atomically
///
/// Serializes into a sibling temp file and renames over the target, so the
/// previous snapshot survives any failure along the way.
pub fn write_snapshot(document: &SnapshotDocument, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::Persistence(format!("Create {} failed: {}", parent.display(), e))
            })?;
        }
    }

    let json = serde_json::to_vec_pretty(document)?;
    let temp_path = path.with_extension("json.tmp");
    std::fs::write(&temp_path, &json)
        .map_err(|e| Error::Persistence(format!("Write {} failed: {}", temp_path.display(), e)))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| Error::Persistence(format!("Rename to {} failed: {}", path.display(), e)))?;

    info!(bytes = json.len(), "Snapshot written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wbs_common::config::{PeopleDirectory, StatusPartition};
    use wbs_common::model::{ItemDates, StatusGroup};

    fn config() -> SyncConfig {
        SyncConfig {
            api_key: "secret_test".to_string(),
            database_id: "0ed4b202-7037-400e-96f3-9e3455ba63cd".to_string(),
            people: PeopleDirectory::default(),
            status_groups: StatusPartition::default(),
            management_categories: vec!["Milestone".to_string()],
            business_areas: vec!["Mobility".to_string()],
            snapshot_path: "data/wbs-data.json".into(),
            fingerprint_path: "data/.wbs-fingerprint".into(),
        }
    }

    fn item(id: &str, area: Option<&str>, wbs_type: WbsType) -> CanonicalItem {
        CanonicalItem {
            id: id.to_string(),
            url: None,
            title: format!("Item {}", id),
            code: None,
            wbs_type,
            area: area.map(str::to_string),
            sub_area: None,
            phase: None,
            priority: None,
            risk_level: None,
            detail_status: None,
            status_label: "Waiting".to_string(),
            status_group: StatusGroup::ToDo,
            assignees: Vec::new(),
            progress: 0.0,
            budget_rate: None,
            weight: None,
            dates: ItemDates::default(),
            description: None,
            last_edited: None,
        }
    }

    #[test]
    fn document_partitions_items_by_type_and_area() {
        let items = vec![
            item("a", Some("Mobility"), WbsType::UnitProject),
            item("b", Some("Mobility"), WbsType::UnitProject),
            item("c", None, WbsType::Management),
        ];
        let document = build_document(items, &config(), Utc::now());

        assert_eq!(document.metadata.total_items, 3);
        assert_eq!(
            document.metadata.database_url,
            "https://www.notion.so/0ed4b2027037400e96f39e3455ba63cd"
        );
        assert_eq!(document.items.all.len(), 3);
        assert_eq!(document.items.unit_project.len(), 2);
        assert_eq!(document.items.management.len(), 1);
        assert_eq!(document.grouped_by_area["Mobility"].len(), 2);
        assert_eq!(document.grouped_by_area[UNSPECIFIED].len(), 1);
        assert_eq!(document.statistics.combined.total, 3);
        assert_eq!(document.statistics.unit_project.total, 2);
        assert_eq!(document.statistics.management.total, 1);
    }

    #[test]
    fn snapshot_json_has_the_contract_top_level_keys() {
        let document = build_document(
            vec![item("a", None, WbsType::UnitProject)],
            &config(),
            Utc::now(),
        );
        let value = serde_json::to_value(&document).unwrap();
        for key in ["metadata", "statistics", "items", "grouped_by_area"] {
            assert!(value.get(key).is_some(), "missing top-level key {}", key);
        }
        assert!(value["statistics"].get("combined").is_some());
        assert!(value["metadata"].get("synced_at").is_some());
    }

    #[test]
    fn write_snapshot_creates_parents_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("wbs-data.json");
        let document = build_document(
            vec![item("a", None, WbsType::UnitProject)],
            &config(),
            Utc::now(),
        );

        write_snapshot(&document, &path).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        assert!(first.contains("\"total_items\": 1"));

        let document = build_document(
            vec![
                item("a", None, WbsType::UnitProject),
                item("b", None, WbsType::UnitProject),
            ],
            &config(),
            Utc::now(),
        );
        write_snapshot(&document, &path).unwrap();
        let second = std::fs::read_to_string(&path).unwrap();
        assert!(second.contains("\"total_items\": 2"));
        assert!(!path.with_extension("json.tmp").exists());
    }
}

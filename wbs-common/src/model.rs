//! Canonical work-item model
//!
//! `CanonicalItem` is the normalized, source-agnostic representation of one
//! WBS record. It is constructed once per raw record per run; all downstream
//! computation (sorting, statistics, fingerprinting) reads this shape only.

use serde::{Deserialize, Serialize};

/// Title substituted when a record carries no title property
pub const UNTITLED: &str = "untitled";

/// Display name substituted when a person reference cannot be resolved,
/// and the assignee bucket for items with no assignees at all
pub const UNASSIGNED: &str = "unassigned";

/// Status label substituted when a record carries neither a detailed nor a
/// simple status property
pub const STATUS_WAITING: &str = "waiting";

/// Statistics bucket for items missing a value in a single-valued dimension
pub const UNSPECIFIED: &str = "unspecified";

/// Coarse status bucket every free-text status label collapses into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusGroup {
    ToDo,
    InProgress,
    Complete,
}

impl StatusGroup {
    /// All groups, in reporting order
    pub const ALL: [StatusGroup; 3] =
        [StatusGroup::ToDo, StatusGroup::InProgress, StatusGroup::Complete];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusGroup::ToDo => "to_do",
            StatusGroup::InProgress => "in_progress",
            StatusGroup::Complete => "complete",
        }
    }
}

/// Work-item classification, fixed at creation and never revisited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WbsType {
    /// A deliverable-producing unit project
    UnitProject,
    /// Project management / governance overhead
    Management,
}

/// Schedule dates carried through from the source, all optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemDates {
    pub start: Option<String>,
    pub due: Option<String>,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

/// One normalized WBS record
///
/// Invariants:
/// - `id` is non-empty and immutable once assigned
/// - `status_group` is always one of the three groups, never a raw label
/// - `progress` (and `budget_rate` when present) lie in [0, 100], rounded
///   to 1 decimal
/// - `assignees` is an empty list, not null, when unassigned
///
/// Field order is load-bearing for the change detector: serialization order
/// must stay deterministic across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalItem {
    pub id: String,
    pub url: Option<String>,
    pub title: String,
    /// Dotted alphanumeric WBS code (e.g. "2.10.a"), display ordering only
    pub code: Option<String>,
    pub wbs_type: WbsType,
    pub area: Option<String>,
    pub sub_area: Option<String>,
    pub phase: Option<String>,
    pub priority: Option<String>,
    pub risk_level: Option<String>,
    pub detail_status: Option<String>,
    /// Effective status in the source's vocabulary
    pub status_label: String,
    pub status_group: StatusGroup,
    pub assignees: Vec<String>,
    pub progress: f64,
    pub budget_rate: Option<f64>,
    pub weight: Option<f64>,
    pub dates: ItemDates,
    pub description: Option<String>,
    pub last_edited: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_group_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(StatusGroup::InProgress).unwrap(),
            serde_json::json!("in_progress")
        );
        assert_eq!(
            serde_json::to_value(WbsType::UnitProject).unwrap(),
            serde_json::json!("unit_project")
        );
    }

    #[test]
    fn status_group_as_str_matches_serde() {
        for group in StatusGroup::ALL {
            assert_eq!(
                serde_json::to_value(group).unwrap(),
                serde_json::json!(group.as_str())
            );
        }
    }
}

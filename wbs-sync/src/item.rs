//! Item builder
//!
//! Assembles one canonical WBS item from a raw record's normalized
//! properties. Side-effect free, and never fails: malformed or missing
//! input degrades to sentinels so one bad field cannot drop a record from
//! the run.

use crate::normalize::Properties;
use crate::notion::types::RawPage;
use wbs_common::config::{PeopleDirectory, StatusPartition};
use wbs_common::model::{CanonicalItem, ItemDates, WbsType, STATUS_WAITING, UNTITLED};

// Source property bindings
const PROP_TITLE: &str = "Task";
const PROP_CODE: &str = "WBS Code";
const PROP_AREA: &str = "Area";
const PROP_SUB_AREA: &str = "Sub Area";
const PROP_PHASE: &str = "Phase";
const PROP_PRIORITY: &str = "Priority";
const PROP_RISK_LEVEL: &str = "Risk Level";
const PROP_STATUS: &str = "Status";
const PROP_DETAIL_STATUS: &str = "Detail Status";
const PROP_ACTUAL_PROGRESS: &str = "Actual Progress";
const PROP_AUTO_PROGRESS: &str = "Computed Progress";
const PROP_BUDGET_RATE: &str = "Budget Rate";
const PROP_WEIGHT: &str = "Weight";
const PROP_ASSIGNEES: &str = "Assignees";
const PROP_START_DATE: &str = "Start";
const PROP_DUE_DATE: &str = "Due";
const PROP_EXPECTED_DATE: &str = "Expected";
const PROP_ACTUAL_DATE: &str = "Actual";
const PROP_DESCRIPTION: &str = "Description";

/// Builds canonical items from raw records
///
/// The people directory, status partition, and management category set are
/// injected at construction, never read from process-wide state.
pub struct ItemBuilder<'a> {
    people: &'a PeopleDirectory,
    status_groups: &'a StatusPartition,
    management_categories: &'a [String],
}

impl<'a> ItemBuilder<'a> {
    pub fn new(
        people: &'a PeopleDirectory,
        status_groups: &'a StatusPartition,
        management_categories: &'a [String],
    ) -> Self {
        Self {
            people,
            status_groups,
            management_categories,
        }
    }

    /// Build one canonical item, inferring the WBS type from the record's
    /// top-level area against the configured management set
    pub fn build_inferred(&self, page: &RawPage) -> CanonicalItem {
        let props = Properties::new(page, self.people);
        let wbs_type = self.infer_wbs_type(props.text(PROP_AREA).as_deref());
        self.build(page, wbs_type)
    }

    /// Build one canonical item with a fixed WBS type
    pub fn build(&self, page: &RawPage, wbs_type: WbsType) -> CanonicalItem {
        let props = Properties::new(page, self.people);

        // Prefer the explicit actual-progress field over the computed one
        let progress = props
            .number(PROP_ACTUAL_PROGRESS)
            .or_else(|| props.number(PROP_AUTO_PROGRESS))
            .map(scale_percent)
            .unwrap_or(0.0);
        let budget_rate = props.number(PROP_BUDGET_RATE).map(scale_percent);
        let weight = props.number(PROP_WEIGHT).filter(|w| *w >= 0.0);

        // Detailed free-text status wins over the simple status field
        let detail_status = props.text(PROP_DETAIL_STATUS);
        let status_label = detail_status
            .clone()
            .or_else(|| props.text(PROP_STATUS))
            .unwrap_or_else(|| STATUS_WAITING.to_string());
        let status_group = self.status_groups.classify(&status_label);

        let priority = props
            .text(PROP_PRIORITY)
            .or_else(|| weight.map(|w| priority_tier(w).to_string()));

        CanonicalItem {
            id: page.id.clone(),
            url: page.url.clone(),
            title: props.text(PROP_TITLE).unwrap_or_else(|| UNTITLED.to_string()),
            code: props.text(PROP_CODE),
            wbs_type,
            area: props.text(PROP_AREA),
            sub_area: props.text(PROP_SUB_AREA),
            phase: props.text(PROP_PHASE),
            priority,
            risk_level: props.text(PROP_RISK_LEVEL),
            detail_status,
            status_label,
            status_group,
            assignees: props.people(PROP_ASSIGNEES),
            progress,
            budget_rate,
            weight,
            dates: ItemDates {
                start: props.date_start(PROP_START_DATE),
                due: props.date_start(PROP_DUE_DATE),
                expected: props.date_start(PROP_EXPECTED_DATE),
                actual: props.date_start(PROP_ACTUAL_DATE),
            },
            description: props.text(PROP_DESCRIPTION),
            last_edited: page.last_edited_time.clone(),
        }
    }

    fn infer_wbs_type(&self, area: Option<&str>) -> WbsType {
        match area {
            Some(area) if self.management_categories.iter().any(|c| c == area) => {
                WbsType::Management
            }
            _ => WbsType::UnitProject,
        }
    }
}

/// Normalize a progress-like number to a percentage in [0, 100]
///
/// Values in (0, 1] are fractions and scale by 100; values above 1 are
/// already percentages. Zero reads as plain 0% either way. Rounded to one
/// decimal after clamping.
pub fn scale_percent(value: f64) -> f64 {
    let percent = if value > 0.0 && value <= 1.0 {
        value * 100.0
    } else {
        value
    };
    round1(percent.clamp(0.0, 100.0))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Tier a weight/importance score into a priority label
pub fn priority_tier(weight: f64) -> &'static str {
    if weight >= 15.0 {
        "P0"
    } else if weight >= 10.0 {
        "P1"
    } else if weight >= 5.0 {
        "P2"
    } else {
        "P3"
    }
}

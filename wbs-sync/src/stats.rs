//! Statistics aggregation
//!
//! Folds a collection of canonical items into grouped counts and
//! average-progress breakdowns. The accumulator is an explicit value type
//! with an empty identity and a merge operation, so the fold is a plain
//! sequential pass today and can become a parallel partial-aggregate merge
//! without touching the arithmetic.

use serde::Serialize;
use std::collections::BTreeMap;
use wbs_common::model::{CanonicalItem, StatusGroup, WbsType, UNASSIGNED, UNSPECIFIED};

/// Counts per coarse status group; the three always sum to the item total
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusGroupCounts {
    pub to_do: usize,
    pub in_progress: usize,
    pub complete: usize,
}

impl StatusGroupCounts {
    fn bump(&mut self, group: StatusGroup) {
        match group {
            StatusGroup::ToDo => self.to_do += 1,
            StatusGroup::InProgress => self.in_progress += 1,
            StatusGroup::Complete => self.complete += 1,
        }
    }

    fn merge(&mut self, other: Self) {
        self.to_do += other.to_do;
        self.in_progress += other.in_progress;
        self.complete += other.complete;
    }

    pub fn total(&self) -> usize {
        self.to_do + self.in_progress + self.complete
    }
}

/// Finished per-bucket statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketStats {
    pub count: usize,
    pub average_progress: f64,
}

/// Running (count, progress sum) pair for one dimension value
#[derive(Debug, Clone, Copy, Default)]
struct Bucket {
    count: usize,
    progress_sum: f64,
}

impl Bucket {
    fn add(&mut self, progress: f64) {
        self.count += 1;
        self.progress_sum += progress;
    }

    fn merge(&mut self, other: Self) {
        self.count += other.count;
        self.progress_sum += other.progress_sum;
    }

    fn finish(self) -> BucketStats {
        BucketStats {
            count: self.count,
            average_progress: if self.count > 0 {
                round1(self.progress_sum / self.count as f64)
            } else {
                0.0
            },
        }
    }
}

type Dimension = BTreeMap<String, Bucket>;

fn bump_dimension(dimension: &mut Dimension, value: &str, progress: f64) {
    dimension.entry(value.to_string()).or_default().add(progress);
}

fn merge_dimension(dimension: &mut Dimension, other: Dimension) {
    for (value, bucket) in other {
        dimension.entry(value).or_default().merge(bucket);
    }
}

fn finish_dimension(dimension: Dimension) -> BTreeMap<String, BucketStats> {
    dimension
        .into_iter()
        .map(|(value, bucket)| (value, bucket.finish()))
        .collect()
}

/// Accumulator for one statistics pass
///
/// `default()` is the empty identity; `add` folds one item; `merge` combines
/// partial aggregates. Every item lands in exactly one bucket per
/// single-valued dimension (missing values fold into `"unspecified"`) and in
/// one assignee bucket per assignee, or `"unassigned"` once when it has
/// none.
#[derive(Debug, Clone, Default)]
pub struct StatsAccumulator {
    total: usize,
    status_groups: StatusGroupCounts,
    progress_sum: f64,
    weighted_progress_sum: f64,
    weight_sum: f64,
    by_area: Dimension,
    by_status: Dimension,
    by_priority: Dimension,
    by_assignee: Dimension,
    by_phase: Dimension,
    by_risk_level: Dimension,
}

impl StatsAccumulator {
    pub fn add(&mut self, item: &CanonicalItem) {
        self.total += 1;
        self.status_groups.bump(item.status_group);
        self.progress_sum += item.progress;
        if let Some(weight) = item.weight {
            if weight > 0.0 {
                self.weight_sum += weight;
                self.weighted_progress_sum += weight * item.progress;
            }
        }

        let single_valued = [
            (&mut self.by_area, item.area.as_deref()),
            (&mut self.by_priority, item.priority.as_deref()),
            (&mut self.by_phase, item.phase.as_deref()),
            (&mut self.by_risk_level, item.risk_level.as_deref()),
        ];
        for (dimension, value) in single_valued {
            bump_dimension(dimension, value.unwrap_or(UNSPECIFIED), item.progress);
        }
        bump_dimension(&mut self.by_status, &item.status_label, item.progress);

        if item.assignees.is_empty() {
            bump_dimension(&mut self.by_assignee, UNASSIGNED, item.progress);
        } else {
            for assignee in &item.assignees {
                bump_dimension(&mut self.by_assignee, assignee, item.progress);
            }
        }
    }

    pub fn merge(&mut self, other: Self) {
        self.total += other.total;
        self.status_groups.merge(other.status_groups);
        self.progress_sum += other.progress_sum;
        self.weighted_progress_sum += other.weighted_progress_sum;
        self.weight_sum += other.weight_sum;
        merge_dimension(&mut self.by_area, other.by_area);
        merge_dimension(&mut self.by_status, other.by_status);
        merge_dimension(&mut self.by_priority, other.by_priority);
        merge_dimension(&mut self.by_assignee, other.by_assignee);
        merge_dimension(&mut self.by_phase, other.by_phase);
        merge_dimension(&mut self.by_risk_level, other.by_risk_level);
    }

    pub fn finish(self) -> StatisticsSnapshot {
        // Weighted mean over weighted items when any weight is present,
        // simple mean otherwise; empty input averages to 0
        let average_progress = if self.weight_sum > 0.0 {
            round1(self.weighted_progress_sum / self.weight_sum)
        } else if self.total > 0 {
            round1(self.progress_sum / self.total as f64)
        } else {
            0.0
        };

        StatisticsSnapshot {
            total: self.total,
            status_groups: self.status_groups,
            average_progress,
            by_area: finish_dimension(self.by_area),
            by_status: finish_dimension(self.by_status),
            by_priority: finish_dimension(self.by_priority),
            by_assignee: finish_dimension(self.by_assignee),
            by_phase: finish_dimension(self.by_phase),
            by_risk_level: finish_dimension(self.by_risk_level),
        }
    }
}

/// Derived, per-run statistics over one item collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsSnapshot {
    pub total: usize,
    pub status_groups: StatusGroupCounts,
    pub average_progress: f64,
    pub by_area: BTreeMap<String, BucketStats>,
    pub by_status: BTreeMap<String, BucketStats>,
    pub by_priority: BTreeMap<String, BucketStats>,
    pub by_assignee: BTreeMap<String, BucketStats>,
    pub by_phase: BTreeMap<String, BucketStats>,
    pub by_risk_level: BTreeMap<String, BucketStats>,
}

/// Aggregate statistics over the full collection
pub fn aggregate(items: &[CanonicalItem]) -> StatisticsSnapshot {
    let mut accumulator = StatsAccumulator::default();
    for item in items {
        accumulator.add(item);
    }
    accumulator.finish()
}

/// Aggregate statistics over one WBS type's slice of the collection
pub fn aggregate_for(items: &[CanonicalItem], wbs_type: WbsType) -> StatisticsSnapshot {
    let mut accumulator = StatsAccumulator::default();
    for item in items.iter().filter(|i| i.wbs_type == wbs_type) {
        accumulator.add(item);
    }
    accumulator.finish()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use wbs_common::model::{ItemDates, StatusGroup, WbsType};

    fn item(id: &str, progress: f64) -> CanonicalItem {
        CanonicalItem {
            id: id.to_string(),
            url: None,
            title: format!("Item {}", id),
            code: None,
            wbs_type: WbsType::UnitProject,
            area: None,
            sub_area: None,
            phase: None,
            priority: None,
            risk_level: None,
            detail_status: None,
            status_label: "In progress".to_string(),
            status_group: StatusGroup::InProgress,
            assignees: Vec::new(),
            progress,
            budget_rate: None,
            weight: None,
            dates: ItemDates::default(),
            description: None,
            last_edited: None,
        }
    }

    #[test]
    fn status_group_counts_sum_to_total() {
        let mut items = vec![item("a", 0.0), item("b", 50.0), item("c", 100.0)];
        items[0].status_group = StatusGroup::ToDo;
        items[2].status_group = StatusGroup::Complete;

        let stats = aggregate(&items);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.status_groups.total(), stats.total);
        assert_eq!(stats.status_groups.to_do, 1);
        assert_eq!(stats.status_groups.in_progress, 1);
        assert_eq!(stats.status_groups.complete, 1);
    }

    #[test]
    fn simple_mean_when_no_item_is_weighted() {
        let items = vec![item("a", 30.0), item("b", 60.0)];
        assert_eq!(aggregate(&items).average_progress, 45.0);
    }

    #[test]
    fn weighted_mean_restricted_to_weighted_items() {
        let mut items = vec![item("a", 100.0), item("b", 0.0), item("c", 50.0)];
        items[0].weight = Some(3.0);
        items[1].weight = Some(1.0);
        // item c has no weight and must not contribute

        let stats = aggregate(&items);
        assert_eq!(stats.average_progress, 75.0);
    }

    #[test]
    fn zero_weight_does_not_trigger_weighted_mode() {
        let mut items = vec![item("a", 30.0), item("b", 60.0)];
        items[0].weight = Some(0.0);
        assert_eq!(aggregate(&items).average_progress, 45.0);
    }

    #[test]
    fn empty_collection_averages_to_zero() {
        let stats = aggregate(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_progress, 0.0);
        assert!(stats.by_area.is_empty());
    }

    #[test]
    fn unassigned_bucket_counts_once_per_item() {
        let mut items = vec![item("a", 10.0), item("b", 20.0), item("c", 30.0)];
        items[1].assignees = vec!["Jane Doe".to_string(), "John Roe".to_string()];

        let stats = aggregate(&items);
        assert_eq!(stats.by_assignee[UNASSIGNED].count, 2);
        assert_eq!(stats.by_assignee["Jane Doe"].count, 1);
        assert_eq!(stats.by_assignee["John Roe"].count, 1);

        // Multi-assignee items count once per assignee, so the assignee
        // dimension sums to >= total while single-valued dimensions sum
        // to exactly total
        let assignee_sum: usize = stats.by_assignee.values().map(|b| b.count).sum();
        assert!(assignee_sum >= stats.total);
        let area_sum: usize = stats.by_area.values().map(|b| b.count).sum();
        assert_eq!(area_sum, stats.total);
    }

    #[test]
    fn missing_dimension_values_fold_into_unspecified() {
        let mut items = vec![item("a", 40.0), item("b", 80.0)];
        items[0].area = Some("Mobility".to_string());

        let stats = aggregate(&items);
        assert_eq!(stats.by_area["Mobility"].count, 1);
        assert_eq!(stats.by_area["Mobility"].average_progress, 40.0);
        assert_eq!(stats.by_area[UNSPECIFIED].count, 1);
        assert_eq!(stats.by_area[UNSPECIFIED].average_progress, 80.0);
    }

    #[test]
    fn per_bucket_average_is_sum_over_count() {
        let mut items = vec![item("a", 20.0), item("b", 30.0), item("c", 100.0)];
        for i in &mut items[..2] {
            i.area = Some("WiFi".to_string());
        }
        items[2].area = Some("Metaverse".to_string());

        let stats = aggregate(&items);
        assert_eq!(stats.by_area["WiFi"].count, 2);
        assert_eq!(stats.by_area["WiFi"].average_progress, 25.0);
        assert_eq!(stats.by_area["Metaverse"].average_progress, 100.0);
    }

    #[test]
    fn merge_of_partial_aggregates_matches_single_pass() {
        let mut items: Vec<CanonicalItem> = (0..10)
            .map(|i| item(&format!("item-{}", i), (i * 10) as f64))
            .collect();
        items[3].weight = Some(2.0);
        items[7].assignees = vec!["Jane Doe".to_string()];
        items[8].area = Some("Mobility".to_string());

        let single = aggregate(&items);

        let (left, right) = items.split_at(4);
        let mut partial_left = StatsAccumulator::default();
        left.iter().for_each(|i| partial_left.add(i));
        let mut partial_right = StatsAccumulator::default();
        right.iter().for_each(|i| partial_right.add(i));
        partial_left.merge(partial_right);

        assert_eq!(partial_left.finish(), single);
    }

    #[test]
    fn aggregate_for_filters_by_wbs_type() {
        let mut items = vec![item("a", 10.0), item("b", 90.0)];
        items[1].wbs_type = WbsType::Management;

        let unit = aggregate_for(&items, WbsType::UnitProject);
        let management = aggregate_for(&items, WbsType::Management);
        assert_eq!(unit.total, 1);
        assert_eq!(unit.average_progress, 10.0);
        assert_eq!(management.total, 1);
        assert_eq!(management.average_progress, 90.0);
    }
}

//! Grouping and proportional split of parent aggregates.
//!
//! Children are partitioned by `parent_id` in first-seen order, each group's total weight
//! is computed, and every child receives `aggregate * weight / total_weight`. Groups that
//! cannot be allocated are left out of the results and described by an [`Omission`].

use crate::built_in::proportional_allocator::ProportionalAllocatorCalculator;
use crate::calculator::Calculator;
use crate::error::AllocationError;
use cdgdp_types::{AllocationResult, ChildUnit, ParentAggregates};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Why a parent group produced no rows
#[derive(Debug, Clone, PartialEq)]
pub enum OmissionReason {
    /// The parent has no entry, or an entry without a value
    UnknownParent,
    /// The group's weights sum to zero or less
    NonPositiveTotalWeight { total_weight: f64 },
    /// The group holds structurally invalid input
    Rejected(AllocationError),
}

impl OmissionReason {
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

impl fmt::Display for OmissionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownParent => write!(f, "no aggregate value for parent"),
            Self::NonPositiveTotalWeight { total_weight } => {
                write!(f, "total group weight {total_weight} is not positive")
            }
            Self::Rejected(err) => write!(f, "rejected: {err}"),
        }
    }
}

/// A parent group left out of the results
#[derive(Debug, Clone, PartialEq)]
pub struct Omission {
    pub parent_id: String,
    pub child_count: usize,
    pub reason: OmissionReason,
}

/// Results of one allocation pass, plus everything that was dropped on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationReport {
    /// Allocated rows, grouped by parent in first-seen order
    pub results: Vec<AllocationResult>,
    /// One entry per parent group that produced no rows
    pub omissions: Vec<Omission>,
    /// Children dropped because their `(child_id, parent_id)` was already seen
    pub duplicates_dropped: usize,
}

impl AllocationReport {
    pub fn rejections(&self) -> impl Iterator<Item = &Omission> {
        self.omissions.iter().filter(|o| o.reason.is_rejection())
    }

    pub fn into_results(self) -> Vec<AllocationResult> {
        self.results
    }
}

struct Group<'a> {
    parent_id: &'a str,
    children: Vec<&'a ChildUnit>,
}

/// Splits parent aggregates across child units using a [`Calculator`].
///
/// Duplicate `(child_id, parent_id)` pairs are tolerated: the first occurrence is kept
/// and later ones are dropped, so callers need not deduplicate beforehand.
#[derive(Debug, Clone, Default)]
pub struct Allocator<C: Calculator = ProportionalAllocatorCalculator> {
    calculator: C,
}

impl Allocator {
    pub fn new() -> Self {
        Self { calculator: ProportionalAllocatorCalculator }
    }
}

impl<C: Calculator> Allocator<C> {
    pub fn with_calculator(calculator: C) -> Self {
        Self { calculator }
    }

    pub fn calculator(&self) -> &C {
        &self.calculator
    }

    /// Allocates and returns only the retained rows.
    pub fn allocate(
        &self,
        parents: &ParentAggregates,
        children: &[ChildUnit],
    ) -> Vec<AllocationResult> {
        self.allocate_with_report(parents, children).into_results()
    }

    /// Allocates and also reports every omitted group and dropped duplicate.
    pub fn allocate_with_report(
        &self,
        parents: &ParentAggregates,
        children: &[ChildUnit],
    ) -> AllocationReport {
        let (groups, duplicates_dropped) = group_by_parent(children);
        let mut report = AllocationReport { duplicates_dropped, ..AllocationReport::default() };

        for group in groups {
            let Some(aggregate) = parents.get(group.parent_id) else {
                report.omissions.push(Omission {
                    parent_id: group.parent_id.to_string(),
                    child_count: group.children.len(),
                    reason: OmissionReason::UnknownParent,
                });
                continue;
            };

            match self.allocate_group(aggregate, &group) {
                Ok(rows) => report.results.extend(rows),
                Err(reason) => report.omissions.push(Omission {
                    parent_id: group.parent_id.to_string(),
                    child_count: group.children.len(),
                    reason,
                }),
            }
        }

        report
    }

    fn allocate_group(
        &self,
        aggregate: f64,
        group: &Group<'_>,
    ) -> Result<Vec<AllocationResult>, OmissionReason> {
        if !aggregate.is_finite() {
            return Err(OmissionReason::Rejected(AllocationError::NonFiniteAggregate {
                value: aggregate,
            }));
        }

        if let Some(bad) = group.children.iter().find(|c| !(c.weight.is_finite() && c.weight >= 0.0)) {
            return Err(OmissionReason::Rejected(AllocationError::InvalidWeight {
                child_id: bad.child_id.clone(),
                weight: bad.weight,
            }));
        }

        let total_weight: f64 = group.children.iter().map(|c| c.weight).sum();
        if !total_weight.is_finite() {
            return Err(OmissionReason::Rejected(AllocationError::NonFiniteTotalWeight {
                total_weight,
            }));
        }
        if total_weight <= 0.0 {
            return Err(OmissionReason::NonPositiveTotalWeight { total_weight });
        }

        group
            .children
            .iter()
            .map(|child| {
                let allocated_value = self
                    .calculator
                    .calculate(aggregate, child.weight, total_weight)
                    .map_err(OmissionReason::Rejected)?;
                Ok(AllocationResult {
                    child_id: child.child_id.clone(),
                    parent_id: child.parent_id.clone(),
                    weight: child.weight,
                    allocated_value,
                })
            })
            .collect()
    }
}

/// Partitions children by parent, keeping first-seen order of parents and of children
/// within each parent. Returns the groups and the number of duplicates dropped.
fn group_by_parent(children: &[ChildUnit]) -> (Vec<Group<'_>>, usize) {
    let mut groups: Vec<Group<'_>> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut seen: HashSet<(&str, &str)> = HashSet::with_capacity(children.len());
    let mut duplicates = 0;

    for child in children {
        if !seen.insert(child.key()) {
            duplicates += 1;
            continue;
        }
        let slot = *slots.entry(child.parent_id.as_str()).or_insert_with(|| {
            groups.push(Group { parent_id: &child.parent_id, children: Vec::new() });
            groups.len() - 1
        });
        groups[slot].children.push(child);
    }

    (groups, duplicates)
}

/// Allocates with the default proportional calculator.
pub fn allocate(parents: &ParentAggregates, children: &[ChildUnit]) -> Vec<AllocationResult> {
    Allocator::new().allocate(parents, children)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(child: &str, parent: &str, weight: f64) -> ChildUnit {
        ChildUnit::new(child, parent, weight)
    }

    #[test]
    fn groups_preserve_first_seen_order() {
        let children = vec![
            unit("a", "13", 1.0),
            unit("c", "12", 1.0),
            unit("b", "13", 1.0),
        ];
        let (groups, duplicates) = group_by_parent(&children);

        assert_eq!(duplicates, 0);
        let parents: Vec<&str> = groups.iter().map(|g| g.parent_id).collect();
        assert_eq!(parents, vec!["13", "12"]);
        let first: Vec<&str> = groups[0].children.iter().map(|c| c.child_id.as_str()).collect();
        assert_eq!(first, vec!["a", "b"]);
    }

    #[test]
    fn duplicate_keys_keep_first_occurrence() {
        let children = vec![
            unit("a", "13", 3.0),
            unit("a", "13", 100.0),
            unit("a", "12", 1.0),
        ];
        let (groups, duplicates) = group_by_parent(&children);

        assert_eq!(duplicates, 1);
        assert_eq!(groups[0].children.len(), 1);
        assert_eq!(groups[0].children[0].weight, 3.0);
        assert_eq!(groups[1].parent_id, "12");
    }

    #[test]
    fn negative_weight_rejects_only_its_group() {
        let parents: ParentAggregates = [("13", 10.0), ("12", 20.0)].into_iter().collect();
        let children = vec![unit("a", "13", -1.0), unit("b", "13", 3.0), unit("c", "12", 1.0)];

        let report = Allocator::new().allocate_with_report(&parents, &children);

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].child_id, "c");
        assert_eq!(report.omissions.len(), 1);
        assert_eq!(
            report.omissions[0].reason,
            OmissionReason::Rejected(AllocationError::InvalidWeight {
                child_id: "a".to_string(),
                weight: -1.0,
            })
        );
        assert_eq!(report.rejections().count(), 1);
    }

    #[test]
    fn non_finite_aggregate_is_rejected() {
        let parents: ParentAggregates = [("35", f64::NAN)].into_iter().collect();
        let report = Allocator::new().allocate_with_report(&parents, &[unit("a", "35", 1.0)]);

        assert!(report.results.is_empty());
        assert!(matches!(
            report.omissions[0].reason,
            OmissionReason::Rejected(AllocationError::NonFiniteAggregate { .. })
        ));
    }

    #[test]
    fn overflowing_total_weight_is_rejected() {
        let parents: ParentAggregates = [("35", 1.0)].into_iter().collect();
        let children = vec![unit("a", "35", f64::MAX), unit("b", "35", f64::MAX)];
        let report = Allocator::new().allocate_with_report(&parents, &children);

        assert!(report.results.is_empty());
        assert!(matches!(
            report.omissions[0].reason,
            OmissionReason::Rejected(AllocationError::NonFiniteTotalWeight { .. })
        ));
    }

    #[test]
    fn unknown_value_is_treated_as_missing() {
        let mut parents = ParentAggregates::new();
        parents.insert_unknown("60");
        let report = Allocator::new().allocate_with_report(&parents, &[unit("y", "60", 1.0)]);

        assert!(report.results.is_empty());
        assert_eq!(report.omissions[0].reason, OmissionReason::UnknownParent);
        assert_eq!(report.omissions[0].child_count, 1);
    }

    #[test]
    fn omission_reasons_display() {
        assert_eq!(OmissionReason::UnknownParent.to_string(), "no aggregate value for parent");
        assert_eq!(
            OmissionReason::NonPositiveTotalWeight { total_weight: 0.0 }.to_string(),
            "total group weight 0 is not positive"
        );
    }
}

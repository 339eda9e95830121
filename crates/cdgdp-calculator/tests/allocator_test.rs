use cdgdp_calculator::{Allocator, OmissionReason, allocate};
use cdgdp_types::{AllocationResult, ChildUnit, ParentAggregates};
use proptest::prelude::*;
use std::collections::HashMap;

fn unit(child: &str, parent: &str, weight: f64) -> ChildUnit {
    ChildUnit::new(child, parent, weight)
}

fn formatted(results: &[AllocationResult]) -> Vec<(String, String)> {
    results.iter().map(|r| (r.child_id.clone(), format!("{:.3}", r.allocated_value))).collect()
}

fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected.iter().map(|(c, v)| (c.to_string(), v.to_string())).collect()
}

#[test]
fn splits_ontario_by_population() {
    let parents: ParentAggregates = [("35", 900_000.0)].into_iter().collect();
    let children = vec![unit("A", "35", 2.0), unit("B", "35", 1.0), unit("C", "35", 1.0)];

    let results = allocate(&parents, &children);

    assert_eq!(
        formatted(&results),
        pairs(&[("A", "450000.000"), ("B", "225000.000"), ("C", "225000.000")])
    );
}

#[test]
fn all_zero_weights_produce_no_rows() {
    let parents: ParentAggregates = [("24", 500_000.0)].into_iter().collect();
    let children = vec![unit("X", "24", 0.0), unit("Y", "24", 0.0)];

    let report = Allocator::new().allocate_with_report(&parents, &children);

    assert!(report.results.is_empty());
    assert_eq!(report.omissions.len(), 1);
    assert_eq!(
        report.omissions[0].reason,
        OmissionReason::NonPositiveTotalWeight { total_weight: 0.0 }
    );
}

#[test]
fn unknown_parent_produces_no_rows() {
    let parents = ParentAggregates::new();
    let children = vec![unit("Z", "99", 5.0)];

    let report = Allocator::new().allocate_with_report(&parents, &children);

    assert!(report.results.is_empty());
    assert_eq!(report.omissions[0].parent_id, "99");
    assert_eq!(report.omissions[0].reason, OmissionReason::UnknownParent);
}

#[test]
fn single_child_receives_whole_aggregate() {
    let parents: ParentAggregates = [("48", 100.0)].into_iter().collect();
    let results = allocate(&parents, &[unit("Solo", "48", 1.0)]);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].allocated_value, 100.0);
    assert_eq!(formatted(&results), pairs(&[("Solo", "100.000")]));
}

#[test]
fn independent_groups_keep_first_seen_order() {
    let parents: ParentAggregates = [("13", 1000.0), ("12", 2000.0)].into_iter().collect();
    let children = vec![unit("a", "13", 3.0), unit("b", "13", 1.0), unit("c", "12", 1.0)];

    let results = allocate(&parents, &children);

    assert_eq!(
        formatted(&results),
        pairs(&[("a", "750.000"), ("b", "250.000"), ("c", "2000.000")])
    );
    assert_eq!(results[2].parent_id, "12");
    assert_eq!(results[0].weight, 3.0);
}

#[test]
fn zero_weight_child_gets_zero_in_positive_group() {
    let parents: ParentAggregates = [("59", 300.0)].into_iter().collect();
    let children = vec![unit("p", "59", 0.0), unit("q", "59", 2.0)];

    let results = allocate(&parents, &children);

    assert_eq!(formatted(&results), pairs(&[("p", "0.000"), ("q", "300.000")]));
}

#[test]
fn mixed_known_and_unknown_parents() {
    let parents: ParentAggregates = [("10", 50.0)].into_iter().collect();
    let children = vec![unit("x", "99", 1.0), unit("y", "10", 1.0), unit("z", "99", 1.0)];

    let report = Allocator::new().allocate_with_report(&parents, &children);

    assert_eq!(formatted(&report.results), pairs(&[("y", "50.000")]));
    assert_eq!(report.omissions.len(), 1);
    assert_eq!(report.omissions[0].child_count, 2);
}

fn arb_children() -> impl Strategy<Value = Vec<ChildUnit>> {
    prop::collection::vec((0u8..40, 0u8..6, 0.0f64..1.0e7), 0..60).prop_map(|rows| {
        rows.into_iter()
            .map(|(child, parent, weight)| {
                // Some zero weights so that all-zero groups show up.
                let weight = if weight < 1.0e6 { 0.0 } else { weight };
                ChildUnit::new(format!("cd{child}"), format!("p{parent}"), weight)
            })
            .collect()
    })
}

fn arb_parents() -> impl Strategy<Value = ParentAggregates> {
    prop::collection::vec((0u8..8, 1.0f64..1.0e9), 0..8)
        .prop_map(|rows| rows.into_iter().map(|(p, v)| (format!("p{p}"), v)).collect())
}

proptest! {
    #[test]
    fn conservation_holds_per_parent(parents in arb_parents(), children in arb_children()) {
        let results = allocate(&parents, &children);

        let mut sums: HashMap<&str, f64> = HashMap::new();
        for row in &results {
            *sums.entry(row.parent_id.as_str()).or_default() += row.allocated_value;
        }
        for (parent_id, sum) in sums {
            let aggregate = parents.get(parent_id).unwrap();
            prop_assert!(((sum - aggregate) / aggregate).abs() <= 1e-6);
        }
    }

    #[test]
    fn values_are_proportional_to_weight(parents in arb_parents(), children in arb_children()) {
        let results = allocate(&parents, &children);

        let mut totals: HashMap<&str, f64> = HashMap::new();
        for row in &results {
            *totals.entry(row.parent_id.as_str()).or_default() += row.weight;
        }
        for row in &results {
            let aggregate = parents.get(&row.parent_id).unwrap();
            let expected_share = row.weight / totals[row.parent_id.as_str()];
            prop_assert!((row.allocated_value / aggregate - expected_share).abs() <= 1e-9);
        }
    }

    #[test]
    fn rows_only_for_known_parents_with_weight(parents in arb_parents(), children in arb_children()) {
        let results = allocate(&parents, &children);

        for row in &results {
            prop_assert!(parents.get(&row.parent_id).is_some());
            let group_weight: f64 = children
                .iter()
                .filter(|c| c.parent_id == row.parent_id)
                .map(|c| c.weight)
                .sum();
            prop_assert!(group_weight > 0.0);
        }
    }

    #[test]
    fn allocation_is_deterministic(parents in arb_parents(), children in arb_children()) {
        prop_assert_eq!(allocate(&parents, &children), allocate(&parents, &children));
    }
}

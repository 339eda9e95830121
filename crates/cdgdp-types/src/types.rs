use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A sub-provincial unit (a census division) and the weight it carries inside its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildUnit {
    /// Unique identifier of the unit, e.g. the census division UID `3520`
    pub child_id: String,
    /// Identifier of the parent aggregate; it does not have to exist in the aggregates
    pub parent_id: String,
    /// Non-negative weight, typically a population count or a uniform placeholder of 1
    pub weight: f64,
}

impl ChildUnit {
    /// Creates a new child unit.
    pub fn new(child_id: impl Into<String>, parent_id: impl Into<String>, weight: f64) -> Self {
        Self { child_id: child_id.into(), parent_id: parent_id.into(), weight }
    }

    /// The deduplication key `(child_id, parent_id)`
    #[must_use]
    pub fn key(&self) -> (&str, &str) {
        (&self.child_id, &self.parent_id)
    }
}

/// One allocated row: a child unit enriched with its share of the parent aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    /// Identifier of the child unit
    pub child_id: String,
    /// Identifier of the parent aggregate the value was taken from
    pub parent_id: String,
    /// Weight the share was computed from
    pub weight: f64,
    /// `parent aggregate * weight / total group weight`, at full precision
    pub allocated_value: f64,
}

/// Parent aggregate values keyed by parent identifier.
///
/// A parent may be present with an unknown value; [`ParentAggregates::get`] treats that
/// the same as an absent parent. Iteration follows first insertion order, and
/// re-inserting a key overwrites the value in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<(String, Option<f64>)>", into = "Vec<(String, Option<f64>)>")]
pub struct ParentAggregates {
    entries: Vec<(String, Option<f64>)>,
    index: HashMap<String, usize>,
}

impl ParentAggregates {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the aggregate value of `parent_id`.
    pub fn insert(&mut self, parent_id: impl Into<String>, value: f64) {
        self.set(parent_id.into(), Some(value));
    }

    /// Records `parent_id` as present but without a usable value.
    pub fn insert_unknown(&mut self, parent_id: impl Into<String>) {
        self.set(parent_id.into(), None);
    }

    fn set(&mut self, parent_id: String, value: Option<f64>) {
        if let Some(&slot) = self.index.get(&parent_id) {
            self.entries[slot].1 = value;
        } else {
            self.index.insert(parent_id.clone(), self.entries.len());
            self.entries.push((parent_id, value));
        }
    }

    /// The aggregate value of `parent_id`, or `None` when absent or unknown.
    #[must_use]
    pub fn get(&self, parent_id: &str) -> Option<f64> {
        self.index.get(parent_id).and_then(|&slot| self.entries[slot].1)
    }

    /// Whether `parent_id` has an entry, known or not.
    #[must_use]
    pub fn contains(&self, parent_id: &str) -> bool {
        self.index.contains_key(parent_id)
    }

    /// Number of entries, including unknown ones
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries carrying a value
    #[must_use]
    pub fn known_len(&self) -> usize {
        self.entries.iter().filter(|(_, v)| v.is_some()).count()
    }

    /// Iterates entries in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl From<Vec<(String, Option<f64>)>> for ParentAggregates {
    fn from(entries: Vec<(String, Option<f64>)>) -> Self {
        let mut aggregates = Self::new();
        for (parent_id, value) in entries {
            aggregates.set(parent_id, value);
        }
        aggregates
    }
}

impl From<ParentAggregates> for Vec<(String, Option<f64>)> {
    fn from(aggregates: ParentAggregates) -> Self {
        aggregates.entries
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ParentAggregates {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut aggregates = Self::new();
        for (parent_id, value) in iter {
            aggregates.insert(parent_id, value);
        }
        aggregates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_and_absent_both_read_as_none() {
        let mut aggregates = ParentAggregates::new();
        aggregates.insert("35", 900_000.0);
        aggregates.insert_unknown("24");

        assert_eq!(aggregates.get("35"), Some(900_000.0));
        assert_eq!(aggregates.get("24"), None);
        assert_eq!(aggregates.get("99"), None);
        assert!(aggregates.contains("24"));
        assert!(!aggregates.contains("99"));
        assert_eq!(aggregates.len(), 2);
        assert_eq!(aggregates.known_len(), 1);
    }

    #[test]
    fn reinsert_overwrites_in_place() {
        let mut aggregates: ParentAggregates = [("13", 1.0), ("12", 2.0)].into_iter().collect();
        aggregates.insert("13", 5.0);

        let keys: Vec<&str> = aggregates.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["13", "12"]);
        assert_eq!(aggregates.get("13"), Some(5.0));
    }

    #[test]
    fn serde_preserves_order_and_lookup() {
        let mut aggregates = ParentAggregates::new();
        aggregates.insert("48", 100.0);
        aggregates.insert_unknown("60");

        let json = serde_json::to_string(&aggregates).unwrap();
        let back: ParentAggregates = serde_json::from_str(&json).unwrap();
        assert_eq!(back, aggregates);
        assert_eq!(back.get("48"), Some(100.0));
    }

    #[test]
    fn child_key_pairs_ids() {
        let unit = ChildUnit::new("3520", "35", 2_794_356.0);
        assert_eq!(unit.key(), ("3520", "35"));
    }
}

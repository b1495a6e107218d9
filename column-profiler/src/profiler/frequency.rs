//! Exact per-value frequencies carried through merges.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::errors::ProfileResult;
use super::top_n::{rank_order, TopNDataItem};
use super::traits::ProfileState;
use super::types::Value;

/// Exact count of every distinct value of a column, the null sentinel
/// included.
///
/// Distinct and singleton counts of a merged dataset cannot be derived from
/// per-partition scalars (a value seen once in two partitions is seen twice
/// overall), so column profiles carry this table through every merge and
/// recompute uniqueness from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<TopNDataItem>", into = "Vec<TopNDataItem>")]
pub struct FrequencyTable {
    counts: HashMap<Option<Value>, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one occurrence and returns the value's new frequency.
    pub fn observe(&mut self, value: Option<Value>) -> u64 {
        let count = self.counts.entry(value).or_insert(0);
        *count += 1;
        *count
    }

    /// Frequency of `value`, zero if never seen.
    pub fn get(&self, value: &Option<Value>) -> u64 {
        self.counts.get(value).copied().unwrap_or(0)
    }

    /// Number of distinct values, null counted as one value.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of values seen exactly once.
    pub fn singleton_count(&self) -> u64 {
        self.counts.values().filter(|count| **count == 1).count() as u64
    }

    /// Up to `limit` entries in rank order.
    pub fn ranked(&self, limit: usize) -> Vec<TopNDataItem> {
        let mut entries: Vec<(&Option<Value>, u64)> =
            self.counts.iter().map(|(value, count)| (value, *count)).collect();
        if entries.len() > limit {
            entries.select_nth_unstable_by(limit, |(a, a_count), (b, b_count)| {
                rank_order(a, *a_count, b, *b_count)
            });
            entries.truncate(limit);
        }
        entries.sort_unstable_by(|(a, a_count), (b, b_count)| rank_order(a, *a_count, b, *b_count));
        entries
            .into_iter()
            .map(|(value, count)| TopNDataItem::new(value.clone(), count))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Option<Value>, u64)> {
        self.counts.iter().map(|(value, count)| (value, *count))
    }
}

impl ProfileState for FrequencyTable {
    fn merge_from(&mut self, other: &Self) -> ProfileResult<()> {
        self.counts.reserve(other.counts.len());
        for (value, count) in &other.counts {
            *self.counts.entry(value.clone()).or_insert(0) += count;
        }
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl From<Vec<TopNDataItem>> for FrequencyTable {
    fn from(items: Vec<TopNDataItem>) -> Self {
        let mut table = Self::new();
        for item in items {
            *table.counts.entry(item.value).or_insert(0) += item.count;
        }
        table
    }
}

impl From<FrequencyTable> for Vec<TopNDataItem> {
    fn from(table: FrequencyTable) -> Self {
        let mut items: Vec<TopNDataItem> = table
            .counts
            .into_iter()
            .map(|(value, count)| TopNDataItem::new(value, count))
            .collect();
        items.sort_unstable();
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(values: &[Option<&str>]) -> FrequencyTable {
        let mut table = FrequencyTable::new();
        for value in values {
            table.observe(value.map(Value::from));
        }
        table
    }

    #[test]
    fn test_observe_returns_running_frequency() {
        let mut table = FrequencyTable::new();
        assert_eq!(table.observe(Some(Value::from("a"))), 1);
        assert_eq!(table.observe(Some(Value::from("a"))), 2);
        assert_eq!(table.observe(None), 1);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_singletons_and_distinct() {
        let t = table(&[Some("a"), Some("a"), Some("b"), None, Some("c")]);
        assert_eq!(t.len(), 4);
        assert_eq!(t.singleton_count(), 3);
        assert_eq!(t.get(&None), 1);
        assert_eq!(t.get(&Some(Value::from("z"))), 0);
    }

    #[test]
    fn test_merge_recomputes_singletons() {
        let a = table(&[Some("X"), Some("a")]);
        let b = table(&[Some("X"), Some("b")]);
        assert_eq!(a.singleton_count() + b.singleton_count(), 4);

        let merged = a.combine(&b).unwrap();
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get(&Some(Value::from("X"))), 2);
        assert_eq!(merged.singleton_count(), 2);
    }

    #[test]
    fn test_ranked_limits_and_orders() {
        let t = table(&[Some("b"), Some("b"), Some("a"), Some("a"), Some("c"), None, None]);
        let ranked = t.ranked(3);
        assert_eq!(
            ranked,
            vec![
                TopNDataItem::new(Some(Value::from("a")), 2),
                TopNDataItem::new(Some(Value::from("b")), 2),
                TopNDataItem::new(None, 2),
            ]
        );
        assert_eq!(t.ranked(10).len(), 4);
        assert!(t.ranked(0).is_empty());
    }

    #[test]
    fn test_serde_roundtrip() {
        let t = table(&[Some("a"), None, Some("a")]);
        let json = serde_json::to_string(&t).unwrap();
        let back: FrequencyTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}

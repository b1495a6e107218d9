//! Bounded ranking of the most frequent values of a column.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::errors::{ProfileError, ProfileResult};
use super::frequency::FrequencyTable;
use super::traits::ProfileState;
use super::types::Value;

/// Default number of ranked values reported per column.
pub const DEFAULT_TOP_N: usize = 3;

/// Default number of distinct values a tracker holds before evicting.
pub const DEFAULT_HIGH_WATER_MARK: usize = 10_000;

/// One ranked entry: a value (or the null sentinel, `None`) and how often it
/// was seen.
///
/// Items order by rank: higher counts first; among equal counts non-null
/// values come first in ascending value order and the null sentinel last.
/// The rank depends only on `(value, count)`, never on arrival order, so a
/// ranking is the same whatever order partitions were merged in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopNDataItem {
    pub value: Option<Value>,
    pub count: u64,
}

impl TopNDataItem {
    pub fn new(value: Option<Value>, count: u64) -> Self {
        Self { value, count }
    }
}

impl Ord for TopNDataItem {
    fn cmp(&self, other: &Self) -> Ordering {
        rank_order(&self.value, self.count, &other.value, other.count)
    }
}

impl PartialOrd for TopNDataItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub(crate) fn rank_order(
    a_value: &Option<Value>,
    a_count: u64,
    b_value: &Option<Value>,
    b_count: u64,
) -> Ordering {
    b_count.cmp(&a_count).then_with(|| match (a_value, b_value) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    })
}

/// Tracks the `capacity` most frequent values of one column.
///
/// Counts live in an exact map until the number of distinct entries exceeds
/// the high-water mark; the tracker then keeps only the top `capacity`
/// entries. Merging unions the retained entries, summing counts, and applies
/// the same eviction rule.
///
/// # Approximation boundary
///
/// Once a tracker has evicted, a value that was rare in every partition but
/// frequent overall can be undercounted or missing from the merged ranking.
/// [`TopNTracker::is_exact`] reports whether any eviction has happened in
/// this tracker or in anything merged into it. Column profiles rank from
/// their exact [`FrequencyTable`] while they hold it and only fall back to a
/// tracker seeded from it once the table is released.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TrackerRepr", into = "TrackerRepr")]
pub struct TopNTracker {
    capacity: usize,
    high_water_mark: usize,
    counts: HashMap<Option<Value>, u64>,
    evicted: bool,
}

impl TopNTracker {
    /// Creates a tracker reporting up to `capacity` values with the default
    /// high-water mark. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self::with_high_water_mark(capacity, DEFAULT_HIGH_WATER_MARK)
    }

    /// Creates a tracker with an explicit high-water mark, which is never
    /// allowed below the capacity.
    pub fn with_high_water_mark(capacity: usize, high_water_mark: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            high_water_mark: high_water_mark.max(capacity),
            counts: HashMap::new(),
            evicted: false,
        }
    }

    /// Builds a tracker holding the exact top entries of a frequency table.
    pub fn from_frequencies(
        capacity: usize,
        high_water_mark: usize,
        frequencies: &FrequencyTable,
    ) -> Self {
        let mut tracker = Self::with_high_water_mark(capacity, high_water_mark);
        tracker.counts = frequencies
            .ranked(tracker.high_water_mark)
            .into_iter()
            .map(|item| (item.value, item.count))
            .collect();
        tracker.evicted = frequencies.len() > tracker.high_water_mark;
        tracker
    }

    /// Counts one occurrence of `value` (`None` is the null sentinel).
    pub fn observe(&mut self, value: Option<Value>) {
        *self.counts.entry(value).or_insert(0) += 1;
        self.evict_if_needed();
    }

    /// The ranked items, at most `capacity` of them, highest count first.
    pub fn top_n(&self) -> Vec<TopNDataItem> {
        let mut items: Vec<TopNDataItem> = self
            .counts
            .iter()
            .map(|(value, count)| TopNDataItem::new(value.clone(), *count))
            .collect();
        items.sort_unstable();
        items.truncate(self.capacity);
        items
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn high_water_mark(&self) -> usize {
        self.high_water_mark
    }

    /// Number of distinct entries currently retained.
    pub fn retained(&self) -> usize {
        self.counts.len()
    }

    /// False once any eviction happened, here or in a merged-in tracker.
    pub fn is_exact(&self) -> bool {
        !self.evicted
    }

    fn evict_if_needed(&mut self) {
        if self.counts.len() <= self.high_water_mark {
            return;
        }

        let mut entries: Vec<(Option<Value>, u64)> = self.counts.drain().collect();
        entries.sort_unstable_by(|(a, a_count), (b, b_count)| {
            rank_order(a, *a_count, b, *b_count)
        });
        entries.truncate(self.capacity);
        self.counts = entries.into_iter().collect();
        self.evicted = true;
    }
}

impl ProfileState for TopNTracker {
    fn merge_from(&mut self, other: &Self) -> ProfileResult<()> {
        if self.capacity != other.capacity {
            return Err(ProfileError::incompatible_merge(format!(
                "top-N capacity {} vs {}",
                self.capacity, other.capacity
            )));
        }

        self.high_water_mark = self.high_water_mark.max(other.high_water_mark);
        self.evicted |= other.evicted;
        for (value, count) in &other.counts {
            *self.counts.entry(value.clone()).or_insert(0) += count;
        }
        self.evict_if_needed();
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Serialized form of a tracker: retained entries as a ranked list, since
/// JSON maps cannot be keyed by values.
#[derive(Serialize, Deserialize)]
struct TrackerRepr {
    capacity: usize,
    high_water_mark: usize,
    evicted: bool,
    entries: Vec<TopNDataItem>,
}

impl From<TopNTracker> for TrackerRepr {
    fn from(tracker: TopNTracker) -> Self {
        let mut entries: Vec<TopNDataItem> = tracker
            .counts
            .into_iter()
            .map(|(value, count)| TopNDataItem::new(value, count))
            .collect();
        entries.sort_unstable();
        Self {
            capacity: tracker.capacity,
            high_water_mark: tracker.high_water_mark,
            evicted: tracker.evicted,
            entries,
        }
    }
}

impl From<TrackerRepr> for TopNTracker {
    fn from(repr: TrackerRepr) -> Self {
        let mut tracker = Self::with_high_water_mark(repr.capacity, repr.high_water_mark);
        tracker.evicted = repr.evicted;
        for item in repr.entries {
            *tracker.counts.entry(item.value).or_insert(0) += item.count;
        }
        tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short(v: i16) -> Option<Value> {
        Some(Value::Short(v))
    }

    fn reference_column() -> Vec<Option<Value>> {
        vec![
            short(100),
            short(100),
            short(100),
            short(1400),
            short(1400),
            short(5000),
            short(0),
            short(500),
            None,
            None,
        ]
    }

    #[test]
    fn test_reference_top_three() {
        let mut tracker = TopNTracker::new(3);
        for value in reference_column() {
            tracker.observe(value);
        }

        let top = tracker.top_n();
        assert_eq!(
            top,
            vec![
                TopNDataItem::new(short(100), 3),
                TopNDataItem::new(short(1400), 2),
                TopNDataItem::new(None, 2),
            ]
        );
        assert!(tracker.is_exact());
    }

    #[test]
    fn test_ties_break_by_value_then_null_last() {
        let mut tracker = TopNTracker::new(4);
        for value in [None, Some(Value::from("b")), Some(Value::from("a")), short(1)] {
            tracker.observe(value);
        }

        let values: Vec<Option<Value>> = tracker.top_n().into_iter().map(|i| i.value).collect();
        assert_eq!(
            values,
            vec![short(1), Some(Value::from("a")), Some(Value::from("b")), None]
        );
    }

    #[test]
    fn test_capacity_bounds_result() {
        let mut tracker = TopNTracker::new(2);
        for v in 0..50 {
            tracker.observe(short(v % 7));
        }

        let top = tracker.top_n();
        assert_eq!(top.len(), 2);
        assert!(top.iter().all(|item| item.count >= 1));
        assert!(top.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn test_eviction_above_high_water_mark() {
        let mut tracker = TopNTracker::with_high_water_mark(2, 4);
        for _ in 0..5 {
            tracker.observe(short(1));
        }
        for _ in 0..3 {
            tracker.observe(short(2));
        }
        for v in 10..13 {
            tracker.observe(short(v));
        }

        assert!(!tracker.is_exact());
        assert!(tracker.retained() <= 4);
        assert_eq!(tracker.top_n()[0], TopNDataItem::new(short(1), 5));
        assert_eq!(tracker.top_n()[1], TopNDataItem::new(short(2), 3));
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let tracker = TopNTracker::with_high_water_mark(0, 0);
        assert_eq!(tracker.capacity(), 1);
        assert_eq!(tracker.high_water_mark(), 1);
    }

    #[test]
    fn test_merge_sums_shared_values() {
        let mut a = TopNTracker::new(3);
        let mut b = TopNTracker::new(3);
        for v in [1, 1, 2] {
            a.observe(short(v));
        }
        for v in [2, 2, 3] {
            b.observe(short(v));
        }

        let merged = a.combine(&b).unwrap();
        assert_eq!(merged.top_n()[0], TopNDataItem::new(short(2), 3));
        assert_eq!(merged.top_n()[1], TopNDataItem::new(short(1), 2));
        assert_eq!(merged, b.combine(&a).unwrap());
    }

    #[test]
    fn test_merge_approximation_after_eviction() {
        // "x" and 9 are evicted locally in both partitions.
        let mut a = TopNTracker::with_high_water_mark(1, 2);
        let mut b = TopNTracker::with_high_water_mark(1, 2);
        for tracker in [&mut a, &mut b] {
            for _ in 0..3 {
                tracker.observe(short(7));
            }
            tracker.observe(Some(Value::from("x")));
            tracker.observe(short(9));
        }

        let merged = a.combine(&b).unwrap();
        assert!(!merged.is_exact());
        assert_eq!(merged.top_n(), vec![TopNDataItem::new(short(7), 6)]);
    }

    #[test]
    fn test_merge_rejects_different_capacity() {
        let a = TopNTracker::new(3);
        let b = TopNTracker::new(5);
        assert!(matches!(
            a.combine(&b),
            Err(ProfileError::IncompatibleMerge(_))
        ));
    }

    #[test]
    fn test_from_frequencies_is_exact_ranking() {
        let mut table = FrequencyTable::new();
        for value in reference_column() {
            table.observe(value);
        }

        let tracker = TopNTracker::from_frequencies(3, 100, &table);
        assert!(tracker.is_exact());
        assert_eq!(tracker.top_n()[0], TopNDataItem::new(short(100), 3));
        assert_eq!(tracker.retained(), 6);
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut tracker = TopNTracker::new(3);
        for value in reference_column() {
            tracker.observe(value);
        }

        let json = serde_json::to_string(&tracker).unwrap();
        let back: TopNTracker = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tracker);
    }
}

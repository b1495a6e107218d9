//! Summaries for boolean, string and temporal columns.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::errors::{ProfileError, ProfileResult};
use super::traits::ProfileState;
use super::types::{LogicalType, Value};

/// Length statistics of a string column.
///
/// Lengths count Unicode scalar values. Among strings of equal length the
/// lexicographically smallest is kept as shortest/longest, which keeps merges
/// order-independent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StringSummary {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub shortest: Option<String>,
    pub longest: Option<String>,
    pub empty_count: u64,
}

impl StringSummary {
    fn observe(&mut self, s: &str) {
        let len = s.chars().count();
        if len == 0 {
            self.empty_count += 1;
        }
        if Self::replaces(self.min_length, self.shortest.as_deref(), len, s, true) {
            self.min_length = Some(len);
            self.shortest = Some(s.to_string());
        }
        if Self::replaces(self.max_length, self.longest.as_deref(), len, s, false) {
            self.max_length = Some(len);
            self.longest = Some(s.to_string());
        }
    }

    fn replaces(
        current_len: Option<usize>,
        current: Option<&str>,
        len: usize,
        s: &str,
        shortest: bool,
    ) -> bool {
        match (current_len, current) {
            (Some(cur_len), Some(cur)) if cur_len == len => s < cur,
            (Some(cur_len), Some(_)) => {
                if shortest {
                    len < cur_len
                } else {
                    len > cur_len
                }
            }
            _ => true,
        }
    }

    fn merge_from(&mut self, other: &Self) {
        self.empty_count += other.empty_count;
        if let (Some(len), Some(s)) = (other.min_length, other.shortest.as_deref()) {
            if Self::replaces(self.min_length, self.shortest.as_deref(), len, s, true) {
                self.min_length = Some(len);
                self.shortest = Some(s.to_string());
            }
        }
        if let (Some(len), Some(s)) = (other.max_length, other.longest.as_deref()) {
            if Self::replaces(self.max_length, self.longest.as_deref(), len, s, false) {
                self.max_length = Some(len);
                self.longest = Some(s.to_string());
            }
        }
    }
}

/// Type-specific part of a categorical accumulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CategoricalSummary {
    Boolean {
        true_count: u64,
        false_count: u64,
    },
    String(StringSummary),
    Date {
        min: Option<NaiveDate>,
        max: Option<NaiveDate>,
    },
    Timestamp {
        min: Option<NaiveDateTime>,
        max: Option<NaiveDateTime>,
    },
}

/// Accumulator for non-numeric columns: a non-null count plus the summary
/// matching the column's logical type. No numeric moments are computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalAccumulator {
    count: u64,
    summary: CategoricalSummary,
}

impl CategoricalAccumulator {
    /// Creates the accumulator for a categorical logical type.
    pub fn new(logical_type: LogicalType) -> ProfileResult<Self> {
        let summary = match logical_type {
            LogicalType::Boolean => CategoricalSummary::Boolean {
                true_count: 0,
                false_count: 0,
            },
            LogicalType::String => CategoricalSummary::String(StringSummary::default()),
            LogicalType::Date => CategoricalSummary::Date {
                min: None,
                max: None,
            },
            LogicalType::Timestamp => CategoricalSummary::Timestamp {
                min: None,
                max: None,
            },
            numeric => {
                return Err(ProfileError::invalid_config(format!(
                    "{numeric} columns use a numeric accumulator"
                )))
            }
        };
        Ok(Self { count: 0, summary })
    }

    /// Adds one non-null observation. Values whose type does not match the
    /// summary are counted but do not update it; column profiles filter
    /// those out before they get here.
    pub fn observe(&mut self, value: &Value) {
        self.count += 1;
        match (&mut self.summary, value) {
            (
                CategoricalSummary::Boolean {
                    true_count,
                    false_count,
                },
                Value::Boolean(b),
            ) => {
                if *b {
                    *true_count += 1;
                } else {
                    *false_count += 1;
                }
            }
            (CategoricalSummary::String(summary), Value::String(s)) => summary.observe(s),
            (CategoricalSummary::Date { min, max }, Value::Date(d)) => {
                *min = Some(min.map_or(*d, |m| m.min(*d)));
                *max = Some(max.map_or(*d, |m| m.max(*d)));
            }
            (CategoricalSummary::Timestamp { min, max }, Value::Timestamp(t)) => {
                *min = Some(min.map_or(*t, |m| m.min(*t)));
                *max = Some(max.map_or(*t, |m| m.max(*t)));
            }
            _ => {}
        }
    }

    /// Number of non-null observations.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn summary(&self) -> &CategoricalSummary {
        &self.summary
    }
}

fn merge_bounds<T: Ord + Copy>(mine: &mut Option<T>, theirs: Option<T>, keep_min: bool) {
    *mine = match (*mine, theirs) {
        (Some(a), Some(b)) => Some(if keep_min { a.min(b) } else { a.max(b) }),
        (a, b) => a.or(b),
    };
}

impl ProfileState for CategoricalAccumulator {
    fn merge_from(&mut self, other: &Self) -> ProfileResult<()> {
        match (&mut self.summary, &other.summary) {
            (
                CategoricalSummary::Boolean {
                    true_count,
                    false_count,
                },
                CategoricalSummary::Boolean {
                    true_count: other_true,
                    false_count: other_false,
                },
            ) => {
                *true_count += other_true;
                *false_count += other_false;
            }
            (CategoricalSummary::String(mine), CategoricalSummary::String(theirs)) => {
                mine.merge_from(theirs);
            }
            (
                CategoricalSummary::Date { min, max },
                CategoricalSummary::Date {
                    min: other_min,
                    max: other_max,
                },
            ) => {
                merge_bounds(min, *other_min, true);
                merge_bounds(max, *other_max, false);
            }
            (
                CategoricalSummary::Timestamp { min, max },
                CategoricalSummary::Timestamp {
                    min: other_min,
                    max: other_max,
                },
            ) => {
                merge_bounds(min, *other_min, true);
                merge_bounds(max, *other_max, false);
            }
            (mine, theirs) => {
                return Err(ProfileError::incompatible_merge(format!(
                    "categorical summaries {mine:?} vs {theirs:?}"
                )))
            }
        }
        self.count += other.count;
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.count == 0
    }
}

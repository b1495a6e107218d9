//! Per-column aggregate: counts, accumulator, ranking and exact frequencies.

use serde::{Deserialize, Serialize};

use super::categorical::CategoricalAccumulator;
use super::errors::{ProfileError, ProfileResult};
use super::frequency::FrequencyTable;
use super::numeric::NumericAccumulator;
use super::top_n::{TopNDataItem, TopNTracker};
use super::traits::ProfileState;
use super::types::{ColumnId, LogicalType, Value};

/// Accumulator variant chosen once from a column's declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "accumulator", rename_all = "lowercase")]
pub enum Accumulator {
    Numeric(NumericAccumulator),
    Categorical(CategoricalAccumulator),
}

impl Accumulator {
    pub fn for_type(logical_type: LogicalType) -> ProfileResult<Self> {
        if logical_type.is_numeric() {
            Ok(Accumulator::Numeric(NumericAccumulator::new()))
        } else {
            Ok(Accumulator::Categorical(CategoricalAccumulator::new(
                logical_type,
            )?))
        }
    }

    fn observe(&mut self, value: &Value) {
        match self {
            Accumulator::Numeric(acc) => {
                if let Some(x) = value.as_f64() {
                    acc.observe(x);
                }
            }
            Accumulator::Categorical(acc) => acc.observe(value),
        }
    }

    /// Number of non-null observations.
    pub fn count(&self) -> u64 {
        match self {
            Accumulator::Numeric(acc) => acc.count(),
            Accumulator::Categorical(acc) => acc.count(),
        }
    }

    /// Whether `other` holds the same kind of state and can be merged in.
    pub fn same_kind(&self, other: &Self) -> bool {
        match (self, other) {
            (Accumulator::Numeric(_), Accumulator::Numeric(_)) => true,
            (Accumulator::Categorical(mine), Accumulator::Categorical(theirs)) => {
                std::mem::discriminant(mine.summary()) == std::mem::discriminant(theirs.summary())
            }
            _ => false,
        }
    }
}

impl ProfileState for Accumulator {
    fn merge_from(&mut self, other: &Self) -> ProfileResult<()> {
        match (self, other) {
            (Accumulator::Numeric(mine), Accumulator::Numeric(theirs)) => mine.merge_from(theirs),
            (Accumulator::Categorical(mine), Accumulator::Categorical(theirs)) => {
                mine.merge_from(theirs)
            }
            _ => Err(ProfileError::incompatible_merge(
                "numeric and categorical accumulators",
            )),
        }
    }

    fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

/// What [`ColumnProfile::observe`] did with a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observed {
    Value,
    Null,
    /// The value's type differed from the declared type; it was counted as
    /// null.
    Mismatch { found: LogicalType },
}

/// Profile of one column over the rows seen so far.
///
/// `unique_count` is the number of distinct values, null counted as one
/// value; `singleton_count` is the number of values seen exactly once. Both
/// are maintained on every observation and recomputed from the merged
/// [`FrequencyTable`] on every merge, so a value present in several
/// partitions is never counted more than once.
///
/// Rankings come from the frequency table while it is held. The bounded
/// [`TopNTracker`] only takes over once the table is released.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    column: ColumnId,
    logical_type: LogicalType,
    total_count: u64,
    null_count: u64,
    mismatch_count: u64,
    unique_count: u64,
    singleton_count: u64,
    accumulator: Accumulator,
    top_n: TopNTracker,
    frequencies: Option<FrequencyTable>,
}

impl ColumnProfile {
    /// Creates an empty profile reporting the `top_n` most frequent values.
    pub fn new(
        column: ColumnId,
        logical_type: LogicalType,
        top_n: usize,
        high_water_mark: usize,
    ) -> ProfileResult<Self> {
        Ok(Self {
            column,
            logical_type,
            total_count: 0,
            null_count: 0,
            mismatch_count: 0,
            unique_count: 0,
            singleton_count: 0,
            accumulator: Accumulator::for_type(logical_type)?,
            top_n: TopNTracker::with_high_water_mark(top_n, high_water_mark),
            frequencies: Some(FrequencyTable::new()),
        })
    }

    /// Folds one cell into the profile.
    ///
    /// A value whose logical type differs from the declared type is recorded
    /// as null and counted as a mismatch.
    pub fn observe(&mut self, value: Option<Value>) -> Observed {
        match value {
            None => {
                self.observe_null();
                Observed::Null
            }
            Some(v) if v.logical_type() != self.logical_type => {
                let found = v.logical_type();
                self.observe_mismatch();
                Observed::Mismatch { found }
            }
            Some(v) => {
                self.total_count += 1;
                self.accumulator.observe(&v);
                self.count_frequency(Some(v));
                Observed::Value
            }
        }
    }

    /// Records a cell that could not be read as the declared type.
    pub fn observe_mismatch(&mut self) {
        self.mismatch_count += 1;
        self.observe_null();
    }

    fn observe_null(&mut self) {
        self.total_count += 1;
        self.null_count += 1;
        self.count_frequency(None);
    }

    fn count_frequency(&mut self, value: Option<Value>) {
        let Some(frequencies) = self.frequencies.as_mut() else {
            self.top_n.observe(value);
            return;
        };
        match frequencies.observe(value) {
            1 => {
                self.unique_count += 1;
                self.singleton_count += 1;
            }
            2 => self.singleton_count -= 1,
            _ => {}
        }
    }

    pub fn column(&self) -> &ColumnId {
        &self.column
    }

    pub fn logical_type(&self) -> LogicalType {
        self.logical_type
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn null_count(&self) -> u64 {
        self.null_count
    }

    /// Values demoted to null because their type did not match.
    pub fn mismatch_count(&self) -> u64 {
        self.mismatch_count
    }

    pub fn unique_count(&self) -> u64 {
        self.unique_count
    }

    pub fn singleton_count(&self) -> u64 {
        self.singleton_count
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    pub fn numeric(&self) -> Option<&NumericAccumulator> {
        match &self.accumulator {
            Accumulator::Numeric(acc) => Some(acc),
            Accumulator::Categorical(_) => None,
        }
    }

    pub fn categorical(&self) -> Option<&CategoricalAccumulator> {
        match &self.accumulator {
            Accumulator::Categorical(acc) => Some(acc),
            Accumulator::Numeric(_) => None,
        }
    }

    /// The most frequent values, highest count first.
    ///
    /// Exact while the frequency table is held; afterwards the tracker's
    /// ranking, which is approximate once it has evicted.
    pub fn top_n(&self) -> Vec<TopNDataItem> {
        match &self.frequencies {
            Some(frequencies) => frequencies.ranked(self.top_n.capacity()),
            None => self.top_n.top_n(),
        }
    }

    /// The bounded tracker. It only holds counts once frequencies are
    /// released.
    pub fn tracker(&self) -> &TopNTracker {
        &self.top_n
    }

    /// The exact frequency table, `None` once released.
    pub fn frequencies(&self) -> Option<&FrequencyTable> {
        self.frequencies.as_ref()
    }

    /// Drops the exact frequency table. Counts and rankings stay readable,
    /// but the profile can no longer be merged.
    pub fn release_frequencies(&mut self) {
        if let Some(frequencies) = self.frequencies.take() {
            self.top_n = TopNTracker::from_frequencies(
                self.top_n.capacity(),
                self.top_n.high_water_mark(),
                &frequencies,
            );
        }
    }

    /// Percentage of null cells, `None` for an empty column.
    pub fn perc_null(&self) -> Option<f64> {
        self.percentage(self.null_count)
    }

    /// Percentage of distinct values among all cells, null counted as one
    /// value.
    ///
    /// This is not the share of values seen exactly once; see
    /// [`ColumnProfile::singleton_count`] for those.
    pub fn perc_unique(&self) -> Option<f64> {
        self.percentage(self.unique_count)
    }

    /// `100 - perc_unique`.
    pub fn perc_duplicate(&self) -> Option<f64> {
        self.perc_unique().map(|unique| 100.0 - unique)
    }

    fn percentage(&self, count: u64) -> Option<f64> {
        if self.total_count == 0 {
            None
        } else {
            Some(count as f64 * 100.0 / self.total_count as f64)
        }
    }
}

impl ColumnProfile {
    /// Checks that `other` can be merged into `self` without changing
    /// anything. A merge that passes this check cannot fail half-way.
    pub fn check_mergeable(&self, other: &Self) -> ProfileResult<()> {
        if self.column != other.column {
            return Err(ProfileError::incompatible_merge(format!(
                "columns '{}' (index {}) and '{}' (index {})",
                self.column.name, self.column.index, other.column.name, other.column.index
            )));
        }
        if self.logical_type != other.logical_type {
            return Err(ProfileError::incompatible_merge(format!(
                "column '{}': {} vs {}",
                self.column, self.logical_type, other.logical_type
            )));
        }
        if self.top_n.capacity() != other.top_n.capacity() {
            return Err(ProfileError::incompatible_merge(format!(
                "column '{}': top-N capacity {} vs {}",
                self.column,
                self.top_n.capacity(),
                other.top_n.capacity()
            )));
        }
        if self.total_count == 0 || other.total_count == 0 {
            return Ok(());
        }
        if !self.accumulator.same_kind(&other.accumulator) {
            return Err(ProfileError::incompatible_merge(format!(
                "column '{}': accumulator states of different kinds",
                self.column
            )));
        }
        if self.frequencies.is_none() || other.frequencies.is_none() {
            return Err(ProfileError::state_merge(format!(
                "frequency table of column '{}' was released",
                self.column
            )));
        }
        Ok(())
    }
}

impl ProfileState for ColumnProfile {
    fn merge_from(&mut self, other: &Self) -> ProfileResult<()> {
        self.check_mergeable(other)?;
        if other.total_count == 0 {
            return Ok(());
        }
        if self.total_count == 0 {
            *self = other.clone();
            return Ok(());
        }

        let (Some(mine), Some(theirs)) = (self.frequencies.as_mut(), other.frequencies.as_ref())
        else {
            return Err(ProfileError::state_merge(format!(
                "frequency table of column '{}' was released",
                self.column
            )));
        };
        self.accumulator.merge_from(&other.accumulator)?;
        mine.merge_from(theirs)?;

        self.unique_count = mine.len() as u64;
        self.singleton_count = mine.singleton_count();
        self.top_n = TopNTracker::with_high_water_mark(
            self.top_n.capacity(),
            self.top_n.high_water_mark().max(other.top_n.high_water_mark()),
        );
        self.total_count += other.total_count;
        self.null_count += other.null_count;
        self.mismatch_count += other.mismatch_count;
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.total_count == 0
    }
}

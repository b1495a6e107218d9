//! Profile of a whole dataset: one column profile per column.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::column::ColumnProfile;
use super::errors::ProfileResult;
use super::traits::ProfileState;
use super::types::{ColumnId, LogicalType};

/// Values of one column whose type did not match the declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQualityWarning {
    pub column: ColumnId,
    pub expected: LogicalType,
    pub found: LogicalType,
    pub occurrences: u64,
}

/// Column profiles keyed by column, plus the number of rows observed and the
/// data-quality warnings raised while observing them.
///
/// Profiles of disjoint partitions combine with [`ProfileState::merge_from`];
/// a column present in only one input passes through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    #[serde(with = "column_map")]
    columns: BTreeMap<ColumnId, ColumnProfile>,
    row_count: u64,
    warnings: Vec<DataQualityWarning>,
}

impl DatasetProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a profile from column profiles, e.g. ones restored from storage.
    pub fn from_columns(columns: impl IntoIterator<Item = ColumnProfile>, row_count: u64) -> Self {
        Self {
            columns: columns
                .into_iter()
                .map(|profile| (profile.column().clone(), profile))
                .collect(),
            row_count,
            warnings: Vec::new(),
        }
    }

    /// Column profiles in column order.
    pub fn columns(&self) -> impl Iterator<Item = &ColumnProfile> {
        self.columns.values()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.values().find(|p| p.column().name == name)
    }

    pub fn column_by_id(&self, id: &ColumnId) -> Option<&ColumnProfile> {
        self.columns.get(id)
    }

    pub(crate) fn column_mut(&mut self, id: &ColumnId) -> Option<&mut ColumnProfile> {
        self.columns.get_mut(id)
    }

    pub(crate) fn insert_column(&mut self, profile: ColumnProfile) {
        self.columns.insert(profile.column().clone(), profile);
    }

    /// Number of profiled columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.row_count == 0
    }

    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    pub(crate) fn add_rows(&mut self, rows: u64) {
        self.row_count += rows;
    }

    /// Warnings ordered by column and found type.
    pub fn warnings(&self) -> &[DataQualityWarning] {
        &self.warnings
    }

    /// Records `occurrences` mismatching values and returns true when this is
    /// the first warning for the column.
    pub(crate) fn record_mismatch(
        &mut self,
        column: &ColumnId,
        expected: LogicalType,
        found: LogicalType,
        occurrences: u64,
    ) -> bool {
        let first_for_column = !self.warnings.iter().any(|w| &w.column == column);
        self.add_warning(DataQualityWarning {
            column: column.clone(),
            expected,
            found,
            occurrences,
        });
        first_for_column
    }

    fn add_warning(&mut self, warning: DataQualityWarning) {
        let position = self
            .warnings
            .binary_search_by(|w| (&w.column, w.found).cmp(&(&warning.column, warning.found)));
        match position {
            Ok(i) => self.warnings[i].occurrences += warning.occurrences,
            Err(i) => self.warnings.insert(i, warning),
        }
    }

    /// Releases every column's frequency table. See
    /// [`ColumnProfile::release_frequencies`].
    pub fn release_frequencies(&mut self) {
        for profile in self.columns.values_mut() {
            profile.release_frequencies();
        }
    }
}

impl ProfileState for DatasetProfile {
    fn merge_from(&mut self, other: &Self) -> ProfileResult<()> {
        for (id, profile) in &other.columns {
            if let Some(mine) = self.columns.get(id) {
                mine.check_mergeable(profile)?;
            }
        }
        for (id, profile) in &other.columns {
            match self.columns.get_mut(id) {
                Some(mine) => mine.merge_from(profile)?,
                None => {
                    self.columns.insert(id.clone(), profile.clone());
                }
            }
        }
        for warning in &other.warnings {
            self.add_warning(warning.clone());
        }
        self.row_count += other.row_count;
        Ok(())
    }

    fn is_empty(&self) -> bool {
        DatasetProfile::is_empty(self)
    }
}

/// Column profiles serialize as a sequence; each profile carries its own
/// column identifier.
mod column_map {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer};

    use super::{ColumnId, ColumnProfile};

    pub fn serialize<S>(
        columns: &BTreeMap<ColumnId, ColumnProfile>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(columns.values())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<ColumnId, ColumnProfile>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let profiles = Vec::<ColumnProfile>::deserialize(deserializer)?;
        Ok(profiles
            .into_iter()
            .map(|profile| (profile.column().clone(), profile))
            .collect())
    }
}

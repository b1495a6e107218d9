//! Combining partition profiles into one dataset profile.

use tracing::{debug, instrument};

use crate::log_merge;
use crate::logging::LogConfig;

use super::dataset::DatasetProfile;
use super::errors::ProfileResult;
use super::traits::ProfileState;

/// Combines partition-local dataset profiles.
///
/// Every operation is associative and commutative over its inputs, so the
/// result does not depend on partition order or on the shape of the
/// reduction tree (up to floating-point summation order in sums and
/// moments).
#[derive(Debug, Clone, Default)]
pub struct ProfileReducer {
    log: LogConfig,
}

impl ProfileReducer {
    pub fn new(log: LogConfig) -> Self {
        Self { log }
    }

    /// Returns the combination of two profiles.
    pub fn combine(
        &self,
        left: &DatasetProfile,
        right: &DatasetProfile,
    ) -> ProfileResult<DatasetProfile> {
        log_merge!(
            self.log,
            left_rows = left.row_count(),
            right_rows = right.row_count(),
            "Combining dataset profiles"
        );
        left.combine(right)
    }

    /// Folds profiles left to right. No input yields an empty profile.
    #[instrument(skip_all, fields(partitions = profiles.len()))]
    pub fn reduce(&self, profiles: Vec<DatasetProfile>) -> ProfileResult<DatasetProfile> {
        let mut merged = DatasetProfile::new();
        for profile in &profiles {
            log_merge!(
                self.log,
                rows = profile.row_count(),
                "Folding partition profile"
            );
            merged.merge_from(profile)?;
        }
        debug!(rows = merged.row_count(), "Reduced partition profiles");
        Ok(merged)
    }

    /// Merges profiles pairwise, level by level. No input yields an empty
    /// profile.
    #[instrument(skip_all, fields(partitions = profiles.len()))]
    pub fn tree_reduce(&self, profiles: Vec<DatasetProfile>) -> ProfileResult<DatasetProfile> {
        let mut level = profiles;
        let mut depth = 0usize;

        while level.len() > 1 {
            let mut next = Vec::with_capacity((level.len() + 1) / 2);
            let mut pending = level.into_iter();
            while let Some(mut left) = pending.next() {
                if let Some(right) = pending.next() {
                    log_merge!(
                        self.log,
                        depth,
                        left_rows = left.row_count(),
                        right_rows = right.row_count(),
                        "Merging profile pair"
                    );
                    left.merge_from(&right)?;
                }
                next.push(left);
            }
            level = next;
            depth += 1;
        }

        let merged = level.pop().unwrap_or_default();
        debug!(depth, rows = merged.row_count(), "Tree-reduced partition profiles");
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::{ColumnId, ColumnProfile, LogicalType, Value};

    fn partition(values: &[i64]) -> DatasetProfile {
        let mut profile =
            ColumnProfile::new(ColumnId::new(0, "n"), LogicalType::Long, 3, 10_000).unwrap();
        for v in values {
            profile.observe(Some(Value::Long(*v)));
        }
        DatasetProfile::from_columns([profile], values.len() as u64)
    }

    #[test]
    fn test_empty_input_yields_empty_profile() {
        let reducer = ProfileReducer::default();
        assert_eq!(reducer.reduce(Vec::new()).unwrap(), DatasetProfile::new());
        assert_eq!(reducer.tree_reduce(Vec::new()).unwrap(), DatasetProfile::new());
    }

    #[test]
    fn test_tree_and_sequential_reduction_agree() {
        let reducer = ProfileReducer::new(LogConfig::verbose());
        let partitions: Vec<DatasetProfile> = [&[1, 2][..], &[2, 3], &[5], &[8, 8, 8], &[]]
            .iter()
            .map(|values| partition(values))
            .collect();

        let sequential = reducer.reduce(partitions.clone()).unwrap();
        let tree = reducer.tree_reduce(partitions).unwrap();

        assert_eq!(sequential.row_count(), 8);
        assert_eq!(tree.row_count(), 8);
        let (s, t) = (sequential.column("n").unwrap(), tree.column("n").unwrap());
        assert_eq!(s.total_count(), t.total_count());
        assert_eq!(s.unique_count(), 5);
        assert_eq!(t.unique_count(), 5);
        assert_eq!(s.top_n(), t.top_n());
        assert_eq!(s.numeric().unwrap().sum(), t.numeric().unwrap().sum());
    }

    #[test]
    fn test_single_profile_is_returned_unchanged() {
        let reducer = ProfileReducer::default();
        let only = partition(&[4, 4]);
        assert_eq!(reducer.tree_reduce(vec![only.clone()]).unwrap(), only);
    }
}

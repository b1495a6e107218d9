//! Merge contract shared by every partial aggregate.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

use super::errors::{ProfileError, ProfileResult};

/// State computed from one partition that can be combined with the state of
/// another partition without access to the raw rows.
///
/// `merge_from` must be associative and commutative (up to floating-point
/// summation order), and merging with an empty state must leave the state
/// unchanged. States are serializable so they can cross process boundaries
/// between the partition workers and the final combiner.
///
/// # Example
///
/// ```rust
/// use column_profiler::profiler::{NumericAccumulator, ProfileState};
///
/// let mut left = NumericAccumulator::new();
/// left.observe(1.0);
/// let mut right = NumericAccumulator::new();
/// right.observe(3.0);
///
/// let merged = left.combine(&right).unwrap();
/// assert_eq!(merged.count(), 2);
/// assert_eq!(merged.mean(), Some(2.0));
/// ```
pub trait ProfileState: Clone + Send + Sync + Debug + Serialize + DeserializeOwned {
    /// Folds `other` into `self`.
    ///
    /// `other` is treated as an immutable snapshot; it must not be mutated
    /// concurrently while the merge runs.
    fn merge_from(&mut self, other: &Self) -> ProfileResult<()>;

    /// Returns the combination of two states, leaving both inputs untouched.
    fn combine(&self, other: &Self) -> ProfileResult<Self> {
        let mut merged = self.clone();
        merged.merge_from(other)?;
        Ok(merged)
    }

    /// Merges several states into one.
    fn merge(states: Vec<Self>) -> ProfileResult<Self> {
        let mut states = states.into_iter();
        let first = states
            .next()
            .ok_or_else(|| ProfileError::state_merge("No states to merge"))?;
        states.try_fold(first, |mut acc, state| {
            acc.merge_from(&state)?;
            Ok(acc)
        })
    }

    /// Returns whether this state has observed nothing.
    fn is_empty(&self) -> bool {
        false
    }
}

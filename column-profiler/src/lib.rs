//! # column-profiler - Mergeable column statistics for partitioned data
//!
//! column-profiler computes descriptive statistics for every column of a
//! dataset that is too large to see at once. Each partition is profiled in a
//! single pass; the partition profiles are then merged, in any order, into
//! one exact dataset profile.
//!
//! ## Quick Start
//!
//! ```rust
//! use column_profiler::prelude::*;
//!
//! # fn main() -> ProfileResult<()> {
//! let schema = ProfileSchema::new().with_column("credits", LogicalType::Short);
//! let config = ProfilerConfig::builder().top_n(3).build()?;
//!
//! let mut partition = PartitionProfiler::new(schema, &config)?;
//! for credits in [Some(100), Some(100), Some(1400), None] {
//!     partition.observe_row(vec![credits.map(Value::Short)])?;
//! }
//!
//! let profile = partition.finish();
//! let credits = profile.column("credits").unwrap();
//! assert_eq!(credits.null_count(), 1);
//! assert_eq!(credits.unique_count(), 3);
//! assert_eq!(credits.numeric().unwrap().max(), Some(1400.0));
//! # Ok(())
//! # }
//! ```
//!
//! ## What is computed
//!
//! For every column:
//!
//! - **Counts**: total, null, distinct (null counted as a value) and
//!   singleton counts, with null, unique and duplicate percentages
//! - **Top-N**: the most frequent values with a deterministic tie-break
//! - **Numeric columns**: min, max, sum, mean, population variance and
//!   standard deviation
//! - **String columns**: min/max length, shortest/longest value, empty
//!   strings
//! - **Boolean, date and timestamp columns**: true/false counts and bounds
//!
//! Values that do not match a column's declared type are counted as nulls
//! and reported as [`DataQualityWarning`](profiler::DataQualityWarning)s.
//!
//! ## Merging
//!
//! Every partial aggregate implements [`ProfileState`](profiler::ProfileState).
//! Merges are associative and commutative; a value seen in several
//! partitions is counted once in the merged distinct count because column
//! profiles carry exact frequency tables through every merge.
//!
//! ## DataFusion
//!
//! [`ProfileRunner`](profiler::ProfileRunner) profiles a DataFusion
//! `DataFrame` or registered table, one Tokio task per execution partition.
//!
//! ## Logging
//!
//! The profiler logs through `tracing`. Install a subscriber yourself or use
//! [`logging::setup::init_logging`].

pub mod logging;
pub mod prelude;
pub mod profiler;
pub mod sources;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;

//! Mergeable column profiles.
//!
//! A profile is computed per partition in one pass and combined with the
//! profiles of other partitions without access to their rows. Every partial
//! aggregate implements [`ProfileState`], whose merge is associative and
//! commutative, so partitions can be combined in any order and in any
//! reduction tree.
//!
//! ## Building blocks
//!
//! - [`NumericAccumulator`]: count, sum, min/max and Welford moments
//! - [`CategoricalAccumulator`]: string lengths, boolean counts, date and
//!   timestamp bounds
//! - [`TopNTracker`]: the most frequent values, null included
//! - [`FrequencyTable`]: exact value counts behind distinct and singleton
//!   counts
//! - [`ColumnProfile`] and [`DatasetProfile`]: the per-column and per-dataset
//!   aggregates
//!
//! ## Running
//!
//! [`PartitionProfiler`] folds rows or Arrow batches of one partition,
//! [`ProfileReducer`] combines partition profiles and [`ProfileRunner`] does
//! both for a DataFusion plan.
//!
//! ```rust
//! use column_profiler::profiler::{
//!     LogicalType, PartitionProfiler, ProfileReducer, ProfileSchema, ProfilerConfig, Value,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = ProfileSchema::new().with_column("credits", LogicalType::Short);
//! let config = ProfilerConfig::default();
//!
//! let mut first = PartitionProfiler::new(schema.clone(), &config)?;
//! first.observe_row(vec![Some(Value::Short(100))])?;
//! let mut second = PartitionProfiler::new(schema, &config)?;
//! second.observe_row(vec![Some(Value::Short(100))])?;
//! second.observe_row(vec![None])?;
//!
//! let profile = ProfileReducer::default().reduce(vec![first.finish(), second.finish()])?;
//! let credits = profile.column("credits").unwrap();
//! assert_eq!(credits.total_count(), 3);
//! assert_eq!(credits.unique_count(), 2);
//! # Ok(())
//! # }
//! ```

mod categorical;
mod column;
mod config;
mod dataset;
mod errors;
mod frequency;
mod numeric;
mod output;
mod partition;
mod reducer;
mod runner;
mod top_n;
mod traits;
mod types;

pub use categorical::{CategoricalAccumulator, CategoricalSummary, StringSummary};
pub use column::{Accumulator, ColumnProfile, Observed};
pub use config::{OutputConfig, ProfilerConfig, ProfilerConfigBuilder};
pub use dataset::{DataQualityWarning, DatasetProfile};
pub use errors::{ProfileError, ProfileResult};
pub use frequency::FrequencyTable;
pub use numeric::NumericAccumulator;
pub use output::{render_top_n, MetricType, OutputRow, ALL_COLUMNS};
pub use partition::PartitionProfiler;
pub use reducer::ProfileReducer;
pub use runner::ProfileRunner;
pub use top_n::{TopNDataItem, TopNTracker, DEFAULT_HIGH_WATER_MARK, DEFAULT_TOP_N};
pub use traits::ProfileState;
pub use types::{ColumnId, Decimal, LogicalType, ProfileSchema, SchemaColumn, Value};

//! Prelude for commonly used types and traits in column-profiler.

pub use crate::logging::LogConfig;
pub use crate::profiler::{
    ColumnId, ColumnProfile, DatasetProfile, LogicalType, PartitionProfiler, ProfileError,
    ProfileReducer, ProfileResult, ProfileRunner, ProfileSchema, ProfileState, ProfilerConfig,
    TopNDataItem, Value,
};

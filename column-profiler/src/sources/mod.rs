//! Adapters from Arrow data to profiler values.
//!
//! DataFusion plans and Arrow record batches are the input the profiler reads
//! in practice; this module maps their data types to [`LogicalType`]s and
//! their cells to [`Value`]s.
//!
//! [`LogicalType`]: crate::profiler::LogicalType
//! [`Value`]: crate::profiler::Value

mod arrow_batch;

pub use arrow_batch::{column_values, logical_type_for, schema_from_arrow, value_at};

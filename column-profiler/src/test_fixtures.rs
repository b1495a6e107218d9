//! Shared fixtures for profiling tests and benchmarks.
//!
//! The reference column is a `short` column of student credits:
//! `{100, 100, 100, 1400, 1400, 5000, 0, 500, null, null}`.

use std::sync::Arc;

use arrow::array::{Int16Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use rand::Rng;

use crate::profiler::{
    DatasetProfile, LogicalType, PartitionProfiler, ProfileResult, ProfileSchema, ProfilerConfig,
    Value,
};

/// Tolerance for the reference standard deviation (1579.359047...).
pub const CREDITS_EPSILON: f64 = 1e-6;

/// The reference credits column.
pub fn reference_credits() -> Vec<Option<Value>> {
    [
        Some(100),
        Some(100),
        Some(100),
        Some(1400),
        Some(1400),
        Some(5000),
        Some(0),
        Some(500),
        None,
        None,
    ]
    .into_iter()
    .map(|credits| credits.map(Value::Short))
    .collect()
}

/// Schema with the single `credits` column.
pub fn reference_schema() -> ProfileSchema {
    ProfileSchema::new().with_column("credits", LogicalType::Short)
}

/// Profile of the reference column, observed in one partition.
pub fn reference_profile() -> DatasetProfile {
    let mut profiler = PartitionProfiler::new(reference_schema(), &ProfilerConfig::default())
        .expect("default config is valid");
    for value in reference_credits() {
        profiler
            .observe_row(vec![value])
            .expect("row matches schema");
    }
    profiler.finish()
}

/// The reference column as a record batch with a second `name` column.
pub fn reference_batch() -> ProfileResult<RecordBatch> {
    let credits: Int16Array = reference_credits()
        .into_iter()
        .map(|value| match value {
            Some(Value::Short(v)) => Some(v),
            _ => None,
        })
        .collect();
    let names = StringArray::from(vec![
        Some("ann"),
        Some("bob"),
        Some("cy"),
        Some("dee"),
        Some("ann"),
        None,
        Some(""),
        Some("eve"),
        Some("fay"),
        Some("bob"),
    ]);

    Ok(RecordBatch::try_new(
        Arc::new(Schema::new(vec![
            Field::new("credits", DataType::Int16, true),
            Field::new("name", DataType::Utf8, true),
        ])),
        vec![Arc::new(credits), Arc::new(names)],
    )?)
}

/// Random rows for a `(id long, score double, label string)` schema, with
/// roughly one null in ten cells of the nullable columns.
pub fn random_rows(rows: usize, distinct_labels: usize) -> (ProfileSchema, Vec<Vec<Option<Value>>>) {
    let schema = ProfileSchema::new()
        .with_column("id", LogicalType::Long)
        .with_column("score", LogicalType::Double)
        .with_column("label", LogicalType::String);

    let mut rng = rand::rng();
    let data = (0..rows)
        .map(|i| {
            let score = (rng.random_range(0..10) != 0)
                .then(|| Value::Double(rng.random_range(-1_000.0..1_000.0)));
            let label = (rng.random_range(0..10) != 0).then(|| {
                Value::String(format!("label-{}", rng.random_range(0..distinct_labels.max(1))))
            });
            vec![Some(Value::Long(i as i64)), score, label]
        })
        .collect();
    (schema, data)
}

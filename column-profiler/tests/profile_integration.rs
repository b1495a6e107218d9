//! End-to-end tests of partition profiling and merging.

use column_profiler::profiler::{
    ColumnProfile, DatasetProfile, LogicalType, MetricType, PartitionProfiler, ProfileError,
    ProfileReducer, ProfileSchema, ProfileState, ProfilerConfig, TopNDataItem, Value,
};

fn credits() -> Vec<Option<Value>> {
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
    .map(|v| v.map(Value::Short))
    .collect()
}

fn schema() -> ProfileSchema {
    ProfileSchema::new()
        .with_column("credits", LogicalType::Short)
        .with_column("student", LogicalType::String)
}

fn profile_rows(rows: &[(Option<Value>, Option<&str>)]) -> DatasetProfile {
    let mut profiler = PartitionProfiler::new(schema(), &ProfilerConfig::default()).unwrap();
    for (credits, student) in rows {
        profiler
            .observe_row(vec![credits.clone(), student.map(Value::from)])
            .unwrap();
    }
    profiler.finish()
}

fn student_rows() -> Vec<(Option<Value>, Option<&'static str>)> {
    let students = [
        Some("ann"),
        Some("bob"),
        Some("cy"),
        Some("ann"),
        None,
        Some("dee"),
        Some("eve"),
        Some("bob"),
        Some("fay"),
        Some(""),
    ];
    credits().into_iter().zip(students).collect()
}

#[test]
fn test_reference_column_statistics() {
    let profile = profile_rows(&student_rows());
    let credits = profile.column("credits").unwrap();

    assert_eq!(credits.total_count(), 10);
    assert_eq!(credits.null_count(), 2);
    assert_eq!(credits.unique_count(), 6);
    assert_eq!(credits.perc_null(), Some(20.0));
    assert_eq!(credits.perc_unique(), Some(60.0));
    assert_eq!(credits.perc_duplicate(), Some(40.0));

    let numeric = credits.numeric().unwrap();
    assert_eq!(numeric.min(), Some(0.0));
    assert_eq!(numeric.max(), Some(5000.0));
    assert_eq!(numeric.sum(), 8600.0);
    assert_eq!(numeric.mean(), Some(1075.0));
    assert!((numeric.variance().unwrap() - 2_494_375.0).abs() < 1e-6);
    assert!((numeric.stddev().unwrap() - 1579.359047).abs() < 1e-6);

    assert_eq!(
        credits.top_n(),
        vec![
            TopNDataItem::new(Some(Value::Short(100)), 3),
            TopNDataItem::new(Some(Value::Short(1400)), 2),
            TopNDataItem::new(None, 2),
        ]
    );
}

#[test]
fn test_any_split_matches_single_pass() {
    let rows = student_rows();
    let whole = profile_rows(&rows);
    let reducer = ProfileReducer::default();

    for split in 0..=rows.len() {
        let merged = reducer
            .combine(&profile_rows(&rows[..split]), &profile_rows(&rows[split..]))
            .unwrap();

        assert_eq!(merged.row_count(), whole.row_count());
        for (m, w) in merged.columns().zip(whole.columns()) {
            assert_eq!(m.total_count(), w.total_count(), "split at {split}");
            assert_eq!(m.null_count(), w.null_count());
            assert_eq!(m.unique_count(), w.unique_count());
            assert_eq!(m.singleton_count(), w.singleton_count());
            assert_eq!(m.top_n(), w.top_n());
            assert_eq!(m.perc_duplicate(), w.perc_duplicate());
        }
        let (m, w) = (
            merged.column("credits").unwrap().numeric().unwrap(),
            whole.column("credits").unwrap().numeric().unwrap(),
        );
        assert_eq!(m.sum(), w.sum());
        assert_eq!(m.min(), w.min());
        assert!((m.variance().unwrap() - w.variance().unwrap()).abs() < 1e-6);
    }
}

#[test]
fn test_value_shared_by_partitions_counts_once() {
    let a = profile_rows(&[(Some(Value::Short(1)), Some("X")), (None, Some("a"))]);
    let b = profile_rows(&[(Some(Value::Short(2)), Some("X")), (None, Some("b"))]);

    let merged = a.combine(&b).unwrap();
    let student = merged.column("student").unwrap();
    assert_eq!(student.unique_count(), 3);
    assert_eq!(student.singleton_count(), 2);
    assert_eq!(student.top_n()[0], TopNDataItem::new(Some(Value::from("X")), 2));
}

#[test]
fn test_merge_order_does_not_matter() {
    let rows = student_rows();
    let parts: Vec<DatasetProfile> = rows.chunks(3).map(profile_rows).collect();
    let reducer = ProfileReducer::default();

    let forward = reducer.reduce(parts.clone()).unwrap();
    let mut reversed = parts.clone();
    reversed.reverse();
    let backward = reducer.reduce(reversed).unwrap();
    let tree = reducer.tree_reduce(parts).unwrap();

    for other in [&backward, &tree] {
        assert_eq!(forward.row_count(), other.row_count());
        for (f, o) in forward.columns().zip(other.columns()) {
            assert_eq!(f.unique_count(), o.unique_count());
            assert_eq!(f.top_n(), o.top_n());
            assert_eq!(f.null_count(), o.null_count());
        }
    }
}

#[test]
fn test_empty_profile_is_identity() {
    let profile = profile_rows(&student_rows());
    let empty_partition = profile_rows(&[]);

    assert_eq!(profile.combine(&DatasetProfile::new()).unwrap(), profile);
    assert_eq!(profile.combine(&empty_partition).unwrap(), profile);
    assert_eq!(empty_partition.combine(&profile).unwrap(), profile);
}

#[test]
fn test_string_column_summary() {
    let profile = profile_rows(&student_rows());
    let rows = profile.to_output_rows();
    let metric = |metric_type| {
        rows.iter()
            .find(|r| r.column_name == "student" && r.metric_type == metric_type)
            .map(|r| r.metric_value.clone())
    };

    assert_eq!(metric(MetricType::MinLength).as_deref(), Some("0"));
    assert_eq!(metric(MetricType::MaxLength).as_deref(), Some("3"));
    assert_eq!(metric(MetricType::LongestString).as_deref(), Some("ann"));
    assert_eq!(metric(MetricType::EmptyCount).as_deref(), Some("1"));
    assert_eq!(metric(MetricType::Mean), None);
}

#[test]
fn test_released_profile_is_readable_but_not_mergeable() {
    let mut profile = profile_rows(&student_rows());
    profile.release_frequencies();

    assert_eq!(profile.column("credits").unwrap().unique_count(), 6);
    assert!(!profile.to_output_rows().is_empty());
    assert!(matches!(
        profile.combine(&profile_rows(&student_rows())),
        Err(ProfileError::StateMerge(_))
    ));
}

#[test]
fn test_profile_survives_json_roundtrip() {
    let profile = profile_rows(&student_rows());
    let json = serde_json::to_string(&profile).unwrap();
    let restored: DatasetProfile = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, profile);

    // A restored profile keeps merging exactly
    let merged = restored.combine(&profile).unwrap();
    assert_eq!(merged.column("credits").unwrap().unique_count(), 6);
    assert_eq!(merged.column("credits").unwrap().total_count(), 20);
}

#[test]
fn test_restored_columns_build_a_profile() {
    let profile = profile_rows(&student_rows());
    let columns: Vec<ColumnProfile> = profile.columns().cloned().collect();
    let rebuilt = DatasetProfile::from_columns(columns, profile.row_count());
    assert_eq!(rebuilt.column("student"), profile.column("student"));
}

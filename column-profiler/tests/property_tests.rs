//! Property-based tests for profile merging.
//!
//! Partition profiles must combine into the same answer whatever the
//! partitioning, merge order or reduction tree:
//!
//! - counts, min/max, distinct counts and top-N lists are exact
//! - sums and moments agree within floating-point tolerance
//! - `combine(a, b) == combine(b, a)` holds bit for bit
//! - rankings never exceed N entries and are non-increasing

use column_profiler::profiler::{
    DatasetProfile, LogicalType, PartitionProfiler, ProfileSchema, ProfileState, ProfilerConfig,
    Value,
};
use proptest::prelude::*;

const TOP_N: usize = 3;

fn schema() -> ProfileSchema {
    ProfileSchema::new()
        .with_column("amount", LogicalType::Long)
        .with_column("tag", LogicalType::String)
}

fn profile(rows: &[(Option<i64>, Option<u8>)]) -> DatasetProfile {
    profile_with(rows, ProfilerConfig::builder().top_n(TOP_N).build().unwrap())
}

/// Far below the number of distinct values in the generated columns.
const SMALL_HIGH_WATER_MARK: usize = 4;

fn profile_small_tracker(rows: &[(Option<i64>, Option<u8>)]) -> DatasetProfile {
    let config = ProfilerConfig::builder()
        .top_n(TOP_N)
        .top_n_high_water_mark(SMALL_HIGH_WATER_MARK)
        .build()
        .unwrap();
    profile_with(rows, config)
}

fn profile_with(rows: &[(Option<i64>, Option<u8>)], config: ProfilerConfig) -> DatasetProfile {
    let mut profiler = PartitionProfiler::new(schema(), &config).unwrap();
    for (amount, tag) in rows {
        profiler
            .observe_row(vec![
                amount.map(Value::Long),
                tag.map(|t| Value::String(format!("t{t}"))),
            ])
            .unwrap();
    }
    profiler.finish()
}

fn rows_strategy() -> impl Strategy<Value = Vec<(Option<i64>, Option<u8>)>> {
    prop::collection::vec(
        (
            prop::option::weighted(0.85, -50i64..50),
            prop::option::weighted(0.9, 0u8..12),
        ),
        0..80,
    )
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

fn assert_equivalent(left: &DatasetProfile, right: &DatasetProfile) -> Result<(), TestCaseError> {
    prop_assert_eq!(left.row_count(), right.row_count());
    prop_assert_eq!(left.len(), right.len());
    for (l, r) in left.columns().zip(right.columns()) {
        prop_assert_eq!(l.total_count(), r.total_count());
        prop_assert_eq!(l.null_count(), r.null_count());
        prop_assert_eq!(l.unique_count(), r.unique_count());
        prop_assert_eq!(l.singleton_count(), r.singleton_count());
        prop_assert_eq!(l.top_n(), r.top_n());

        if let (Some(ln), Some(rn)) = (l.numeric(), r.numeric()) {
            prop_assert_eq!(ln.count(), rn.count());
            prop_assert_eq!(ln.min(), rn.min());
            prop_assert_eq!(ln.max(), rn.max());
            prop_assert!(close(ln.sum(), rn.sum()));
            match (ln.variance(), rn.variance()) {
                (Some(lv), Some(rv)) => prop_assert!(close(lv, rv), "{} vs {}", lv, rv),
                (lv, rv) => prop_assert_eq!(lv, rv),
            }
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_split_matches_single_pass(rows in rows_strategy(), cut in any::<prop::sample::Index>()) {
        let split = cut.index(rows.len() + 1);
        let whole = profile(&rows);
        let merged = profile(&rows[..split]).combine(&profile(&rows[split..])).unwrap();
        assert_equivalent(&merged, &whole)?;
    }

    #[test]
    fn prop_split_matches_single_pass_past_high_water_mark(
        rows in rows_strategy(),
        cut in any::<prop::sample::Index>(),
    ) {
        let split = cut.index(rows.len() + 1);
        let whole = profile_small_tracker(&rows);
        let merged = profile_small_tracker(&rows[..split])
            .combine(&profile_small_tracker(&rows[split..]))
            .unwrap();
        assert_equivalent(&merged, &whole)?;

        let reference = profile(&rows);
        for (small, exact) in whole.columns().zip(reference.columns()) {
            prop_assert_eq!(small.top_n(), exact.top_n());
        }
    }

    #[test]
    fn prop_merge_is_commutative(a in rows_strategy(), b in rows_strategy()) {
        let (pa, pb) = (profile(&a), profile(&b));
        prop_assert_eq!(pa.combine(&pb).unwrap(), pb.combine(&pa).unwrap());
    }

    #[test]
    fn prop_merge_is_associative(a in rows_strategy(), b in rows_strategy(), c in rows_strategy()) {
        let (pa, pb, pc) = (profile(&a), profile(&b), profile(&c));
        let left = pa.combine(&pb).unwrap().combine(&pc).unwrap();
        let right = pa.combine(&pb.combine(&pc).unwrap()).unwrap();
        assert_equivalent(&left, &right)?;
    }

    #[test]
    fn prop_column_invariants(rows in rows_strategy()) {
        let p = profile(&rows);
        for column in p.columns() {
            let top = column.top_n();
            prop_assert!(top.len() <= TOP_N);
            prop_assert!(top.iter().all(|item| item.count >= 1));
            prop_assert!(top.windows(2).all(|w| w[0].count >= w[1].count));
            prop_assert_eq!(
                column.total_count(),
                column.null_count() + column.accumulator().count()
            );
            if column.total_count() > 0 {
                let unique = column.perc_unique().unwrap();
                prop_assert_eq!(column.perc_duplicate(), Some(100.0 - unique));
            }
        }

        let amount = p.column("amount").unwrap().numeric().unwrap();
        if let Some(variance) = amount.variance() {
            prop_assert!(variance >= 0.0);
            prop_assert_eq!(amount.stddev(), Some(variance.sqrt()));
        }
    }

    #[test]
    fn prop_tree_reduce_matches_fold(chunks in prop::collection::vec(rows_strategy(), 0..6)) {
        use column_profiler::profiler::ProfileReducer;

        let parts: Vec<DatasetProfile> = chunks.iter().map(|rows| profile(rows)).collect();
        let reducer = ProfileReducer::default();
        let folded = reducer.reduce(parts.clone()).unwrap();
        let tree = reducer.tree_reduce(parts).unwrap();
        assert_equivalent(&folded, &tree)?;
    }
}

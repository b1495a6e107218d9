//! Flattening profiles into `(column, metric, value)` rows.

use std::fmt;
use std::sync::Arc;

use arrow::array::StringArray;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};

use super::categorical::CategoricalSummary;
use super::column::{Accumulator, ColumnProfile};
use super::config::OutputConfig;
use super::dataset::DatasetProfile;
use super::errors::ProfileResult;
use super::top_n::TopNDataItem;

/// Column name of the dataset-level rows.
pub const ALL_COLUMNS: &str = "(ALL)";

/// Kinds of metric written to the output table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricType {
    ColumnDatatype,
    TotalCount,
    NullCount,
    UniqueCount,
    PercNullValues,
    PercUniqueValues,
    PercDuplicateValues,
    TopNValues,
    Min,
    Max,
    Sum,
    Mean,
    Stddev,
    Variance,
    MaxLength,
    MinLength,
    LongestString,
    ShortestString,
    EmptyCount,
    PercEmptyValues,
    TrueCount,
    FalseCount,
    MinDate,
    MaxDate,
    MinTimestamp,
    MaxTimestamp,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::ColumnDatatype => "COLUMN_DATATYPE",
            MetricType::TotalCount => "TOTAL_COUNT",
            MetricType::NullCount => "NULL_COUNT",
            MetricType::UniqueCount => "UNIQUE_COUNT",
            MetricType::PercNullValues => "PERC_NULL_VALUES",
            MetricType::PercUniqueValues => "PERC_UNIQUE_VALUES",
            MetricType::PercDuplicateValues => "PERC_DUPLICATE_VALUES",
            MetricType::TopNValues => "TOP_N_VALUES",
            MetricType::Min => "MIN",
            MetricType::Max => "MAX",
            MetricType::Sum => "SUM",
            MetricType::Mean => "MEAN",
            MetricType::Stddev => "STDDEV",
            MetricType::Variance => "VARIANCE",
            MetricType::MaxLength => "MAX_LENGTH",
            MetricType::MinLength => "MIN_LENGTH",
            MetricType::LongestString => "LONGEST_STRING",
            MetricType::ShortestString => "SHORTEST_STRING",
            MetricType::EmptyCount => "EMPTY_COUNT",
            MetricType::PercEmptyValues => "PERC_EMPTY_VALUES",
            MetricType::TrueCount => "TRUE_COUNT",
            MetricType::FalseCount => "FALSE_COUNT",
            MetricType::MinDate => "MIN_DATE",
            MetricType::MaxDate => "MAX_DATE",
            MetricType::MinTimestamp => "MIN_TIMESTAMP",
            MetricType::MaxTimestamp => "MAX_TIMESTAMP",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the profile output table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRow {
    pub column_name: String,
    pub metric_type: MetricType,
    pub metric_value: String,
}

impl OutputRow {
    fn new(column_name: &str, metric_type: MetricType, metric_value: impl ToString) -> Self {
        Self {
            column_name: column_name.to_string(),
            metric_type,
            metric_value: metric_value.to_string(),
        }
    }
}

/// Renders a ranking as `rank<F>value<F>count<R>` entries, ranks from 1 and
/// the null sentinel as `null`.
pub fn render_top_n(items: &[TopNDataItem], output: &OutputConfig) -> String {
    let mut rendered = String::new();
    for (rank, item) in items.iter().enumerate() {
        let value = item
            .value
            .as_ref()
            .map_or_else(|| "null".to_string(), ToString::to_string);
        rendered.push_str(&format!(
            "{}{f}{value}{f}{}{r}",
            rank + 1,
            item.count,
            f = output.field_delimiter,
            r = output.record_delimiter
        ));
    }
    rendered
}

struct RowWriter<'a> {
    column: &'a str,
    rows: Vec<OutputRow>,
}

impl RowWriter<'_> {
    fn push(&mut self, metric_type: MetricType, value: impl ToString) {
        self.rows.push(OutputRow::new(self.column, metric_type, value));
    }

    fn push_opt<T: ToString>(&mut self, metric_type: MetricType, value: Option<T>) {
        if let Some(value) = value {
            self.push(metric_type, value);
        }
    }
}

fn column_rows(profile: &ColumnProfile, output: &OutputConfig) -> Vec<OutputRow> {
    let mut w = RowWriter {
        column: &profile.column().name,
        rows: Vec::new(),
    };

    w.push(MetricType::ColumnDatatype, profile.logical_type());
    w.push(MetricType::TotalCount, profile.total_count());
    w.push(MetricType::NullCount, profile.null_count());
    w.push(MetricType::UniqueCount, profile.unique_count());
    w.push_opt(MetricType::PercNullValues, profile.perc_null());
    w.push_opt(MetricType::PercUniqueValues, profile.perc_unique());
    w.push_opt(MetricType::PercDuplicateValues, profile.perc_duplicate());
    w.push(MetricType::TopNValues, render_top_n(&profile.top_n(), output));

    match profile.accumulator() {
        Accumulator::Numeric(acc) => {
            w.push_opt(MetricType::Min, acc.min());
            w.push_opt(MetricType::Max, acc.max());
            if acc.count() > 0 {
                w.push(MetricType::Sum, acc.sum());
            }
            w.push_opt(MetricType::Mean, acc.mean());
            w.push_opt(MetricType::Stddev, acc.stddev());
            w.push_opt(MetricType::Variance, acc.variance());
        }
        Accumulator::Categorical(acc) => match acc.summary() {
            CategoricalSummary::String(summary) => {
                w.push_opt(MetricType::MaxLength, summary.max_length);
                w.push_opt(MetricType::MinLength, summary.min_length);
                w.push_opt(MetricType::LongestString, summary.longest.as_deref());
                w.push_opt(MetricType::ShortestString, summary.shortest.as_deref());
                w.push(MetricType::EmptyCount, summary.empty_count);
                if profile.total_count() > 0 {
                    w.push(
                        MetricType::PercEmptyValues,
                        summary.empty_count as f64 * 100.0 / profile.total_count() as f64,
                    );
                }
            }
            CategoricalSummary::Boolean {
                true_count,
                false_count,
            } => {
                w.push(MetricType::TrueCount, true_count);
                w.push(MetricType::FalseCount, false_count);
            }
            CategoricalSummary::Date { min, max } => {
                w.push_opt(MetricType::MinDate, *min);
                w.push_opt(MetricType::MaxDate, *max);
            }
            CategoricalSummary::Timestamp { min, max } => {
                w.push_opt(MetricType::MinTimestamp, *min);
                w.push_opt(MetricType::MaxTimestamp, *max);
            }
        },
    }

    w.rows
}

impl DatasetProfile {
    /// Output rows with the default delimiters.
    pub fn to_output_rows(&self) -> Vec<OutputRow> {
        self.to_output_rows_with(&OutputConfig::default())
    }

    /// Output rows: the dataset row count first, then every column's metrics
    /// in column order. Undefined statistics are omitted.
    pub fn to_output_rows_with(&self, output: &OutputConfig) -> Vec<OutputRow> {
        let mut rows = vec![OutputRow::new(
            ALL_COLUMNS,
            MetricType::TotalCount,
            self.row_count(),
        )];
        for profile in self.columns() {
            rows.extend(column_rows(profile, output));
        }
        rows
    }

    /// The output rows as a `column_name`, `metric_type`, `metric_value`
    /// record batch of Utf8 columns.
    pub fn to_record_batch(&self, output: &OutputConfig) -> ProfileResult<RecordBatch> {
        let rows = self.to_output_rows_with(output);
        let schema = Arc::new(Schema::new(vec![
            Field::new("column_name", DataType::Utf8, false),
            Field::new("metric_type", DataType::Utf8, false),
            Field::new("metric_value", DataType::Utf8, false),
        ]));

        let column_names: StringArray = rows.iter().map(|r| Some(r.column_name.as_str())).collect();
        let metric_types: StringArray = rows.iter().map(|r| Some(r.metric_type.as_str())).collect();
        let metric_values: StringArray =
            rows.iter().map(|r| Some(r.metric_value.as_str())).collect();

        Ok(RecordBatch::try_new(
            schema,
            vec![
                Arc::new(column_names),
                Arc::new(metric_types),
                Arc::new(metric_values),
            ],
        )?)
    }
}

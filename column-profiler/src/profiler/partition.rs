//! Single-pass profiling of one partition.

use arrow::record_batch::RecordBatch;
use tracing::{debug, instrument, warn};

use crate::logging::{truncate_field, LogConfig};
use crate::sources::{column_values, logical_type_for};

use super::column::{ColumnProfile, Observed};
use super::config::ProfilerConfig;
use super::dataset::DatasetProfile;
use super::errors::{ProfileError, ProfileResult};
use super::types::{ColumnId, LogicalType, ProfileSchema, Value};

/// Folds the rows of one partition into a [`DatasetProfile`].
///
/// A partition is owned by a single profiler and observed on one thread.
/// Cells whose type differs from the declared column type are counted as
/// nulls and reported as data-quality warnings; they never fail the run.
#[derive(Debug)]
pub struct PartitionProfiler {
    schema: ProfileSchema,
    log: LogConfig,
    profile: DatasetProfile,
}

impl PartitionProfiler {
    /// Creates a profiler with one empty column profile per schema column.
    pub fn new(schema: ProfileSchema, config: &ProfilerConfig) -> ProfileResult<Self> {
        config.validate()?;

        let mut profile = DatasetProfile::new();
        for column in schema.columns() {
            profile.insert_column(ColumnProfile::new(
                column.id.clone(),
                column.logical_type,
                config.top_n,
                config.top_n_high_water_mark,
            )?);
        }

        Ok(Self {
            schema,
            log: config.log.clone(),
            profile,
        })
    }

    pub fn schema(&self) -> &ProfileSchema {
        &self.schema
    }

    /// The profile of the rows observed so far.
    pub fn profile(&self) -> &DatasetProfile {
        &self.profile
    }

    /// Observes one row holding a cell per schema column, in schema order.
    pub fn observe_row(&mut self, row: Vec<Option<Value>>) -> ProfileResult<()> {
        if row.len() != self.schema.len() {
            return Err(ProfileError::invalid_data(format!(
                "row has {} values but the schema has {} columns",
                row.len(),
                self.schema.len()
            )));
        }

        for (index, value) in row.into_iter().enumerate() {
            let column = &self.schema.columns()[index];
            let id = column.id.clone();
            let expected = column.logical_type;
            self.observe_cell(&id, expected, value)?;
        }
        self.profile.add_rows(1);
        Ok(())
    }

    /// Observes every row of a record batch. Batch columns are matched to
    /// the schema by name; extra batch columns are ignored.
    ///
    /// Every cell is read before any is observed, so a batch that cannot be
    /// read leaves the profile untouched.
    #[instrument(level = "debug", skip_all, fields(rows = batch.num_rows()))]
    pub fn observe_batch(&mut self, batch: &RecordBatch) -> ProfileResult<()> {
        let mut columns = Vec::with_capacity(self.schema.len());
        for column in self.schema.columns() {
            let array = batch.column_by_name(&column.id.name).ok_or_else(|| {
                ProfileError::invalid_data(format!(
                    "record batch has no column '{}'",
                    column.id.name
                ))
            })?;
            if logical_type_for(array.data_type()).is_none() {
                return Err(ProfileError::invalid_data(format!(
                    "column '{}' has unsupported Arrow type {}",
                    column.id.name,
                    array.data_type()
                )));
            }
            let values = column_values(array.as_ref())?;
            columns.push((column.id.clone(), column.logical_type, values));
        }

        for (id, expected, values) in columns.iter_mut() {
            for value in values.drain(..) {
                self.observe_cell(id, *expected, value)?;
            }
        }

        self.profile.add_rows(batch.num_rows() as u64);
        debug!(
            columns = columns.len(),
            total_rows = self.profile.row_count(),
            "Observed record batch"
        );
        Ok(())
    }

    /// Hands over the partition's profile.
    pub fn finish(self) -> DatasetProfile {
        self.profile
    }

    fn observe_cell(
        &mut self,
        id: &ColumnId,
        expected: LogicalType,
        value: Option<Value>,
    ) -> ProfileResult<()> {
        let shown = match &value {
            Some(v) if v.logical_type() != expected => Some(v.to_string()),
            _ => None,
        };

        let column = self
            .profile
            .column_mut(id)
            .ok_or_else(|| ProfileError::invalid_data(format!("column '{id}' is not profiled")))?;

        if let Observed::Mismatch { found } = column.observe(value) {
            let first = self.profile.record_mismatch(id, expected, found, 1);
            let shown = truncate_field(shown.as_deref().unwrap_or(""), self.log.max_field_length);
            if first && self.log.log_data_quality_warnings {
                warn!(
                    column = %id,
                    expected = %expected,
                    found = %found,
                    value = %shown,
                    "Value does not match the declared column type; counting it as null"
                );
            } else {
                debug!(
                    column = %id,
                    expected = %expected,
                    found = %found,
                    value = %shown,
                    "Type mismatch counted as null"
                );
            }
        }
        Ok(())
    }
}

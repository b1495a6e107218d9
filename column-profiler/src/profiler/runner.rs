//! Profiling DataFusion plans partition by partition.

use datafusion::physical_plan::SendableRecordBatchStream;
use datafusion::prelude::{DataFrame, SessionContext};
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info, instrument};

use crate::sources::schema_from_arrow;

use super::config::ProfilerConfig;
use super::dataset::DatasetProfile;
use super::errors::{ProfileError, ProfileResult};
use super::partition::PartitionProfiler;
use super::reducer::ProfileReducer;
use super::types::ProfileSchema;

/// Profiles a DataFusion plan by giving each of its output partitions to a
/// [`PartitionProfiler`] on its own Tokio task and tree-reducing the
/// partition profiles.
///
/// # Example
///
/// ```rust,no_run
/// use column_profiler::profiler::{ProfileRunner, ProfilerConfig};
/// use datafusion::prelude::*;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let ctx = SessionContext::new();
/// ctx.register_csv("students", "students.csv", CsvReadOptions::new()).await?;
///
/// let runner = ProfileRunner::new(ProfilerConfig::builder().top_n(5).build()?);
/// let profile = runner.profile_table(&ctx, "students").await?;
/// for row in profile.to_output_rows() {
///     println!("{} {} {}", row.column_name, row.metric_type, row.metric_value);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ProfileRunner {
    config: ProfilerConfig,
    reducer: ProfileReducer,
}

impl ProfileRunner {
    pub fn new(config: ProfilerConfig) -> Self {
        let reducer = ProfileReducer::new(config.log.clone());
        Self { config, reducer }
    }

    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    /// Profiles a table registered with `ctx`.
    #[instrument(skip(self, ctx))]
    pub async fn profile_table(
        &self,
        ctx: &SessionContext,
        table: &str,
    ) -> ProfileResult<DatasetProfile> {
        let df = ctx.table(table).await?;
        self.profile_dataframe(df).await
    }

    /// Profiles every row a DataFrame produces.
    ///
    /// Columns whose Arrow type has no logical type are skipped.
    #[instrument(skip_all)]
    pub async fn profile_dataframe(&self, df: DataFrame) -> ProfileResult<DatasetProfile> {
        self.config.validate()?;
        let schema = schema_from_arrow(df.schema().as_arrow())?;
        let streams = df.execute_stream_partitioned().await?;

        info!(
            partitions = streams.len(),
            columns = schema.len(),
            max_concurrent = self.config.max_concurrent_partitions,
            "Profiling dataframe"
        );

        let tasks = streams.into_iter().enumerate().map(|(partition, stream)| {
            let schema = schema.clone();
            let config = self.config.clone();
            async move {
                let profile =
                    tokio::spawn(profile_partition(partition, stream, schema, config)).await??;
                Ok::<_, ProfileError>(profile)
            }
        });

        let mut profiles: Vec<DatasetProfile> = stream::iter(tasks)
            .buffered(self.config.max_concurrent_partitions)
            .try_collect()
            .await?;
        if profiles.is_empty() {
            // Plans without partitions still report every column
            profiles.push(PartitionProfiler::new(schema, &self.config)?.finish());
        }

        let profile = self.reducer.tree_reduce(profiles)?;
        info!(
            rows = profile.row_count(),
            warnings = profile.warnings().len(),
            "Profiling complete"
        );
        Ok(profile)
    }
}

#[instrument(level = "debug", skip(stream, schema, config))]
async fn profile_partition(
    partition: usize,
    mut stream: SendableRecordBatchStream,
    schema: ProfileSchema,
    config: ProfilerConfig,
) -> ProfileResult<DatasetProfile> {
    let mut profiler = PartitionProfiler::new(schema, &config)?;
    while let Some(batch) = stream.next().await {
        profiler.observe_batch(&batch?)?;
    }

    let profile = profiler.finish();
    debug!(rows = profile.row_count(), "Partition profiled");
    Ok(profile)
}

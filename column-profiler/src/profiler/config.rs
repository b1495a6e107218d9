//! Profiler configuration and its builder.

use crate::logging::LogConfig;

use super::errors::{ProfileError, ProfileResult};
use super::top_n::{DEFAULT_HIGH_WATER_MARK, DEFAULT_TOP_N};

/// Delimiters used when rendering top-N lists into output rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Separates rank, value and count within one entry
    pub field_delimiter: String,
    /// Terminates each entry
    pub record_delimiter: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            field_delimiter: "\u{1}".to_string(),
            record_delimiter: "\u{2}".to_string(),
        }
    }
}

/// Configuration for profiling runs.
#[derive(Debug, Clone)]
pub struct ProfilerConfig {
    /// Number of most frequent values reported per column
    pub top_n: usize,
    /// Distinct values a top-N tracker retains before evicting
    pub top_n_high_water_mark: usize,
    /// Partitions profiled concurrently by the runner
    pub max_concurrent_partitions: usize,
    pub output: OutputConfig,
    pub log: LogConfig,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            top_n_high_water_mark: DEFAULT_HIGH_WATER_MARK,
            max_concurrent_partitions: num_cpus::get(),
            output: OutputConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl ProfilerConfig {
    /// Create a new builder starting from the defaults
    pub fn builder() -> ProfilerConfigBuilder {
        ProfilerConfigBuilder {
            config: ProfilerConfig::default(),
        }
    }

    /// Checks the configuration for values no profile can be built with.
    pub fn validate(&self) -> ProfileResult<()> {
        if self.top_n == 0 {
            return Err(ProfileError::invalid_config("top_n must be at least 1"));
        }
        if self.top_n_high_water_mark < self.top_n {
            return Err(ProfileError::invalid_config(format!(
                "top_n_high_water_mark ({}) must not be below top_n ({})",
                self.top_n_high_water_mark, self.top_n
            )));
        }
        if self.max_concurrent_partitions == 0 {
            return Err(ProfileError::invalid_config(
                "max_concurrent_partitions must be at least 1",
            ));
        }
        if self.output.field_delimiter.is_empty() || self.output.record_delimiter.is_empty() {
            return Err(ProfileError::invalid_config("output delimiters must not be empty"));
        }
        if self.output.field_delimiter == self.output.record_delimiter {
            return Err(ProfileError::invalid_config(
                "field and record delimiters must differ",
            ));
        }
        Ok(())
    }
}

/// Builder for [`ProfilerConfig`]
#[derive(Debug, Clone)]
pub struct ProfilerConfigBuilder {
    config: ProfilerConfig,
}

impl ProfilerConfigBuilder {
    /// Set the number of most frequent values reported per column
    pub fn top_n(mut self, n: usize) -> Self {
        self.config.top_n = n;
        self
    }

    /// Set how many distinct values a top-N tracker keeps before evicting
    pub fn top_n_high_water_mark(mut self, mark: usize) -> Self {
        self.config.top_n_high_water_mark = mark;
        self
    }

    /// Set the number of partitions profiled at once
    pub fn max_concurrent_partitions(mut self, partitions: usize) -> Self {
        self.config.max_concurrent_partitions = partitions;
        self
    }

    /// Set the delimiters of rendered top-N lists
    pub fn output_delimiters(
        mut self,
        field_delimiter: impl Into<String>,
        record_delimiter: impl Into<String>,
    ) -> Self {
        self.config.output = OutputConfig {
            field_delimiter: field_delimiter.into(),
            record_delimiter: record_delimiter.into(),
        };
        self
    }

    pub fn log_config(mut self, log: LogConfig) -> Self {
        self.config.log = log;
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> ProfileResult<ProfilerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProfilerConfig::builder().build().unwrap();
        assert_eq!(config.top_n, 3);
        assert_eq!(config.top_n_high_water_mark, 10_000);
        assert!(config.max_concurrent_partitions >= 1);
        assert_eq!(config.output.field_delimiter, "\u{1}");
        assert_eq!(config.output.record_delimiter, "\u{2}");
    }

    #[test]
    fn test_builder_overrides() {
        let config = ProfilerConfig::builder()
            .top_n(10)
            .top_n_high_water_mark(50)
            .max_concurrent_partitions(2)
            .output_delimiters("|", ";")
            .build()
            .unwrap();
        assert_eq!(config.top_n, 10);
        assert_eq!(config.top_n_high_water_mark, 50);
        assert_eq!(config.max_concurrent_partitions, 2);
        assert_eq!(config.output.field_delimiter, "|");
    }

    #[test]
    fn test_invalid_configurations() {
        assert!(ProfilerConfig::builder().top_n(0).build().is_err());
        assert!(ProfilerConfig::builder()
            .top_n(5)
            .top_n_high_water_mark(4)
            .build()
            .is_err());
        assert!(ProfilerConfig::builder()
            .max_concurrent_partitions(0)
            .build()
            .is_err());
        assert!(ProfilerConfig::builder()
            .output_delimiters(",", ",")
            .build()
            .is_err());
    }
}

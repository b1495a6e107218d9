//! Error types for the profiling engine.

use thiserror::Error;

/// Result type for profiler operations.
pub type ProfileResult<T> = Result<T, ProfileError>;

/// Errors that can occur while observing, merging or publishing profiles.
///
/// Schema mismatches in the data are deliberately absent: a value of the
/// wrong logical type is demoted to null and reported as a
/// [`DataQualityWarning`](crate::profiler::DataQualityWarning) instead.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// Two profiles describe the same column with different declared types
    /// or different top-N capacities.
    #[error("Incompatible merge: {0}")]
    IncompatibleMerge(String),

    /// A merge that cannot be carried out with the state at hand.
    #[error("Failed to merge states: {0}")]
    StateMerge(String),

    /// DataFusion query execution error.
    #[error("Query execution failed: {0}")]
    QueryExecution(#[from] datafusion::error::DataFusionError),

    /// Arrow computation error.
    #[error("Arrow computation failed: {0}")]
    ArrowComputation(#[from] arrow::error::ArrowError),

    /// Invalid configuration or parameters.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Input whose shape does not fit the schema.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A partition task panicked or was cancelled.
    #[error("Partition task failed: {0}")]
    TaskJoin(String),
}

impl ProfileError {
    /// Creates an incompatible merge error with the given message.
    pub fn incompatible_merge(msg: impl Into<String>) -> Self {
        Self::IncompatibleMerge(msg.into())
    }

    /// Creates a state merge error with the given message.
    pub fn state_merge(msg: impl Into<String>) -> Self {
        Self::StateMerge(msg.into())
    }

    /// Creates an invalid configuration error with the given message.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Creates an invalid data error with the given message.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }
}

/// Converts serde_json errors to ProfileError.
impl From<serde_json::Error> for ProfileError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Converts task join failures to ProfileError.
impl From<tokio::task::JoinError> for ProfileError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskJoin(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ProfileError::incompatible_merge("column 'age': short vs string");
        assert_eq!(
            err.to_string(),
            "Incompatible merge: column 'age': short vs string"
        );

        let err = ProfileError::invalid_config("top_n must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: top_n must be at least 1"
        );
    }

    #[test]
    fn test_serde_json_conversion() {
        let parse_err = serde_json::from_str::<u64>("not a number").unwrap_err();
        let err: ProfileError = parse_err.into();
        assert!(matches!(err, ProfileError::Serialization(_)));
    }
}

//! Error types for attrsql

use thiserror::Error;

/// Result type alias for attrsql operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for mapping and statement execution
#[derive(Debug, Error)]
pub enum OrmError {
    /// An entity type, table, column, or attribute could not be resolved
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// The configured metadata-resolution strategy could not be built
    #[error("Mapper factory error: {0}")]
    MapperFactory(String),

    /// A "must return exactly one" read returned zero or more than one row
    #[error("Bad result count: expected {expected}, got {got}")]
    BadCount { expected: usize, got: usize },

    /// Statement execution error reported by the storage driver
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Builder or driver-boundary validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl OrmError {
    /// Create a mapping error
    pub fn mapping(message: impl Into<String>) -> Self {
        Self::Mapping(message.into())
    }

    /// Create a mapper factory error
    pub fn mapper_factory(message: impl Into<String>) -> Self {
        Self::MapperFactory(message.into())
    }

    /// Create a bad-count error
    pub fn bad_count(expected: usize, got: usize) -> Self {
        Self::BadCount { expected, got }
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is a mapping error
    pub fn is_mapping(&self) -> bool {
        matches!(self, Self::Mapping(_))
    }

    /// Check if this is a bad-count error
    pub fn is_bad_count(&self) -> bool {
        matches!(self, Self::BadCount { .. })
    }
}

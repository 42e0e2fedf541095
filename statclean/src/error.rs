//! Error types for the statclean normalization pipeline.
//!
//! - [`TableError`] - reading and decoding raw tables
//! - [`SchemaError`] - structural problems with an input table
//! - [`SpecError`] - invalid dataset configurations
//! - [`NormalizeError`] - top-level orchestration errors
//!
//! Cell-level problems (unparseable numbers, unresolvable years) are never
//! errors: they degrade to missing values inside the pipeline.

use thiserror::Error;

// =============================================================================
// Table Reading Errors
// =============================================================================

/// Errors while reading or writing a tabular file.
#[derive(Debug, Error)]
pub enum TableError {
    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input contained no lines after the skipped preamble.
    #[error("Table is empty")]
    Empty,

    /// Header row produced no column names.
    #[error("No headers found")]
    NoHeaders,

    /// Malformed CSV record.
    #[error("Line {line}: {message}")]
    Parse { line: u64, message: String },

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A named table is not available from the source.
    #[error("Table not found: {0}")]
    NotFound(String),
}

// =============================================================================
// Schema Errors
// =============================================================================

/// Structural problems with an input table. Always fatal for the dataset.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// One or more required columns are absent.
    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

// =============================================================================
// Dataset Spec Errors
// =============================================================================

/// Errors in a dataset configuration.
#[derive(Debug, Error)]
pub enum SpecError {
    /// Unknown built-in dataset name.
    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),

    /// Options that cannot be combined.
    #[error("Invalid dataset spec '{name}': {message}")]
    Invalid { name: String, message: String },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Normalize Errors (top-level)
// =============================================================================

/// Top-level error returned by [`crate::run_dataset`].
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// Reading or writing failed.
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    /// Input table is structurally unusable.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Dataset configuration is invalid.
    #[error("Spec error: {0}")]
    Spec(#[from] SpecError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for table I/O.
pub type TableResult<T> = Result<T, TableError>;

/// Result type for schema checks.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for normalization runs.
pub type NormalizeResult<T> = Result<T, NormalizeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let schema_err = SchemaError::MissingColumns(vec!["Value".into()]);
        let err: NormalizeError = schema_err.into();
        assert!(err.to_string().contains("Value"));

        let table_err = TableError::Empty;
        let err: NormalizeError = table_err.into();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_missing_columns_lists_all() {
        let err = SchemaError::MissingColumns(vec!["Area".into(), "Value".into()]);
        assert_eq!(err.to_string(), "Missing required column(s): Area, Value");
    }

    #[test]
    fn test_parse_error_format() {
        let err = TableError::Parse {
            line: 7,
            message: "unterminated quote".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Line 7"));
        assert!(msg.contains("unterminated quote"));
    }
}

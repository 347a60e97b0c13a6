//! Error types for lelnovo.
//!
//! Errors are strongly typed using thiserror so callers can match on
//! specific conditions. Query terms that fail to parse and part lookups
//! that find nothing are *not* errors; they are reported as values by the
//! query and lookup modules.

use std::path::PathBuf;

use thiserror::Error;

/// Catalog or configuration content that breaks a documented invariant.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Catalog total is {declared} but {actual} parts are present")]
    TotalMismatch {
        declared: usize,
        actual: usize,
    },

    #[error("Brand '{brand}' has no product lines")]
    EmptyBrand {
        brand: String,
    },

    #[error("Product line '{brand}/{line}' has no parts")]
    EmptyProductLine {
        brand: String,
        line: String,
    },

    #[error("Part in '{brand}/{line}' is missing required field '{field}'")]
    MissingField {
        brand: String,
        line: String,
        field: String,
    },

    #[error("Part '{part_number}' has numeric spec '{spec}' not listed in catalog keys")]
    UnknownNumericSpec {
        part_number: String,
        spec: String,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },
}

/// Failures reading or writing persisted snapshots and config files.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode catalog '{}': {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode catalog: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to parse config '{}': {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Catalog lock poisoned")]
    Poisoned,
}

/// Query evaluation failures surfaced to the caller.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum QueryError {
    /// The query contained no usable terms.
    ///
    /// Distinct from a valid query that matched nothing.
    #[error("Query has no usable terms")]
    EmptyQuery,
}

/// Top-level error type for lelnovo.
#[derive(Debug, Error)]
pub enum LelnovoError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),
}

impl LelnovoError {
    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a storage error.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Returns true if this is a query error.
    #[must_use]
    pub const fn is_query(&self) -> bool {
        matches!(self, Self::Query(_))
    }
}

/// Result type alias for lelnovo operations.
pub type LelnovoResult<T> = Result<T, LelnovoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_total_mismatch() {
        let err = ValidationError::TotalMismatch {
            declared: 3,
            actual: 2,
        };
        let msg = format!("{err}");
        assert!(msg.contains('3'));
        assert!(msg.contains('2'));
    }

    #[test]
    fn test_validation_error_missing_field() {
        let err = ValidationError::MissingField {
            brand: "thinkpadx1".to_string(),
            line: "22TP2X1X1C9".to_string(),
            field: "part number".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("thinkpadx1/22TP2X1X1C9"));
        assert!(msg.contains("part number"));
    }

    #[test]
    fn test_storage_error_io_includes_path() {
        let err = StorageError::Io {
            path: PathBuf::from("dbs/db_us.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let msg = format!("{err}");
        assert!(msg.contains("dbs/db_us.json"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn test_query_error_display() {
        assert_eq!(format!("{}", QueryError::EmptyQuery), "Query has no usable terms");
    }

    #[test]
    fn test_lelnovo_error_from_conversions() {
        let err: LelnovoError = QueryError::EmptyQuery.into();
        assert!(err.is_query());
        assert!(!err.is_storage());

        let err: LelnovoError = ValidationError::EmptyBrand {
            brand: "yoga".to_string(),
        }
        .into();
        assert!(err.is_validation());

        let err: LelnovoError = StorageError::Poisoned.into();
        assert!(err.is_storage());
    }
}

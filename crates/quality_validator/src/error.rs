//! Diagnostics for failed rule evaluations.

use thiserror::Error;

/// Why a single rule did not hold for a batch.
///
/// The `Display` form becomes the per-rule message of the result record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleViolation {
    /// Column referenced by the rule does not exist
    #[error("Column '{0}' does not exist")]
    MissingColumn(String),

    /// Columns are present but not in the expected order
    #[error("Columns {actual:?} do not match expected list {expected:?}")]
    ColumnOrder {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// Column set differs from the expected set
    #[error("Column set mismatch: missing {missing:?}, unexpected {unexpected:?}")]
    ColumnSet {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    /// Row count outside the allowed range
    #[error("Row count {count} is outside [{min}, {max}]")]
    RowCountOutOfRange { count: u64, min: u64, max: u64 },

    /// Column count differs from the expected count
    #[error("Expected {expected} columns, found {actual}")]
    ColumnCount { expected: u64, actual: u64 },

    /// Column holds nulls
    #[error("Column '{column}' has {count} null value(s)")]
    NullValues { column: String, count: u64 },

    /// Declared column type is not accepted
    #[error("Column '{column}' has type '{actual}', expected {expected}")]
    TypeMismatch {
        column: String,
        expected: String,
        actual: String,
    },

    /// Column values do not match a strftime format
    #[error("Column '{column}' has {count} value(s) not matching '{format}' (first: {first})")]
    FormatMismatch {
        column: String,
        format: String,
        count: u64,
        first: String,
    },

    /// Format string is not a valid strftime pattern
    #[error("'{0}' is not a valid strftime format")]
    InvalidFormat(String),

    /// Batch could not be read or reshaped
    #[error("Malformed batch: {0}")]
    MalformedBatch(String),
}

impl RuleViolation {
    /// Creates a new missing column violation.
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn(column.into())
    }

    /// Creates a new type mismatch violation.
    pub fn type_mismatch(
        column: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            column: column.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Number of offending cells, for violations that count them.
    pub fn unexpected_count(&self) -> Option<u64> {
        match self {
            Self::NullValues { count, .. } | Self::FormatMismatch { count, .. } => Some(*count),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let violation = RuleViolation::RowCountOutOfRange {
            count: 5,
            min: 10_000,
            max: 50_000,
        };
        assert_eq!(violation.to_string(), "Row count 5 is outside [10000, 50000]");
        assert_eq!(violation.unexpected_count(), None);

        let nulls = RuleViolation::NullValues {
            column: "dt".into(),
            count: 2,
        };
        assert_eq!(nulls.to_string(), "Column 'dt' has 2 null value(s)");
        assert_eq!(nulls.unexpected_count(), Some(2));
    }
}

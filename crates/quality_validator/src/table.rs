//! Table-level checks.
//!
//! These look at the shape of a batch only: its column list and its row
//! count. No cell is read.

use serde_json::Value;
use std::collections::BTreeSet;

use crate::{DataSet, Observation, RuleViolation};

/// Observed column list must equal `expected`, in order.
pub fn check_ordered_columns(dataset: &DataSet, expected: &[String]) -> Observation {
    let actual = dataset.column_names();
    let observed = Value::from(actual.clone());

    if actual.iter().copied().eq(expected.iter().map(String::as_str)) {
        Observation::holds(observed)
    } else {
        Observation::violated(
            observed,
            RuleViolation::ColumnOrder {
                expected: expected.to_vec(),
                actual: actual.into_iter().map(str::to_string).collect(),
            },
        )
    }
}

/// Observed columns must contain `expected`, and equal it when `exact_match`.
pub fn check_column_set(dataset: &DataSet, expected: &[String], exact_match: bool) -> Observation {
    let actual: BTreeSet<&str> = dataset.column_names().into_iter().collect();
    let wanted: BTreeSet<&str> = expected.iter().map(String::as_str).collect();

    let missing: Vec<String> = wanted.difference(&actual).map(|c| c.to_string()).collect();
    let unexpected: Vec<String> = if exact_match {
        actual.difference(&wanted).map(|c| c.to_string()).collect()
    } else {
        Vec::new()
    };

    let observed = Value::from(dataset.column_names());
    if missing.is_empty() && unexpected.is_empty() {
        Observation::holds(observed)
    } else {
        Observation::violated(observed, RuleViolation::ColumnSet { missing, unexpected })
    }
}

/// Row count must lie in `[min, max]`.
pub fn check_row_count(dataset: &DataSet, min: u64, max: u64) -> Observation {
    let count = dataset.len() as u64;
    if (min..=max).contains(&count) {
        Observation::holds(count)
    } else {
        Observation::violated(count, RuleViolation::RowCountOutOfRange { count, min, max })
    }
}

/// Column count must equal `expected`.
pub fn check_column_count(dataset: &DataSet, expected: u64) -> Observation {
    let actual = dataset.columns().len() as u64;
    if actual == expected {
        Observation::holds(actual)
    } else {
        Observation::violated(actual, RuleViolation::ColumnCount { expected, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ColumnSchema;

    fn dataset(columns: &[&str], rows: usize) -> DataSet {
        let mut dataset = DataSet::new(
            columns
                .iter()
                .map(|c| ColumnSchema::new(*c, "string"))
                .collect(),
        );
        for _ in 0..rows {
            dataset.add_row(Default::default());
        }
        dataset
    }

    fn names(columns: &[&str]) -> Vec<String> {
        columns.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_ordered_columns() {
        let batch = dataset(&["col1", "col2", "dt"], 0);
        assert!(check_ordered_columns(&batch, &names(&["col1", "col2", "dt"])).passed());
        assert!(!check_ordered_columns(&batch, &names(&["col2", "col1", "dt"])).passed());
        assert!(!check_ordered_columns(&batch, &names(&["col1", "col2"])).passed());
    }

    #[test]
    fn test_column_set_exact() {
        let batch = dataset(&["b", "a", "extra"], 0);
        let observation = check_column_set(&batch, &names(&["a", "b"]), true);
        assert_eq!(
            observation.violation,
            Some(RuleViolation::ColumnSet {
                missing: vec![],
                unexpected: vec!["extra".into()],
            })
        );
        assert!(check_column_set(&batch, &names(&["a", "b", "extra"]), true).passed());
    }

    #[test]
    fn test_column_set_subset() {
        let batch = dataset(&["b", "a", "extra"], 0);
        assert!(check_column_set(&batch, &names(&["a", "b"]), false).passed());

        let observation = check_column_set(&batch, &names(&["a", "zzz"]), false);
        assert_eq!(
            observation.violation,
            Some(RuleViolation::ColumnSet {
                missing: vec!["zzz".into()],
                unexpected: vec![],
            })
        );
    }

    #[test]
    fn test_row_count_bounds_are_inclusive() {
        assert!(check_row_count(&dataset(&["a"], 3), 3, 5).passed());
        assert!(check_row_count(&dataset(&["a"], 5), 3, 5).passed());
        assert!(!check_row_count(&dataset(&["a"], 6), 3, 5).passed());
        assert!(check_row_count(&dataset(&["a"], 0), 0, 0).passed());
    }

    #[test]
    fn test_column_count() {
        let batch = dataset(&["a", "b"], 1);
        assert!(check_column_count(&batch, 2).passed());
        let observation = check_column_count(&batch, 3);
        assert_eq!(observation.observed_value, Some(Value::from(2)));
        assert!(!observation.passed());
    }
}

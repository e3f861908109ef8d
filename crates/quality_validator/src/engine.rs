//! Main evaluation engine.
//!
//! This module provides the [`DataSetEvaluator`] that runs every rule of a
//! suite against an in-memory [`DataSet`] and reports one outcome per rule.

use quality_core::{Check, EvaluationOutcome, Evaluator, Result, Rule, RuleOutcome, Suite};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info};

use crate::{DataSet, RuleViolation, column, table};

/// What a single check saw, and why it failed if it did.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Value observed in the batch (row count, column list, ...)
    pub observed_value: Option<Value>,

    /// Failure diagnostic, `None` when the rule holds
    pub violation: Option<RuleViolation>,
}

impl Observation {
    /// The rule holds.
    pub fn holds(observed: impl Into<Value>) -> Self {
        Self {
            observed_value: Some(observed.into()),
            violation: None,
        }
    }

    /// The rule does not hold.
    pub fn violated(observed: impl Into<Value>, violation: RuleViolation) -> Self {
        Self {
            observed_value: Some(observed.into()),
            violation: Some(violation),
        }
    }

    /// The rule could not be checked at all.
    pub fn failed(violation: RuleViolation) -> Self {
        Self {
            observed_value: None,
            violation: Some(violation),
        }
    }

    /// The rule names a column the batch does not have.
    pub fn missing_column(column: &str) -> Self {
        Self::failed(RuleViolation::missing_column(column))
    }

    /// Returns true if the rule holds.
    pub fn passed(&self) -> bool {
        self.violation.is_none()
    }

    /// Attaches the observation to its rule.
    pub fn into_outcome(self, rule: Rule) -> RuleOutcome {
        match self.violation {
            None => RuleOutcome::passed(rule, self.observed_value),
            Some(violation) => {
                let outcome = RuleOutcome::failed(rule, self.observed_value, violation.to_string());
                match violation.unexpected_count() {
                    Some(count) => outcome.with_unexpected_count(count),
                    None => outcome,
                }
            }
        }
    }
}

/// In-process evaluation engine for [`DataSet`] batches.
///
/// # Example
///
/// ```rust
/// use quality_core::{Evaluator, Rule, SuiteBuilder};
/// use quality_validator::{ColumnSchema, DataSet, DataSetEvaluator};
///
/// let suite = SuiteBuilder::new("orders_suite")
///     .add(Rule::column_count_equal(1)?)
///     .add(Rule::row_count_between(1, 10)?)
///     .build()?;
/// let batch = DataSet::new(vec![ColumnSchema::new("id", "int64")]);
///
/// let outcome = DataSetEvaluator::new().evaluate(&suite, &batch, "orders_2022-06-05")?;
///
/// assert!(!outcome.success);
/// assert!(outcome.results[0].success);
/// assert!(!outcome.results[1].success);
/// # Ok::<(), quality_core::QualityError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DataSetEvaluator;

impl DataSetEvaluator {
    /// Creates a new evaluator.
    pub fn new() -> Self {
        Self
    }

    /// Checks one rule against a batch.
    pub fn check(&self, rule: &Rule, dataset: &DataSet) -> Observation {
        match rule.check() {
            Check::OrderedColumnsMatch { column_list } => {
                table::check_ordered_columns(dataset, column_list)
            }
            Check::ColumnsMatch {
                column_set,
                exact_match,
            } => table::check_column_set(dataset, column_set, *exact_match),
            Check::RowCountBetween {
                min_value,
                max_value,
            } => table::check_row_count(dataset, *min_value, *max_value),
            Check::ValuesNotNull { column } => column::check_not_null(dataset, column),
            Check::ColumnCountEqual { value } => table::check_column_count(dataset, *value),
            Check::ColumnTypeMatch { column, type_ } => {
                column::check_declared_type(dataset, column, std::slice::from_ref(type_))
            }
            Check::ColumnTypeInList { column, type_list } => {
                column::check_declared_type(dataset, column, type_list)
            }
            Check::DateTimeFormatMatch {
                column,
                strftime_format,
            } => column::check_strftime(dataset, column, strftime_format),
        }
    }
}

impl Evaluator for DataSetEvaluator {
    type Batch = DataSet;

    fn evaluate(&self, suite: &Suite, batch: &DataSet, run_name: &str) -> Result<EvaluationOutcome> {
        let start = Instant::now();

        let results: Vec<RuleOutcome> = suite
            .rules()
            .iter()
            .map(|rule| {
                let observation = self.check(rule, batch);
                debug!(
                    rule = %rule.kind(),
                    passed = observation.passed(),
                    "Checked rule"
                );
                observation.into_outcome(rule.clone())
            })
            .collect();

        let outcome = EvaluationOutcome::from_results(results);
        info!(
            run = run_name,
            rows = batch.len(),
            success = outcome.success,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Evaluated suite '{}'",
            suite.name()
        );
        Ok(outcome)
    }
}

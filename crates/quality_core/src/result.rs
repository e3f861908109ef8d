//! Validation outcomes and result records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{DataAssetName, Environment, Rule};

/// Outcome of evaluating one rule against a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleOutcome {
    /// The evaluated rule
    pub expectation_config: Rule,

    /// Whether the rule passed
    pub success: bool,

    /// What the engine observed (row count, column list, ...)
    pub observed_value: Option<Value>,

    /// Number of offending cells for column-level rules
    pub unexpected_count: Option<u64>,

    /// Diagnostic message for failed rules
    pub message: Option<String>,
}

impl RuleOutcome {
    /// Creates a passing outcome.
    pub fn passed(rule: Rule, observed_value: Option<Value>) -> Self {
        Self {
            expectation_config: rule,
            success: true,
            observed_value,
            unexpected_count: None,
            message: None,
        }
    }

    /// Creates a failing outcome with a diagnostic.
    pub fn failed(rule: Rule, observed_value: Option<Value>, message: impl Into<String>) -> Self {
        Self {
            expectation_config: rule,
            success: false,
            observed_value,
            unexpected_count: None,
            message: Some(message.into()),
        }
    }

    /// Sets the number of offending cells.
    pub fn with_unexpected_count(mut self, count: u64) -> Self {
        self.unexpected_count = Some(count);
        self
    }
}

/// Counts over the rule outcomes of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Number of rules evaluated
    pub evaluated_expectations: usize,
    /// Number of rules that passed
    pub successful_expectations: usize,
    /// Number of rules that failed
    pub unsuccessful_expectations: usize,
    /// Share of passing rules, 0.0 to 100.0
    pub success_percent: f64,
}

impl Statistics {
    /// Computes statistics from a list of outcomes.
    pub fn from_outcomes(outcomes: &[RuleOutcome]) -> Self {
        let evaluated = outcomes.len();
        let successful = outcomes.iter().filter(|o| o.success).count();
        let success_percent = if evaluated == 0 {
            100.0
        } else {
            successful as f64 * 100.0 / evaluated as f64
        };

        Self {
            evaluated_expectations: evaluated,
            successful_expectations: successful,
            unsuccessful_expectations: evaluated - successful,
            success_percent,
        }
    }
}

/// What an evaluation engine reports back for one suite and batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    /// Overall verdict
    pub success: bool,

    /// Per-rule detail, in suite order
    pub results: Vec<RuleOutcome>,

    /// Outcome counts
    pub statistics: Statistics,
}

impl EvaluationOutcome {
    /// Builds an outcome whose verdict is the conjunction of all rules.
    pub fn from_results(results: Vec<RuleOutcome>) -> Self {
        let statistics = Statistics::from_outcomes(&results);
        Self {
            success: results.iter().all(|o| o.success),
            results,
            statistics,
        }
    }
}

/// Uniquely names one execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunIdentifier {
    /// Deterministic run name, the asset identifier's string form
    pub run_name: String,

    /// When the run executed
    pub run_time: DateTime<Utc>,
}

impl RunIdentifier {
    /// Creates a run identifier for an asset at the given time.
    pub fn new(asset: &DataAssetName, run_time: DateTime<Utc>) -> Self {
        Self {
            run_name: asset.to_string(),
            run_time,
        }
    }
}

/// Immutable record of one validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Suite that was run
    pub suite_name: String,

    /// Environment the run belongs to
    pub environment: Environment,

    /// Validated asset
    pub asset_identifier: DataAssetName,

    /// Run identifier
    pub run_identifier: RunIdentifier,

    /// Overall verdict
    pub success: bool,

    /// Per-rule outcomes, in suite order
    pub results: Vec<RuleOutcome>,

    /// Outcome counts
    pub statistics: Statistics,
}

impl ValidationResult {
    /// Returns the outcomes of failed rules.
    pub fn failures(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.results.iter().filter(|o| !o.success)
    }

    /// One-line summary used in logs and alerts.
    pub fn summary(&self) -> String {
        let verdict = if self.success { "passed" } else { "failed" };
        format!(
            "Validation {verdict}: {} of {} expectations succeeded ({:.1}%)",
            self.statistics.successful_expectations,
            self.statistics.evaluated_expectations,
            self.statistics.success_percent
        )
    }
}

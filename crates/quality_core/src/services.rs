//! Capabilities the validation runner depends on.
//!
//! The runner owns the run protocol only. Loading suites, evaluating rules,
//! persisting results and delivering alerts are delegated to implementations
//! of the traits below, which keeps the runner testable with fakes.

use serde::{Deserialize, Serialize};

use crate::{
    DataAssetName, Environment, EvaluationOutcome, Result, Suite, ValidationResult,
};

/// Evaluates every rule of a suite against a batch.
///
/// # Example
///
/// ```rust
/// use quality_core::{EvaluationOutcome, Evaluator, Result, RuleOutcome, Suite};
///
/// /// Passes every rule without looking at the data.
/// struct AlwaysPass;
///
/// impl Evaluator for AlwaysPass {
///     type Batch = ();
///
///     fn evaluate(&self, suite: &Suite, _batch: &(), _run_name: &str) -> Result<EvaluationOutcome> {
///         let results = suite
///             .rules()
///             .iter()
///             .map(|rule| RuleOutcome::passed(rule.clone(), None))
///             .collect();
///         Ok(EvaluationOutcome::from_results(results))
///     }
/// }
/// ```
pub trait Evaluator {
    /// Batch representation this engine understands.
    type Batch: ?Sized;

    /// Evaluates `suite` against `batch` under the given run name.
    ///
    /// # Errors
    ///
    /// Returns [`QualityError::Evaluation`](crate::QualityError::Evaluation)
    /// when the engine cannot execute at all. Failing rules are not errors;
    /// they are reported in the outcome.
    fn evaluate(&self, suite: &Suite, batch: &Self::Batch, run_name: &str)
    -> Result<EvaluationOutcome>;
}

/// Persists and retrieves suite documents.
pub trait SuiteStore {
    /// Persists a suite, overwriting any document under the same name.
    ///
    /// Fails with a storage error unless the backend acknowledges the write.
    fn persist(&self, environment: Environment, suite: &Suite) -> Result<()>;

    /// Loads a suite by name.
    fn load(&self, environment: Environment, suite_name: &str) -> Result<Suite>;
}

/// Persists validation results.
pub trait ResultSink {
    /// Persists a result and returns a reference to the durable record.
    fn persist_result(&self, result: &ValidationResult) -> Result<String>;
}

/// Alert sent when a validation fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Suite that failed
    pub suite_name: String,

    /// Run name of the failed run
    pub run_name: String,

    /// Environment of the run
    pub environment: Environment,

    /// Validated asset
    pub asset_identifier: DataAssetName,

    /// One-line outcome summary
    pub summary: String,

    /// Diagnostics of the failed rules
    pub failed_rules: Vec<String>,

    /// Reference to the persisted result record
    pub result_location: String,
}

impl Alert {
    /// Builds an alert for a result persisted at `result_location`.
    pub fn for_result(result: &ValidationResult, result_location: impl Into<String>) -> Self {
        let failed_rules = result
            .failures()
            .map(|outcome| match &outcome.message {
                Some(message) => format!("{}: {message}", outcome.expectation_config.kind()),
                None => outcome.expectation_config.to_string(),
            })
            .collect();

        Self {
            suite_name: result.suite_name.clone(),
            run_name: result.run_identifier.run_name.clone(),
            environment: result.environment,
            asset_identifier: result.asset_identifier.clone(),
            summary: result.summary(),
            failed_rules,
            result_location: result_location.into(),
        }
    }
}

/// Delivers alerts through an external channel.
pub trait Notifier {
    /// Dispatches an alert.
    fn notify(&self, alert: &Alert) -> Result<()>;
}

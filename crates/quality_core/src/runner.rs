//! Validation runner.
//!
//! A [`ValidationRunner`] binds one suite to one batch and walks the run
//! protocol:
//!
//! ```text
//! Bound --run()--> Executed --> Passed | Failed
//! ```
//!
//! `run()` resolves the suite, delegates evaluation to the [`Evaluator`],
//! persists the result record through the [`ResultSink`] and, on failure
//! only, dispatches an [`Alert`]. The verdict comes solely from the engine;
//! alert delivery problems are logged and never change it.

use chrono::Utc;
use tracing::{error, info, info_span, warn};

use crate::{
    Alert, DataAssetName, Environment, Evaluator, Notifier, QualityError, Result, ResultSink,
    RunIdentifier, Suite, SuiteStore, ValidationResult,
};

/// Collaborators used by a runner.
pub struct RunnerServices<'a, E: Evaluator> {
    /// Evaluation engine
    pub evaluator: &'a E,
    /// Source of suite documents
    pub suites: &'a dyn SuiteStore,
    /// Destination of result records
    pub results: &'a dyn ResultSink,
    /// Alert channel
    pub notifier: &'a dyn Notifier,
}

impl<E: Evaluator> Clone for RunnerServices<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: Evaluator> Copy for RunnerServices<'_, E> {}

/// Observable phase of a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Bound to a suite and batch, not yet run
    Bound,
    /// Executed and every rule passed
    Passed,
    /// Executed and at least one rule failed
    Failed,
}

enum RunState {
    Bound,
    Executed {
        result: Box<ValidationResult>,
        location: Option<String>,
    },
}

/// Runs one suite against one batch exactly once.
///
/// # Example
///
/// ```rust,ignore
/// let mut runner = ValidationRunner::new(
///     Environment::Production,
///     DataAssetName::new("custom_table", "2022-06-05"),
///     &batch,
///     "custom_table_validation_suite",
///     services,
/// );
///
/// runner.run()?;
/// if runner.status()? {
///     write_batch(&batch)?;
/// }
/// ```
pub struct ValidationRunner<'a, E: Evaluator> {
    environment: Environment,
    asset: DataAssetName,
    batch: &'a E::Batch,
    suite_name: String,
    suite: Option<Suite>,
    services: RunnerServices<'a, E>,
    state: RunState,
}

impl<'a, E: Evaluator> ValidationRunner<'a, E> {
    /// Binds a suite name to a batch. No I/O happens until [`run`](Self::run).
    pub fn new(
        environment: Environment,
        asset: DataAssetName,
        batch: &'a E::Batch,
        suite_name: impl Into<String>,
        services: RunnerServices<'a, E>,
    ) -> Self {
        Self {
            environment,
            asset,
            batch,
            suite_name: suite_name.into(),
            suite: None,
            services,
            state: RunState::Bound,
        }
    }

    /// Supplies an in-memory suite so `run()` skips the suite store.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the suite's name differs from the
    /// bound suite name.
    pub fn with_suite(mut self, suite: Suite) -> Result<Self> {
        if suite.name() != self.suite_name {
            return Err(QualityError::configuration(
                "suite_name",
                format!(
                    "runner is bound to '{}' but was given suite '{}'",
                    self.suite_name,
                    suite.name()
                ),
            ));
        }
        self.suite = Some(suite);
        Ok(self)
    }

    /// Deterministic run name: the asset identifier's string form.
    pub fn run_name(&self) -> String {
        self.asset.to_string()
    }

    /// Returns the bound suite name.
    pub fn suite_name(&self) -> &str {
        &self.suite_name
    }

    /// Executes the suite against the batch and returns the verdict.
    ///
    /// # Errors
    ///
    /// - Suite store failures and engine failures are returned unchanged and
    ///   leave the runner bound.
    /// - A result sink failure is returned after the runner has moved to its
    ///   executed phase, so [`status`](Self::status) still reports the verdict.
    /// - Calling `run()` a second time returns [`QualityError::AlreadyExecuted`].
    pub fn run(&mut self) -> Result<bool> {
        let run_name = self.run_name();
        if matches!(self.state, RunState::Executed { .. }) {
            return Err(QualityError::AlreadyExecuted(run_name));
        }

        let span = info_span!(
            "validation_run",
            suite = %self.suite_name,
            run = %run_name,
            environment = %self.environment
        );
        let _guard = span.enter();

        let suite = match self.suite.take() {
            Some(suite) => suite,
            None => self
                .services
                .suites
                .load(self.environment, &self.suite_name)?,
        };

        info!(rules = suite.len(), "Running validation");
        let evaluated = self
            .services
            .evaluator
            .evaluate(&suite, self.batch, &run_name);
        self.suite = Some(suite);
        let outcome = evaluated?;

        let result = ValidationResult {
            suite_name: self.suite_name.clone(),
            environment: self.environment,
            asset_identifier: self.asset.clone(),
            run_identifier: RunIdentifier::new(&self.asset, Utc::now()),
            success: outcome.success,
            results: outcome.results,
            statistics: outcome.statistics,
        };
        info!(success = result.success, "{}", result.summary());

        let persisted = self.services.results.persist_result(&result);
        let location = match &persisted {
            Ok(location) => Some(location.clone()),
            Err(e) => {
                error!(error = %e, "Failed to persist validation result");
                None
            }
        };

        if !result.success {
            let reference = location.as_deref().unwrap_or("<result not persisted>");
            self.dispatch_alert(&Alert::for_result(&result, reference));
        }

        let success = result.success;
        self.state = RunState::Executed {
            result: Box::new(result),
            location,
        };

        persisted.map(|_| success)
    }

    fn dispatch_alert(&self, alert: &Alert) {
        match self.services.notifier.notify(alert) {
            Ok(()) => info!(location = %alert.result_location, "Failure alert dispatched"),
            Err(e) => warn!(error = %e, "Failure alert could not be dispatched"),
        }
    }

    /// Returns the verdict of the executed run.
    ///
    /// # Errors
    ///
    /// Returns [`QualityError::NotExecuted`] if `run()` has not completed.
    pub fn status(&self) -> Result<bool> {
        self.result().map(|result| result.success)
    }

    /// Returns the result record of the executed run.
    pub fn result(&self) -> Result<&ValidationResult> {
        match &self.state {
            RunState::Executed { result, .. } => Ok(result.as_ref()),
            RunState::Bound => Err(QualityError::NotExecuted),
        }
    }

    /// Returns the reference to the persisted record, if persisting succeeded.
    pub fn result_location(&self) -> Option<&str> {
        match &self.state {
            RunState::Executed { location, .. } => location.as_deref(),
            RunState::Bound => None,
        }
    }

    /// Returns the current phase.
    pub fn phase(&self) -> RunPhase {
        match &self.state {
            RunState::Bound => RunPhase::Bound,
            RunState::Executed { result, .. } if result.success => RunPhase::Passed,
            RunState::Executed { .. } => RunPhase::Failed,
        }
    }
}

//! Tests for the run/decide/act protocol of the validation runner.
//!
//! Every collaborator is faked so the tests observe exactly how often the
//! runner loads, evaluates, persists and alerts.

use quality_core::{
    Alert, DataAssetName, Environment, EvaluationOutcome, Evaluator, Notifier, QualityError,
    Result, ResultSink, Rule, RuleOutcome, RunPhase, RunnerServices, Suite, SuiteBuilder,
    SuiteStore, ValidationResult, ValidationRunner,
};
use std::cell::{Cell, RefCell};

/// Batch stand-in: just a row count.
struct RowCount(u64);

/// Evaluates only row count rules; everything else passes.
#[derive(Default)]
struct CountingEvaluator {
    calls: Cell<usize>,
    fail_with: Option<String>,
}

impl Evaluator for CountingEvaluator {
    type Batch = RowCount;

    fn evaluate(&self, suite: &Suite, batch: &RowCount, _run_name: &str) -> Result<EvaluationOutcome> {
        self.calls.set(self.calls.get() + 1);
        if let Some(message) = &self.fail_with {
            return Err(QualityError::evaluation(message.clone()));
        }

        let results = suite
            .rules()
            .iter()
            .map(|rule| match rule.check() {
                quality_core::Check::RowCountBetween {
                    min_value,
                    max_value,
                } if !(*min_value..=*max_value).contains(&batch.0) => RuleOutcome::failed(
                    rule.clone(),
                    Some(batch.0.into()),
                    format!("row count {} outside [{min_value}, {max_value}]", batch.0),
                ),
                _ => RuleOutcome::passed(rule.clone(), None),
            })
            .collect();

        Ok(EvaluationOutcome::from_results(results))
    }
}

#[derive(Default)]
struct FakeSuiteStore {
    suites: RefCell<Vec<Suite>>,
    loads: Cell<usize>,
}

impl SuiteStore for FakeSuiteStore {
    fn persist(&self, _environment: Environment, suite: &Suite) -> Result<()> {
        self.suites.borrow_mut().push(suite.clone());
        Ok(())
    }

    fn load(&self, _environment: Environment, suite_name: &str) -> Result<Suite> {
        self.loads.set(self.loads.get() + 1);
        self.suites
            .borrow()
            .iter()
            .find(|suite| suite.name() == suite_name)
            .cloned()
            .ok_or_else(|| QualityError::evaluation(format!("suite '{suite_name}' not found")))
    }
}

#[derive(Default)]
struct FakeSink {
    records: RefCell<Vec<ValidationResult>>,
    broken: bool,
}

impl ResultSink for FakeSink {
    fn persist_result(&self, result: &ValidationResult) -> Result<String> {
        if self.broken {
            return Err(QualityError::storage("HTTP status 503"));
        }
        self.records.borrow_mut().push(result.clone());
        Ok(format!("memory://results/{}", result.run_identifier.run_name))
    }
}

#[derive(Default)]
struct FakeNotifier {
    alerts: RefCell<Vec<Alert>>,
    broken: bool,
}

impl Notifier for FakeNotifier {
    fn notify(&self, alert: &Alert) -> Result<()> {
        self.alerts.borrow_mut().push(alert.clone());
        if self.broken {
            return Err(QualityError::notification("webhook returned 500"));
        }
        Ok(())
    }
}

const SUITE_NAME: &str = "custom_table_validation_suite";

fn suite() -> Suite {
    SuiteBuilder::new(SUITE_NAME)
        .add(Rule::row_count_between(10_000, 50_000).unwrap())
        .add(Rule::ordered_columns_match(["col1", "col2", "col3", "col4", "dt"]).unwrap())
        .build()
        .unwrap()
}

fn asset() -> DataAssetName {
    DataAssetName::new("custom_table", "2022-06-05")
}

struct Harness {
    evaluator: CountingEvaluator,
    suites: FakeSuiteStore,
    sink: FakeSink,
    notifier: FakeNotifier,
}

impl Harness {
    fn new() -> Self {
        let suites = FakeSuiteStore::default();
        suites.persist(Environment::Develop, &suite()).unwrap();
        Self {
            evaluator: CountingEvaluator::default(),
            suites,
            sink: FakeSink::default(),
            notifier: FakeNotifier::default(),
        }
    }

    fn services(&self) -> RunnerServices<'_, CountingEvaluator> {
        RunnerServices {
            evaluator: &self.evaluator,
            suites: &self.suites,
            results: &self.sink,
            notifier: &self.notifier,
        }
    }

    fn runner<'a>(&'a self, batch: &'a RowCount) -> ValidationRunner<'a, CountingEvaluator> {
        ValidationRunner::new(Environment::Develop, asset(), batch, SUITE_NAME, self.services())
    }
}

#[test]
fn test_status_before_run_fails_fast() {
    let harness = Harness::new();
    let batch = RowCount(20_000);
    let runner = harness.runner(&batch);

    assert!(matches!(runner.status(), Err(QualityError::NotExecuted)));
    assert_eq!(runner.phase(), RunPhase::Bound);
    assert_eq!(harness.suites.loads.get(), 0, "construction must not do I/O");
}

#[test]
fn test_failing_batch_persists_once_and_alerts_once() {
    let harness = Harness::new();
    let batch = RowCount(5);
    let mut runner = harness.runner(&batch);

    assert!(!runner.run().unwrap());
    assert!(!runner.status().unwrap());
    assert_eq!(runner.phase(), RunPhase::Failed);

    assert_eq!(harness.evaluator.calls.get(), 1);
    assert_eq!(harness.sink.records.borrow().len(), 1);

    let alerts = harness.notifier.alerts.borrow();
    assert_eq!(alerts.len(), 1);
    let alert = &alerts[0];
    assert_eq!(alert.suite_name, SUITE_NAME);
    assert_eq!(alert.run_name, "custom_table_2022-06-05");
    assert_eq!(alert.asset_identifier, asset());
    assert_eq!(alert.result_location, "memory://results/custom_table_2022-06-05");
    assert_eq!(alert.failed_rules.len(), 1);
    assert!(alert.failed_rules[0].starts_with("RowCountBetween"));
}

#[test]
fn test_passing_batch_does_not_alert() {
    let harness = Harness::new();
    let batch = RowCount(20_000);
    let mut runner = harness.runner(&batch);

    assert!(runner.run().unwrap());
    assert!(runner.status().unwrap());
    assert_eq!(runner.phase(), RunPhase::Passed);
    assert_eq!(harness.sink.records.borrow().len(), 1);
    assert!(harness.notifier.alerts.borrow().is_empty());
}

#[test]
fn test_result_record_contents() {
    let harness = Harness::new();
    let batch = RowCount(5);
    let mut runner = harness.runner(&batch);
    runner.run().unwrap();

    let result = runner.result().unwrap();
    assert_eq!(result.suite_name, SUITE_NAME);
    assert_eq!(result.environment, Environment::Develop);
    assert_eq!(result.run_identifier.run_name, runner.run_name());
    assert_eq!(result.results.len(), 2);
    assert_eq!(result.statistics.unsuccessful_expectations, 1);
    assert_eq!(
        runner.result_location(),
        Some("memory://results/custom_table_2022-06-05")
    );
    assert_eq!(&harness.sink.records.borrow()[0], result);
}

#[test]
fn test_second_run_is_rejected() {
    let harness = Harness::new();
    let batch = RowCount(20_000);
    let mut runner = harness.runner(&batch);

    runner.run().unwrap();
    assert!(matches!(runner.run(), Err(QualityError::AlreadyExecuted(_))));
    assert_eq!(harness.evaluator.calls.get(), 1);
    assert_eq!(harness.sink.records.borrow().len(), 1);
}

#[test]
fn test_alert_failure_does_not_change_verdict() {
    let mut harness = Harness::new();
    harness.notifier.broken = true;
    let batch = RowCount(5);
    let mut runner = harness.runner(&batch);

    assert!(!runner.run().unwrap());
    assert!(!runner.status().unwrap());
    assert_eq!(harness.notifier.alerts.borrow().len(), 1);
}

#[test]
fn test_evaluation_error_propagates_unchanged() {
    let mut harness = Harness::new();
    harness.evaluator.fail_with = Some("batch is malformed".to_string());
    let batch = RowCount(5);
    let mut runner = harness.runner(&batch);

    match runner.run() {
        Err(QualityError::Evaluation(message)) => assert_eq!(message, "batch is malformed"),
        other => panic!("Expected evaluation error, got {other:?}"),
    }
    assert!(matches!(runner.status(), Err(QualityError::NotExecuted)));
    assert!(harness.sink.records.borrow().is_empty());
    assert!(harness.notifier.alerts.borrow().is_empty());
}

#[test]
fn test_unknown_suite_is_an_evaluation_error() {
    let harness = Harness::new();
    let batch = RowCount(5);
    let mut runner = ValidationRunner::new(
        Environment::Develop,
        asset(),
        &batch,
        "missing_suite",
        harness.services(),
    );

    assert!(matches!(runner.run(), Err(QualityError::Evaluation(_))));
    assert_eq!(harness.evaluator.calls.get(), 0);
}

#[test]
fn test_sink_failure_surfaces_but_keeps_verdict() {
    let mut harness = Harness::new();
    harness.sink.broken = true;
    let batch = RowCount(5);
    let mut runner = harness.runner(&batch);

    assert!(matches!(runner.run(), Err(QualityError::Storage(_))));
    assert!(!runner.status().unwrap());
    assert_eq!(runner.result_location(), None);

    let alerts = harness.notifier.alerts.borrow();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].result_location, "<result not persisted>");
}

#[test]
fn test_in_memory_suite_skips_store() {
    let harness = Harness::new();
    let batch = RowCount(20_000);
    let mut runner = harness.runner(&batch).with_suite(suite()).unwrap();

    assert!(runner.run().unwrap());
    assert_eq!(harness.suites.loads.get(), 0);
}

#[test]
fn test_in_memory_suite_must_match_bound_name() {
    let harness = Harness::new();
    let batch = RowCount(20_000);
    let other = SuiteBuilder::new("other_suite")
        .add(Rule::column_count_equal(5).unwrap())
        .build()
        .unwrap();

    assert!(matches!(
        harness.runner(&batch).with_suite(other),
        Err(QualityError::Configuration { .. })
    ));
}

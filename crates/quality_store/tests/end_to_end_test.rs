//! Publishes a suite, then validates batches against it through the runner,
//! with real storage backends and the in-process evaluation engine.

use pretty_assertions::assert_eq;
use quality_core::{
    Alert, DataAssetName, Environment, Notifier, QualityError, Result, Rule, RunnerServices,
    StorageConfig, Suite, SuiteBuilder, SuiteStore, ValidationResult, ValidationRunner,
};
use quality_store::{BucketStore, InMemoryObjectStore, LocalObjectStore, ObjectStore};
use quality_validator::{ColumnSchema, DataSet, DataSetEvaluator, DataValue};
use std::cell::RefCell;
use std::collections::HashMap;

const SUITE_NAME: &str = "dataframe_validation_suite";
const COLUMNS: [&str; 5] = ["col1", "col2", "col3", "col4", "dt"];

#[derive(Default)]
struct RecordingNotifier {
    alerts: RefCell<Vec<Alert>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, alert: &Alert) -> Result<()> {
        self.alerts.borrow_mut().push(alert.clone());
        Ok(())
    }
}

fn reference_suite() -> Suite {
    SuiteBuilder::new(SUITE_NAME)
        .add(Rule::row_count_between(10_000, 50_000).unwrap())
        .add(Rule::ordered_columns_match(COLUMNS).unwrap())
        .add(Rule::columns_match(COLUMNS, false).unwrap())
        .build()
        .unwrap()
}

fn batch(rows: usize) -> DataSet {
    let columns = COLUMNS.iter().map(|c| ColumnSchema::new(*c, "string")).collect();
    let rows = (0..rows)
        .map(|i| {
            COLUMNS
                .iter()
                .map(|c| (c.to_string(), DataValue::from(format!("{c}-{i}"))))
                .collect::<HashMap<_, _>>()
        })
        .collect();
    DataSet::from_rows(columns, rows)
}

fn config() -> StorageConfig {
    StorageConfig::builder().bucket("dq-expectations").build().unwrap()
}

fn asset() -> DataAssetName {
    DataAssetName::new("custom_table", "2022-06-05")
}

#[test]
fn test_small_batch_fails_and_alerts_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = BucketStore::new(LocalObjectStore::new(dir.path()), config());
    store.persist(Environment::Develop, &reference_suite()).unwrap();

    let evaluator = DataSetEvaluator::new();
    let notifier = RecordingNotifier::default();
    let services = RunnerServices {
        evaluator: &evaluator,
        suites: &store,
        results: &store,
        notifier: &notifier,
    };

    let data = batch(5);
    let mut runner = ValidationRunner::new(Environment::Develop, asset(), &data, SUITE_NAME, services);

    assert!(matches!(runner.status(), Err(QualityError::NotExecuted)));
    assert!(!runner.run().unwrap());
    assert!(!runner.status().unwrap());

    let alerts = notifier.alerts.borrow();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].run_name, "custom_table_2022-06-05");

    let location = runner.result_location().unwrap().to_string();
    assert_eq!(alerts[0].result_location, location);

    let path = location.trim_start_matches("file://");
    assert!(path.contains(
        "develop/validations/validations_store/dataframe_validation_suite_checkpoint/custom_table_2022-06-05/"
    ));
    let record: ValidationResult =
        serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
    assert!(!record.success);
    assert_eq!(record.results.len(), 3);
    assert!(!record.results[0].success);
}

#[test]
fn test_conforming_batch_passes_without_alert() {
    let store = BucketStore::new(InMemoryObjectStore::new(), config());
    store.persist(Environment::Production, &reference_suite()).unwrap();

    let evaluator = DataSetEvaluator::new();
    let notifier = RecordingNotifier::default();
    let services = RunnerServices {
        evaluator: &evaluator,
        suites: &store,
        results: &store,
        notifier: &notifier,
    };

    let data = batch(10_000);
    let mut runner =
        ValidationRunner::new(Environment::Production, asset(), &data, SUITE_NAME, services);

    assert!(runner.run().unwrap());
    assert!(notifier.alerts.borrow().is_empty());

    let keys = store.objects().keys("dq-expectations");
    assert_eq!(keys.len(), 2, "suite document plus one result record: {keys:?}");
    assert!(keys.iter().any(|k| k.starts_with(
        "production/validations/validations_store/dataframe_validation_suite_checkpoint/"
    )));
}

#[test]
fn test_unacknowledged_result_write_surfaces() {
    let objects = InMemoryObjectStore::new();
    let store = BucketStore::new(&objects, config());
    store.persist(Environment::Develop, &reference_suite()).unwrap();
    objects.reject_writes_with(503);

    let evaluator = DataSetEvaluator::new();
    let notifier = RecordingNotifier::default();
    let services = RunnerServices {
        evaluator: &evaluator,
        suites: &store,
        results: &store,
        notifier: &notifier,
    };

    let data = batch(10_000);
    let mut runner = ValidationRunner::new(Environment::Develop, asset(), &data, SUITE_NAME, services);

    assert!(matches!(runner.run(), Err(QualityError::Storage(_))));
    assert!(runner.status().unwrap());
    assert_eq!(runner.result_location(), None);
}

#[test]
fn test_suite_document_layout() {
    let objects = InMemoryObjectStore::new();
    let store = BucketStore::new(&objects, config());
    store.persist(Environment::Staging, &reference_suite()).unwrap();

    let bytes = objects
        .get(
            "dq-expectations",
            "staging/validations/expectations_store/dataframe_validation_suite.json",
        )
        .unwrap()
        .unwrap();
    let document: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(document["expectation_suite_name"], SUITE_NAME);
    assert_eq!(document["meta"]["great_expectations_version"], "0.15.3");
    assert_eq!(document["expectations"].as_array().unwrap().len(), 3);
    assert_eq!(
        document["expectations"][0]["expectation_type"],
        "expect_table_row_count_to_be_between"
    );
    assert_eq!(document["expectations"][2]["kwargs"]["exact_match"], false);
}

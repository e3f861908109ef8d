//! Suite store and result sink over an object store.

use quality_core::{
    Environment, QualityError, Result, ResultSink, StorageConfig, Suite, SuiteStore,
    ValidationResult,
};
use tracing::{debug, info};

use crate::ObjectStore;

/// Persists suite documents and result records in one bucket.
///
/// Keys follow the [`StorageConfig`] layout, so suites of different
/// environments never share a key. Writes are last-writer-wins.
///
/// ```rust
/// use quality_core::{Environment, Rule, StorageConfig, SuiteBuilder, SuiteStore};
/// use quality_store::{BucketStore, InMemoryObjectStore};
///
/// let config = StorageConfig::builder().bucket("dq-expectations").build()?;
/// let store = BucketStore::new(InMemoryObjectStore::new(), config);
///
/// let suite = SuiteBuilder::new("orders_suite")
///     .add(Rule::column_count_equal(3)?)
///     .build()?;
/// store.persist(Environment::Develop, &suite)?;
///
/// assert_eq!(store.load(Environment::Develop, "orders_suite")?, suite);
/// # Ok::<(), quality_core::QualityError>(())
/// ```
#[derive(Debug)]
pub struct BucketStore<O: ObjectStore> {
    objects: O,
    config: StorageConfig,
}

impl<O: ObjectStore> BucketStore<O> {
    /// Creates a store over `objects` using the layout in `config`.
    pub fn new(objects: O, config: StorageConfig) -> Self {
        Self { objects, config }
    }

    /// Returns the storage layout.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Returns the underlying object store.
    pub fn objects(&self) -> &O {
        &self.objects
    }

    /// Reference to the document of a suite.
    pub fn suite_uri(&self, environment: Environment, suite_name: &str) -> String {
        self.objects.uri(
            &self.config.bucket,
            &self.config.suite_key(environment, suite_name),
        )
    }

    fn put_acknowledged(&self, key: &str, bytes: &[u8]) -> Result<String> {
        let uri = self.objects.uri(&self.config.bucket, key);
        let ack = self.objects.put(&self.config.bucket, key, bytes)?;
        if !ack.is_success() {
            return Err(QualityError::storage(format!(
                "write to {uri} was not acknowledged (status {})",
                ack.status
            )));
        }
        debug!(uri = %uri, bytes = bytes.len(), "Write acknowledged");
        Ok(uri)
    }
}

impl<O: ObjectStore> SuiteStore for BucketStore<O> {
    fn persist(&self, environment: Environment, suite: &Suite) -> Result<()> {
        let key = self.config.suite_key(environment, suite.name());
        let uri = self.put_acknowledged(&key, &suite.to_bytes()?)?;
        info!(suite = suite.name(), %environment, uri = %uri, "Persisted suite");
        Ok(())
    }

    fn load(&self, environment: Environment, suite_name: &str) -> Result<Suite> {
        let key = self.config.suite_key(environment, suite_name);
        let bytes = self
            .objects
            .get(&self.config.bucket, &key)?
            .ok_or_else(|| {
                QualityError::evaluation(format!(
                    "suite '{suite_name}' not found at {}",
                    self.objects.uri(&self.config.bucket, &key)
                ))
            })?;

        let suite = Suite::from_slice(&bytes)?;
        if suite.name() != suite_name {
            return Err(QualityError::evaluation(format!(
                "document at {} names suite '{}', expected '{suite_name}'",
                self.objects.uri(&self.config.bucket, &key),
                suite.name()
            )));
        }
        debug!(suite = suite_name, rules = suite.len(), "Loaded suite");
        Ok(suite)
    }
}

impl<O: ObjectStore> ResultSink for BucketStore<O> {
    fn persist_result(&self, result: &ValidationResult) -> Result<String> {
        let key = self.config.result_key(
            result.environment,
            &result.suite_name,
            &result.run_identifier.run_name,
            result.run_identifier.run_time,
        );
        let bytes = serde_json::to_vec_pretty(result)?;
        let uri = self.put_acknowledged(&key, &bytes)?;
        info!(run = %result.run_identifier.run_name, uri = %uri, "Persisted validation result");
        Ok(uri)
    }
}

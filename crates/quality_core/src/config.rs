//! Environment and storage layout configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{QualityError, Result};

/// Placeholder replaced by the environment name in prefix templates.
pub const ENV_PLACEHOLDER: &str = "{env}";

/// Default prefix template under which all stores live.
pub const DEFAULT_PREFIX_TEMPLATE: &str = "{env}/validations/";

/// Format of the run time segment in result keys.
pub const RUN_TIME_FORMAT: &str = "%Y%m%dT%H%M%S%.6fZ";

/// Deployment environment a suite or run belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    Develop,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

impl Environment {
    /// All environments.
    pub const ALL: [Environment; 3] = [
        Environment::Develop,
        Environment::Staging,
        Environment::Production,
    ];

    /// Returns the lowercase environment name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Develop => "develop",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = QualityError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|env| env.as_str() == s)
            .ok_or_else(|| {
                QualityError::configuration(
                    "environment",
                    format!("'{s}' is not one of develop, staging, production"),
                )
            })
    }
}

/// Where suites and validation results are stored.
///
/// Resolved once at startup and shared by every store.
///
/// ```rust
/// use quality_core::{Environment, StorageConfig};
///
/// let config = StorageConfig::builder().bucket("dq-expectations").build().unwrap();
/// assert_eq!(
///     config.suite_key(Environment::Develop, "orders_suite"),
///     "develop/validations/expectations_store/orders_suite.json"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket holding suites and results
    pub bucket: String,

    /// Key prefix template, must contain `{env}`
    #[serde(default = "default_prefix_template")]
    pub prefix_template: String,
}

fn default_prefix_template() -> String {
    DEFAULT_PREFIX_TEMPLATE.to_string()
}

impl StorageConfig {
    /// Creates a new builder for `StorageConfig`.
    pub fn builder() -> StorageConfigBuilder {
        StorageConfigBuilder::default()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            return Err(QualityError::configuration(
                "bucket",
                "bucket cannot be empty",
            ));
        }

        if !self.prefix_template.contains(ENV_PLACEHOLDER) {
            return Err(QualityError::configuration(
                "prefix_template",
                format!(
                    "'{}' must contain {ENV_PLACEHOLDER} so environments do not share keys",
                    self.prefix_template
                ),
            ));
        }

        Ok(())
    }

    /// Returns the resolved prefix for an environment, always ending in `/`.
    pub fn prefix(&self, environment: Environment) -> String {
        let prefix = self
            .prefix_template
            .replace(ENV_PLACEHOLDER, environment.as_str());
        if prefix.ends_with('/') {
            prefix
        } else {
            format!("{prefix}/")
        }
    }

    /// Key of a persisted suite document.
    pub fn suite_key(&self, environment: Environment, suite_name: &str) -> String {
        format!(
            "{}expectations_store/{suite_name}.json",
            self.prefix(environment)
        )
    }

    /// Key of a persisted validation result.
    pub fn result_key(
        &self,
        environment: Environment,
        suite_name: &str,
        run_name: &str,
        run_time: DateTime<Utc>,
    ) -> String {
        format!(
            "{}validations_store/{}/{run_name}/{}.json",
            self.prefix(environment),
            checkpoint_name(suite_name),
            run_time.format(RUN_TIME_FORMAT)
        )
    }
}

/// Name of the checkpoint a suite is run under.
pub fn checkpoint_name(suite_name: &str) -> String {
    format!("{suite_name}_checkpoint")
}

/// Builder for `StorageConfig`.
#[derive(Debug, Clone, Default)]
pub struct StorageConfigBuilder {
    bucket: Option<String>,
    prefix_template: Option<String>,
}

impl StorageConfigBuilder {
    /// Sets the bucket.
    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// Sets the prefix template.
    pub fn prefix_template(mut self, template: impl Into<String>) -> Self {
        self.prefix_template = Some(template.into());
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> Result<StorageConfig> {
        let bucket = self
            .bucket
            .ok_or_else(|| QualityError::configuration("bucket", "bucket is required"))?;

        let config = StorageConfig {
            bucket,
            prefix_template: self.prefix_template.unwrap_or_else(default_prefix_template),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config() -> StorageConfig {
        StorageConfig::builder().bucket("bucket").build().unwrap()
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!("staging".parse::<Environment>().unwrap(), Environment::Staging);
        assert!("qa".parse::<Environment>().is_err());
        assert_eq!(Environment::Production.to_string(), "production");
    }

    #[test]
    fn test_suite_key() {
        assert_eq!(
            config().suite_key(Environment::Production, "dataframe_validation_suite"),
            "production/validations/expectations_store/dataframe_validation_suite.json"
        );
    }

    #[test]
    fn test_result_key() {
        let run_time = Utc.with_ymd_and_hms(2022, 6, 5, 1, 2, 3).unwrap();
        assert_eq!(
            config().result_key(
                Environment::Develop,
                "custom_table_validation_suite",
                "custom_table_2022-06-05",
                run_time
            ),
            "develop/validations/validations_store/custom_table_validation_suite_checkpoint/custom_table_2022-06-05/20220605T010203.000000Z.json"
        );
    }

    #[test]
    fn test_prefix_gets_trailing_slash() {
        let config = StorageConfig::builder()
            .bucket("b")
            .prefix_template("dq/{env}")
            .build()
            .unwrap();
        assert_eq!(config.prefix(Environment::Staging), "dq/staging/");
    }

    #[test]
    fn test_builder_requires_bucket() {
        assert!(matches!(
            StorageConfig::builder().build(),
            Err(QualityError::Configuration { .. })
        ));
    }

    #[test]
    fn test_prefix_without_env_is_rejected() {
        let result = StorageConfig::builder()
            .bucket("b")
            .prefix_template("validations/")
            .build();
        assert!(matches!(result, Err(QualityError::Configuration { .. })));
    }
}

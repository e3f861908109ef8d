//! Deployment settings.
//!
//! ```toml
//! environment = "develop"
//! root = "/var/lib/dq"
//!
//! [storage]
//! bucket = "dq-expectations"
//! prefix_template = "{env}/validations/"
//!
//! [alert]
//! webhook_url = "https://hooks.example.com/T000/B000"
//! ```

use quality_core::{Environment, StorageConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::{ParserError, Result};

/// Environment variable consulted for the alert webhook URL.
pub const ALERT_WEBHOOK_ENV: &str = "DQ_ALERT_WEBHOOK_URL";

/// Runtime settings for publishing and running suites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Environment this deployment expects; the command line wins
    #[serde(default)]
    pub environment: Option<Environment>,

    /// Storage layout
    pub storage: StorageConfig,

    /// Directory under which the local object store keeps its buckets
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Alert delivery
    #[serde(default)]
    pub alert: AlertConfig,
}

fn default_root() -> PathBuf {
    PathBuf::from(".dq")
}

/// Where failure alerts go.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Incoming webhook URL; alerts are only logged when unset
    #[serde(default)]
    pub webhook_url: Option<String>,
}

impl Settings {
    /// Settings for a bucket with every other value defaulted.
    pub fn for_bucket(bucket: impl Into<String>) -> Result<Self> {
        let storage = StorageConfig::builder().bucket(bucket).build()?;
        Ok(Self {
            environment: None,
            storage,
            root: default_root(),
            alert: AlertConfig::default(),
        })
    }

    /// Checks values serde cannot check.
    pub fn validate(&self) -> Result<()> {
        self.storage.validate()?;
        match &self.alert.webhook_url {
            Some(url) if !(url.starts_with("https://") || url.starts_with("http://")) => {
                Err(ParserError::Rule(quality_core::QualityError::configuration(
                    "alert.webhook_url",
                    format!("'{url}' is not an http(s) URL"),
                )))
            }
            _ => Ok(()),
        }
    }

    /// Resolves the webhook URL, preferring the environment variable.
    pub fn webhook_url(&self) -> Option<String> {
        std::env::var(ALERT_WEBHOOK_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.alert.webhook_url.clone())
    }

    /// Returns the environment to use: the requested one, with a warning when
    /// the settings file pins a different one.
    pub fn resolve_environment(&self, requested: Environment) -> Environment {
        match self.environment {
            Some(pinned) if pinned != requested => {
                warn!(%pinned, %requested, "Settings pin another environment, using the requested one");
            }
            _ => {}
        }
        requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::for_bucket("dq").unwrap();
        assert_eq!(settings.root, PathBuf::from(".dq"));
        assert_eq!(settings.storage.prefix_template, "{env}/validations/");
        assert_eq!(settings.alert.webhook_url, None);
    }

    #[test]
    fn test_requested_environment_wins() {
        let mut settings = Settings::for_bucket("dq").unwrap();
        settings.environment = Some(Environment::Staging);

        assert_eq!(
            settings.resolve_environment(Environment::Production),
            Environment::Production
        );
        assert_eq!(settings.resolve_environment(Environment::Staging), Environment::Staging);
    }

    #[test]
    fn test_rejects_non_http_webhook() {
        let mut settings = Settings::for_bucket("dq").unwrap();
        settings.alert.webhook_url = Some("ftp://example.com".into());
        assert!(settings.validate().is_err());
    }
}

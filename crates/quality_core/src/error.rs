//! Error types for the data quality gate.
//!
//! This module defines every error that can surface while composing rules,
//! building suites, talking to storage, evaluating a batch, or dispatching
//! alerts.

use thiserror::Error;

use crate::RuleKind;

/// Result type for data quality operations.
pub type Result<T> = std::result::Result<T, QualityError>;

/// Main error type for data quality operations.
#[derive(Error, Debug)]
pub enum QualityError {
    /// A rule factory received parameters that violate the rule's constraints
    #[error("Invalid rule {kind}: {message}")]
    InvalidRule {
        /// Kind of the rule being constructed
        kind: RuleKind,
        /// Description of the violated constraint
        message: String,
    },

    /// A suite or runner was configured incompletely
    #[error("Configuration error in '{field}': {message}")]
    Configuration {
        /// Name of the offending or missing field
        field: String,
        /// Failure details
        message: String,
    },

    /// The storage backend did not acknowledge a read or write
    #[error("Storage error: {0}")]
    Storage(String),

    /// The evaluation engine could not execute the suite
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Alert dispatch failed
    #[error("Notification error: {0}")]
    Notification(String),

    /// The runner status was read before `run()` completed
    #[error("Validation has not been executed yet; call run() before reading status")]
    NotExecuted,

    /// `run()` was called on a runner that already executed
    #[error("Validation already executed for run '{0}'")]
    AlreadyExecuted(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl QualityError {
    /// Creates a new invalid rule error.
    pub fn invalid_rule(kind: RuleKind, message: impl Into<String>) -> Self {
        Self::InvalidRule {
            kind,
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn configuration(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a new storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates a new evaluation error.
    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation(message.into())
    }

    /// Creates a new notification error.
    pub fn notification(message: impl Into<String>) -> Self {
        Self::Notification(message.into())
    }

    /// Returns true if the caller may retry the failed operation.
    ///
    /// Storage and evaluation failures depend on external systems; every other
    /// variant reflects bad input or misuse and will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Evaluation(_))
    }
}

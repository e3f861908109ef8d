//! Builder for assembling suites.
//!
//! Rules are accumulated with [`SuiteBuilder::add`] and frozen with
//! [`SuiteBuilder::build`]. `build` consumes the builder, so a finalized
//! suite can never receive another rule.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::debug;

use crate::{CommonFields, QualityError, Result, Rule, Suite, default_meta};

/// Names that become storage key segments are restricted to a path-safe
/// alphabet.
static KEY_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.\-]*$").expect("valid key segment pattern"));

/// Returns true if `name` can be used as one storage key segment.
pub(crate) fn is_key_segment(name: &str) -> bool {
    KEY_SEGMENT.is_match(name)
}

/// Builder for creating a [`Suite`].
///
/// # Example
///
/// ```rust
/// use quality_core::{Rule, SuiteBuilder};
///
/// let suite = SuiteBuilder::new("dataframe_validation_suite")
///     .add(Rule::row_count_between(10_000, 50_000).unwrap())
///     .add(Rule::ordered_columns_match(["col1", "col2", "dt"]).unwrap())
///     .build()
///     .unwrap();
///
/// assert_eq!(suite.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct SuiteBuilder {
    name: Option<String>,
    data_asset_type: Option<String>,
    ge_cloud_id: Option<String>,
    meta: BTreeMap<String, String>,
    rules: Vec<Rule>,
}

impl Default for SuiteBuilder {
    fn default() -> Self {
        Self {
            name: None,
            data_asset_type: None,
            ge_cloud_id: None,
            meta: default_meta(),
            rules: Vec::new(),
        }
    }
}

impl SuiteBuilder {
    /// Creates a new suite builder with the suite name set.
    pub fn new(name: impl Into<String>) -> Self {
        Self::default().name(name)
    }

    /// Sets the suite name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the target asset type.
    pub fn data_asset_type(mut self, data_asset_type: impl Into<String>) -> Self {
        self.data_asset_type = Some(data_asset_type.into());
        self
    }

    /// Sets the cloud identifier.
    pub fn ge_cloud_id(mut self, id: impl Into<String>) -> Self {
        self.ge_cloud_id = Some(id.into());
        self
    }

    /// Adds a suite-level metadata entry.
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Replaces the suite-level metadata.
    pub fn meta_map(mut self, meta: BTreeMap<String, String>) -> Self {
        self.meta = meta;
        self
    }

    /// Appends a rule.
    pub fn add(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Appends several rules, keeping their order.
    pub fn add_all(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Returns the number of rules added so far.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Validates the invariants and freezes the suite.
    ///
    /// # Errors
    ///
    /// Returns [`QualityError::Configuration`] naming the offending field if
    /// the name is unset, empty or not path-safe, or if no rule was added.
    pub fn build(self) -> Result<Suite> {
        let name = match self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => {
                return Err(QualityError::configuration(
                    "expectation_suite_name",
                    "suite name must be set",
                ));
            }
        };

        if !is_key_segment(&name) {
            return Err(QualityError::configuration(
                "expectation_suite_name",
                format!(
                    "'{name}' may only contain letters, digits, '_', '.' and '-' and must start with a letter or digit"
                ),
            ));
        }

        if self.rules.is_empty() {
            return Err(QualityError::configuration(
                "expectations",
                format!("suite '{name}' has no expectation added"),
            ));
        }

        debug!(suite = %name, rules = self.rules.len(), "Built expectation suite");

        let common = CommonFields {
            data_asset_type: self.data_asset_type,
            expectation_suite_name: name,
            ge_cloud_id: self.ge_cloud_id,
            meta: self.meta,
        };

        Ok(Suite::new(common, self.rules))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FORMAT_VERSION, FORMAT_VERSION_KEY, RuleKind};
    use pretty_assertions::assert_eq;

    fn dataframe_cols() -> Vec<&'static str> {
        vec!["col1", "col2", "col3", "col4", "dt"]
    }

    fn dataframe_suite() -> Result<Suite> {
        SuiteBuilder::new("dataframe_validation_suite")
            .add(Rule::row_count_between(10_000, 50_000)?)
            .add(Rule::ordered_columns_match(dataframe_cols())?)
            .add(Rule::columns_match(dataframe_cols(), false)?)
            .build()
    }

    #[test]
    fn test_build_reference_suite() {
        let suite = dataframe_suite().unwrap();
        let document = serde_json::to_value(&suite).unwrap();

        assert_eq!(document["expectation_suite_name"], "dataframe_validation_suite");
        let expectations = document["expectations"].as_array().unwrap();
        assert_eq!(expectations.len(), 3);
        assert_eq!(
            expectations[0]["expectation_type"],
            RuleKind::RowCountBetween.expectation_type()
        );
        assert_eq!(
            expectations[1]["expectation_type"],
            RuleKind::OrderedColumnsMatch.expectation_type()
        );
        assert_eq!(
            expectations[2]["expectation_type"],
            RuleKind::ColumnsMatch.expectation_type()
        );
        assert_eq!(expectations[2]["kwargs"]["exact_match"], false);
    }

    #[test]
    fn test_build_is_deterministic() {
        let first = dataframe_suite().unwrap();
        let second = dataframe_suite().unwrap();

        assert_eq!(first, second);
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }

    #[test]
    fn test_build_without_rules_fails() {
        match SuiteBuilder::new("empty_suite").build() {
            Err(QualityError::Configuration { field, .. }) => assert_eq!(field, "expectations"),
            other => panic!("Expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_build_without_name_fails() {
        let result = SuiteBuilder::default()
            .add(Rule::column_count_equal(3).unwrap())
            .build();

        match result {
            Err(QualityError::Configuration { field, .. }) => {
                assert_eq!(field, "expectation_suite_name")
            }
            other => panic!("Expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_build_with_blank_name_fails() {
        let result = SuiteBuilder::new("   ")
            .add(Rule::column_count_equal(3).unwrap())
            .build();
        assert!(matches!(result, Err(QualityError::Configuration { .. })));
    }

    #[test]
    fn test_build_rejects_path_like_name() {
        let result = SuiteBuilder::new("../other_env/suite")
            .add(Rule::column_count_equal(3).unwrap())
            .build();
        assert!(matches!(result, Err(QualityError::Configuration { .. })));
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let rules = vec![
            Rule::values_not_null("b").unwrap(),
            Rule::values_not_null("a").unwrap(),
            Rule::column_count_equal(2).unwrap(),
        ];

        let suite = SuiteBuilder::new("ordered")
            .add_all(rules.clone())
            .build()
            .unwrap();

        assert_eq!(suite.rules(), rules.as_slice());
    }

    #[test]
    fn test_default_and_custom_meta() {
        let suite = SuiteBuilder::new("meta_suite")
            .data_asset_type("table")
            .meta("owner", "data-platform")
            .add(Rule::column_count_equal(1).unwrap())
            .build()
            .unwrap();

        let common = suite.common_fields();
        assert_eq!(common.data_asset_type.as_deref(), Some("table"));
        assert_eq!(common.meta.get(FORMAT_VERSION_KEY).map(String::as_str), Some(FORMAT_VERSION));
        assert_eq!(common.meta.get("owner").map(String::as_str), Some("data-platform"));
    }

    #[test]
    fn test_rule_count() {
        let builder = SuiteBuilder::new("count")
            .add(Rule::column_count_equal(1).unwrap())
            .add(Rule::column_count_equal(2).unwrap());
        assert_eq!(builder.rule_count(), 2);
    }
}

//! Suite types.
//!
//! A [`Suite`] is a named, ordered collection of rules plus suite-level
//! metadata. Suites only come out of [`SuiteBuilder::build`](crate::SuiteBuilder::build),
//! so every value satisfies the build invariants: a non-empty name and at
//! least one rule.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{QualityError, Result, Rule, SuiteBuilder};

/// Meta key carrying the suite document format version.
pub const FORMAT_VERSION_KEY: &str = "great_expectations_version";

/// Suite document format version written by this crate.
pub const FORMAT_VERSION: &str = "0.15.3";

/// Suite-level metadata shared by every persisted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonFields {
    /// Optional asset type the suite targets
    pub data_asset_type: Option<String>,

    /// Suite name, unique within an environment
    pub expectation_suite_name: String,

    /// Optional cloud identifier, unused by this crate
    pub ge_cloud_id: Option<String>,

    /// Free-form metadata including the format version
    pub meta: BTreeMap<String, String>,
}

/// Returns the metadata every new suite starts with.
pub fn default_meta() -> BTreeMap<String, String> {
    BTreeMap::from([(FORMAT_VERSION_KEY.to_string(), FORMAT_VERSION.to_string())])
}

/// A finalized, immutable suite.
///
/// Serializes to the suite document:
///
/// ```json
/// {
///   "data_asset_type": null,
///   "expectation_suite_name": "...",
///   "ge_cloud_id": null,
///   "meta": { "great_expectations_version": "0.15.3" },
///   "expectations": [ ... ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SuiteDocument")]
pub struct Suite {
    #[serde(flatten)]
    common: CommonFields,
    expectations: Vec<Rule>,
}

impl Suite {
    pub(crate) fn new(common: CommonFields, expectations: Vec<Rule>) -> Self {
        Self {
            common,
            expectations,
        }
    }

    /// Returns the suite name.
    pub fn name(&self) -> &str {
        &self.common.expectation_suite_name
    }

    /// Returns the suite-level metadata.
    pub fn common_fields(&self) -> &CommonFields {
        &self.common
    }

    /// Returns the rules in insertion order.
    pub fn rules(&self) -> &[Rule] {
        &self.expectations
    }

    /// Returns the number of rules.
    pub fn len(&self) -> usize {
        self.expectations.len()
    }

    /// Always false for a built suite; provided for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.expectations.is_empty()
    }

    /// Serializes the suite document as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serializes the suite document as JSON bytes for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Parses a suite document, re-checking the build invariants.
    pub fn from_json(content: &str) -> Result<Self> {
        let document: SuiteDocument = serde_json::from_str(content)?;
        Self::try_from(document)
    }

    /// Parses a suite document from raw bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let document: SuiteDocument = serde_json::from_slice(bytes)?;
        Self::try_from(document)
    }
}

/// Unchecked wire form of a suite.
#[derive(Debug, Deserialize)]
struct SuiteDocument {
    #[serde(default)]
    data_asset_type: Option<String>,
    #[serde(default)]
    expectation_suite_name: Option<String>,
    #[serde(default)]
    ge_cloud_id: Option<String>,
    #[serde(default = "default_meta")]
    meta: BTreeMap<String, String>,
    #[serde(default)]
    expectations: Vec<Rule>,
}

impl TryFrom<SuiteDocument> for Suite {
    type Error = QualityError;

    fn try_from(document: SuiteDocument) -> Result<Self> {
        let mut builder = SuiteBuilder::default().meta_map(document.meta);
        if let Some(name) = document.expectation_suite_name {
            builder = builder.name(name);
        }
        if let Some(asset_type) = document.data_asset_type {
            builder = builder.data_asset_type(asset_type);
        }
        if let Some(id) = document.ge_cloud_id {
            builder = builder.ge_cloud_id(id);
        }
        builder.add_all(document.expectations).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_suite() -> Suite {
        SuiteBuilder::new("orders_suite")
            .add(Rule::row_count_between(1, 10).unwrap())
            .add(Rule::values_not_null("id").unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_top_level_key_order() {
        let json = serde_json::to_string(&sample_suite()).unwrap();
        let positions: Vec<usize> = [
            "\"data_asset_type\"",
            "\"expectation_suite_name\"",
            "\"ge_cloud_id\"",
            "\"meta\"",
            "\"expectations\"",
        ]
        .iter()
        .map(|key| json.find(key).unwrap())
        .collect();

        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
        assert!(json.contains("\"data_asset_type\":null"));
        assert!(json.contains("\"great_expectations_version\":\"0.15.3\""));
    }

    #[test]
    fn test_document_round_trip() {
        let suite = sample_suite();
        let json = suite.to_json().unwrap();
        let decoded = Suite::from_json(&json).unwrap();

        assert_eq!(decoded, suite);
        assert_eq!(decoded.to_json().unwrap(), json);
    }

    #[test]
    fn test_document_without_rules_is_rejected() {
        let json = r#"{
            "data_asset_type": null,
            "expectation_suite_name": "empty",
            "ge_cloud_id": null,
            "meta": {},
            "expectations": []
        }"#;

        assert!(matches!(
            Suite::from_json(json),
            Err(QualityError::Configuration { .. })
        ));
    }

    #[test]
    fn test_document_without_name_is_rejected() {
        let json = r#"{
            "expectations": [
                {"expectation_type": "expect_table_column_count_to_equal", "kwargs": {"value": 2}, "meta": {}}
            ]
        }"#;

        match Suite::from_json(json) {
            Err(QualityError::Configuration { field, .. }) => {
                assert_eq!(field, "expectation_suite_name")
            }
            other => panic!("Expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_serde_deserialize_checks_invariants() {
        let result = serde_json::from_str::<Suite>(r#"{"expectation_suite_name": "x"}"#);
        assert!(result.is_err());
    }
}

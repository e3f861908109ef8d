//! Human-authored suite definitions.
//!
//! A definition is the file an operator writes; a [`Suite`] is what gets
//! persisted. [`SuiteDefinition::build`] runs every rule factory and the
//! suite builder, so a definition that parses is not yet known to be valid.

use quality_core::{Rule, Suite, SuiteBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Result;

/// A suite as written by an operator.
///
/// ```yaml
/// name: dataframe_validation_suite
/// rules:
///   - kind: row_count_between
///     min_value: 10000
///     max_value: 50000
///   - kind: ordered_columns_match
///     column_list: [col1, col2, col3, col4, dt]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteDefinition {
    /// Suite name
    pub name: String,

    /// Target asset type, e.g. "Dataset"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_asset_type: Option<String>,

    /// Extra suite-level metadata, merged over the default entries
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,

    /// Rules, in evaluation order
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

/// One rule of a definition plus its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEntry {
    /// Rule kind and parameters
    #[serde(flatten)]
    pub spec: RuleSpec,

    /// Free-form metadata such as severity or owner
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
}

/// Rule parameters, tagged by `kind`.
///
/// Numbers are signed here so a negative bound reaches the rule factory and
/// is reported as an invalid rule rather than a parse error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleSpec {
    /// Columns equal the list, in order
    OrderedColumnsMatch { column_list: Vec<String> },

    /// Columns match the set
    ColumnsMatch {
        column_set: Vec<String>,
        #[serde(default = "exact_by_default")]
        exact_match: bool,
    },

    /// Row count within inclusive bounds
    RowCountBetween { min_value: i64, max_value: i64 },

    /// Column has no nulls
    ValuesNotNull { column: String },

    /// Column count equals the value
    ColumnCountEqual { value: i64 },

    /// Column is of the given type
    ColumnTypeMatch {
        column: String,
        #[serde(rename = "type", alias = "type_")]
        type_name: String,
    },

    /// Column is of one of the listed types
    ColumnTypeInList { column: String, type_list: Vec<String> },

    /// Column values match a strftime format
    #[serde(alias = "datetime_format_match")]
    DateTimeFormatMatch {
        column: String,
        strftime_format: String,
    },
}

fn exact_by_default() -> bool {
    true
}

impl RuleSpec {
    /// Runs the matching rule factory.
    pub fn to_rule(&self) -> quality_core::Result<Rule> {
        match self {
            RuleSpec::OrderedColumnsMatch { column_list } => {
                Rule::ordered_columns_match(column_list)
            }
            RuleSpec::ColumnsMatch {
                column_set,
                exact_match,
            } => Rule::columns_match(column_set, *exact_match),
            RuleSpec::RowCountBetween {
                min_value,
                max_value,
            } => Rule::row_count_between(*min_value, *max_value),
            RuleSpec::ValuesNotNull { column } => Rule::values_not_null(column),
            RuleSpec::ColumnCountEqual { value } => Rule::column_count_equal(*value),
            RuleSpec::ColumnTypeMatch { column, type_name } => {
                Rule::column_type_match(column, type_name)
            }
            RuleSpec::ColumnTypeInList { column, type_list } => {
                Rule::column_type_in_list(column, type_list)
            }
            RuleSpec::DateTimeFormatMatch {
                column,
                strftime_format,
            } => Rule::datetime_format_match(column, strftime_format),
        }
    }
}

impl RuleEntry {
    /// Builds the rule and attaches its metadata.
    pub fn to_rule(&self) -> quality_core::Result<Rule> {
        let rule = self.spec.to_rule()?;
        Ok(self
            .meta
            .iter()
            .fold(rule, |rule, (key, value)| rule.with_meta(key, value)))
    }
}

impl SuiteDefinition {
    /// Builds the suite, failing on the first invalid rule.
    pub fn build(&self) -> Result<Suite> {
        let rules = self
            .rules
            .iter()
            .map(RuleEntry::to_rule)
            .collect::<quality_core::Result<Vec<_>>>()?;

        let mut meta = quality_core::default_meta();
        meta.extend(self.meta.clone());

        let mut builder = SuiteBuilder::new(&self.name).meta_map(meta).add_all(rules);
        if let Some(asset_type) = &self.data_asset_type {
            builder = builder.data_asset_type(asset_type);
        }

        Ok(builder.build()?)
    }
}

//! Rule types and factories.
//!
//! A [`Rule`] is one immutable, checkable property of a dataset. Each kind of
//! check has its own factory on [`Rule`] which validates the parameters and
//! fails fast with [`QualityError::InvalidRule`]. Rules are serialized in the
//! expectation wire form:
//!
//! ```json
//! { "expectation_type": "...", "kwargs": { ... }, "meta": { ... } }
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::{QualityError, Result};

/// Enumerated tag naming each kind of rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Columns equal an ordered list
    OrderedColumnsMatch,
    /// Columns match an unordered set
    ColumnsMatch,
    /// Row count lies within an inclusive range
    RowCountBetween,
    /// A column contains no null values
    ValuesNotNull,
    /// Number of columns equals a value
    ColumnCountEqual,
    /// A column has a given type
    ColumnTypeMatch,
    /// A column has one of several types
    ColumnTypeInList,
    /// A column's values match a strftime format
    DateTimeFormatMatch,
}

impl RuleKind {
    /// All rule kinds, in declaration order.
    pub const ALL: [RuleKind; 8] = [
        RuleKind::OrderedColumnsMatch,
        RuleKind::ColumnsMatch,
        RuleKind::RowCountBetween,
        RuleKind::ValuesNotNull,
        RuleKind::ColumnCountEqual,
        RuleKind::ColumnTypeMatch,
        RuleKind::ColumnTypeInList,
        RuleKind::DateTimeFormatMatch,
    ];

    /// Returns the `expectation_type` used on the wire.
    pub fn expectation_type(&self) -> &'static str {
        match self {
            RuleKind::OrderedColumnsMatch => "expect_table_columns_to_match_ordered_list",
            RuleKind::ColumnsMatch => "expect_table_columns_to_match_set",
            RuleKind::RowCountBetween => "expect_table_row_count_to_be_between",
            RuleKind::ValuesNotNull => "expect_column_values_to_not_be_null",
            RuleKind::ColumnCountEqual => "expect_table_column_count_to_equal",
            RuleKind::ColumnTypeMatch => "expect_column_values_to_be_of_type",
            RuleKind::ColumnTypeInList => "expect_column_values_to_be_in_type_list",
            RuleKind::DateTimeFormatMatch => "expect_column_values_to_match_strftime_format",
        }
    }

    /// Resolves a kind from its `expectation_type`.
    pub fn from_expectation_type(expectation_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.expectation_type() == expectation_type)
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleKind::OrderedColumnsMatch => "OrderedColumnsMatch",
            RuleKind::ColumnsMatch => "ColumnsMatch",
            RuleKind::RowCountBetween => "RowCountBetween",
            RuleKind::ValuesNotNull => "ValuesNotNull",
            RuleKind::ColumnCountEqual => "ColumnCountEqual",
            RuleKind::ColumnTypeMatch => "ColumnTypeMatch",
            RuleKind::ColumnTypeInList => "ColumnTypeInList",
            RuleKind::DateTimeFormatMatch => "DateTimeFormatMatch",
        };
        f.write_str(name)
    }
}

impl FromStr for RuleKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.to_string() == s || kind.expectation_type() == s)
            .ok_or_else(|| format!("Unknown rule kind: {s}"))
    }
}

/// Validated parameters for each kind of check.
///
/// Values of this type only exist behind a [`Rule`], so the parameter
/// constraints documented on each factory always hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// Columns equal `column_list`, in order
    OrderedColumnsMatch {
        /// Expected column names, in order
        column_list: Vec<String>,
    },

    /// Columns match `column_set`
    ColumnsMatch {
        /// Expected column names
        column_set: Vec<String>,
        /// Whether observed columns must equal the set, or merely contain it
        exact_match: bool,
    },

    /// `min_value <= row count <= max_value`
    RowCountBetween {
        /// Minimum number of rows, inclusive
        min_value: u64,
        /// Maximum number of rows, inclusive
        max_value: u64,
    },

    /// `column` has no nulls
    ValuesNotNull {
        /// Column name
        column: String,
    },

    /// Column count equals `value`
    ColumnCountEqual {
        /// Expected number of columns
        value: u64,
    },

    /// `column` is of type `type_`
    ColumnTypeMatch {
        /// Column name
        column: String,
        /// Expected type name (e.g. "string", "StringType")
        type_: String,
    },

    /// `column` is of one of `type_list`
    ColumnTypeInList {
        /// Column name
        column: String,
        /// Accepted type names
        type_list: Vec<String>,
    },

    /// `column` values match `strftime_format`
    DateTimeFormatMatch {
        /// Column name
        column: String,
        /// strftime format, e.g. "%Y-%m-%d"
        strftime_format: String,
    },
}

impl Check {
    /// Returns the kind tag of this check.
    pub fn kind(&self) -> RuleKind {
        match self {
            Check::OrderedColumnsMatch { .. } => RuleKind::OrderedColumnsMatch,
            Check::ColumnsMatch { .. } => RuleKind::ColumnsMatch,
            Check::RowCountBetween { .. } => RuleKind::RowCountBetween,
            Check::ValuesNotNull { .. } => RuleKind::ValuesNotNull,
            Check::ColumnCountEqual { .. } => RuleKind::ColumnCountEqual,
            Check::ColumnTypeMatch { .. } => RuleKind::ColumnTypeMatch,
            Check::ColumnTypeInList { .. } => RuleKind::ColumnTypeInList,
            Check::DateTimeFormatMatch { .. } => RuleKind::DateTimeFormatMatch,
        }
    }

    /// Returns the column a column-level check targets.
    pub fn column(&self) -> Option<&str> {
        match self {
            Check::ValuesNotNull { column }
            | Check::ColumnTypeMatch { column, .. }
            | Check::ColumnTypeInList { column, .. }
            | Check::DateTimeFormatMatch { column, .. } => Some(column),
            _ => None,
        }
    }

    /// Maps the check to its wire `kwargs`, in parameter order.
    fn to_kwargs(&self) -> Map<String, Value> {
        let mut kwargs = Map::new();
        let mut put = |key: &str, value: Value| {
            kwargs.insert(key.to_string(), value);
        };

        match self {
            Check::OrderedColumnsMatch { column_list } => put("column_list", json!(column_list)),
            Check::ColumnsMatch {
                column_set,
                exact_match,
            } => {
                put("column_set", json!(column_set));
                put("exact_match", json!(exact_match));
            }
            Check::RowCountBetween {
                min_value,
                max_value,
            } => {
                put("min_value", json!(min_value));
                put("max_value", json!(max_value));
            }
            Check::ValuesNotNull { column } => put("column", json!(column)),
            Check::ColumnCountEqual { value } => put("value", json!(value)),
            Check::ColumnTypeMatch { column, type_ } => {
                put("column", json!(column));
                put("type_", json!(type_));
            }
            Check::ColumnTypeInList { column, type_list } => {
                put("column", json!(column));
                put("type_list", json!(type_list));
            }
            Check::DateTimeFormatMatch {
                column,
                strftime_format,
            } => {
                put("column", json!(column));
                put("strftime_format", json!(strftime_format));
            }
        }

        kwargs
    }
}

/// An immutable, validated rule.
///
/// # Example
///
/// ```rust
/// use quality_core::{Rule, RuleKind};
///
/// let rule = Rule::row_count_between(10_000, 50_000).unwrap();
/// assert_eq!(rule.kind(), RuleKind::RowCountBetween);
///
/// assert!(Rule::row_count_between(10, 5).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "RuleDocument", try_from = "RuleDocument")]
pub struct Rule {
    check: Check,
    meta: BTreeMap<String, String>,
}

impl Rule {
    /// Expect the columns to exactly match an ordered list.
    pub fn ordered_columns_match<I, S>(column_list: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let column_list = collect_names(column_list);
        require_names(RuleKind::OrderedColumnsMatch, "column_list", &column_list)?;
        Ok(Self::from_check(Check::OrderedColumnsMatch { column_list }))
    }

    /// Expect the columns to match an unordered set.
    ///
    /// With `exact_match` false, extra observed columns are allowed.
    pub fn columns_match<I, S>(column_set: I, exact_match: bool) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let column_set = collect_names(column_set);
        require_names(RuleKind::ColumnsMatch, "column_set", &column_set)?;
        Ok(Self::from_check(Check::ColumnsMatch {
            column_set,
            exact_match,
        }))
    }

    /// Expect the number of rows to be between two values, inclusive.
    pub fn row_count_between(min_rows: i64, max_rows: i64) -> Result<Self> {
        let kind = RuleKind::RowCountBetween;
        let min_value = non_negative(kind, "min_value", min_rows)?;
        let max_value = non_negative(kind, "max_value", max_rows)?;
        if min_value > max_value {
            return Err(QualityError::invalid_rule(
                kind,
                format!("min_value {min_value} is greater than max_value {max_value}"),
            ));
        }
        Ok(Self::from_check(Check::RowCountBetween {
            min_value,
            max_value,
        }))
    }

    /// Expect column values to not be null.
    pub fn values_not_null(column: impl Into<String>) -> Result<Self> {
        let column = column.into();
        require_text(RuleKind::ValuesNotNull, "column", &column)?;
        Ok(Self::from_check(Check::ValuesNotNull { column }))
    }

    /// Expect the number of columns to equal a value.
    pub fn column_count_equal(column_count: i64) -> Result<Self> {
        let value = non_negative(RuleKind::ColumnCountEqual, "value", column_count)?;
        Ok(Self::from_check(Check::ColumnCountEqual { value }))
    }

    /// Expect a column to be of the given type.
    pub fn column_type_match(column: impl Into<String>, column_type: impl Into<String>) -> Result<Self> {
        let kind = RuleKind::ColumnTypeMatch;
        let column = column.into();
        let type_ = column_type.into();
        require_text(kind, "column", &column)?;
        require_text(kind, "type_", &type_)?;
        Ok(Self::from_check(Check::ColumnTypeMatch { column, type_ }))
    }

    /// Expect a column to be of one of the listed types.
    pub fn column_type_in_list<I, S>(column: impl Into<String>, type_list: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let kind = RuleKind::ColumnTypeInList;
        let column = column.into();
        let type_list = collect_names(type_list);
        require_text(kind, "column", &column)?;
        require_names(kind, "type_list", &type_list)?;
        Ok(Self::from_check(Check::ColumnTypeInList { column, type_list }))
    }

    /// Expect column entries to be strings matching a strftime format.
    pub fn datetime_format_match(
        column: impl Into<String>,
        strftime_format: impl Into<String>,
    ) -> Result<Self> {
        let kind = RuleKind::DateTimeFormatMatch;
        let column = column.into();
        let strftime_format = strftime_format.into();
        require_text(kind, "column", &column)?;
        require_text(kind, "strftime_format", &strftime_format)?;
        Ok(Self::from_check(Check::DateTimeFormatMatch {
            column,
            strftime_format,
        }))
    }

    fn from_check(check: Check) -> Self {
        Self {
            check,
            meta: BTreeMap::new(),
        }
    }

    /// Returns a copy of this rule carrying an extra metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Returns the kind tag.
    pub fn kind(&self) -> RuleKind {
        self.check.kind()
    }

    /// Returns the validated parameters.
    pub fn check(&self) -> &Check {
        &self.check
    }

    /// Returns the free-form metadata.
    pub fn meta(&self) -> &BTreeMap<String, String> {
        &self.meta
    }

    /// Returns the `expectation_type` used on the wire.
    pub fn expectation_type(&self) -> &'static str {
        self.kind().expectation_type()
    }

    /// Returns the wire `kwargs` for this rule.
    pub fn kwargs(&self) -> Map<String, Value> {
        self.check.to_kwargs()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), Value::Object(self.kwargs()))
    }
}

/// Wire form of a rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RuleDocument {
    expectation_type: String,
    #[serde(default)]
    kwargs: Map<String, Value>,
    #[serde(default)]
    meta: BTreeMap<String, String>,
}

impl From<Rule> for RuleDocument {
    fn from(rule: Rule) -> Self {
        Self {
            expectation_type: rule.expectation_type().to_string(),
            kwargs: rule.kwargs(),
            meta: rule.meta,
        }
    }
}

impl TryFrom<RuleDocument> for Rule {
    type Error = QualityError;

    fn try_from(document: RuleDocument) -> Result<Self> {
        let kind = RuleKind::from_expectation_type(&document.expectation_type).ok_or_else(|| {
            QualityError::configuration(
                "expectation_type",
                format!("unsupported expectation type '{}'", document.expectation_type),
            )
        })?;
        let kwargs = document.kwargs;

        // Every path goes back through the factory so persisted rules obey
        // the same constraints as freshly built ones.
        let rule = match kind {
            RuleKind::OrderedColumnsMatch => {
                let args: ColumnListArgs = parse_kwargs(kind, kwargs)?;
                Rule::ordered_columns_match(args.column_list)
            }
            RuleKind::ColumnsMatch => {
                let args: ColumnSetArgs = parse_kwargs(kind, kwargs)?;
                Rule::columns_match(args.column_set, args.exact_match)
            }
            RuleKind::RowCountBetween => {
                let args: RowCountArgs = parse_kwargs(kind, kwargs)?;
                Rule::row_count_between(args.min_value, args.max_value)
            }
            RuleKind::ValuesNotNull => {
                let args: ColumnArgs = parse_kwargs(kind, kwargs)?;
                Rule::values_not_null(args.column)
            }
            RuleKind::ColumnCountEqual => {
                let args: ValueArgs = parse_kwargs(kind, kwargs)?;
                Rule::column_count_equal(args.value)
            }
            RuleKind::ColumnTypeMatch => {
                let args: TypeArgs = parse_kwargs(kind, kwargs)?;
                Rule::column_type_match(args.column, args.type_)
            }
            RuleKind::ColumnTypeInList => {
                let args: TypeListArgs = parse_kwargs(kind, kwargs)?;
                Rule::column_type_in_list(args.column, args.type_list)
            }
            RuleKind::DateTimeFormatMatch => {
                let args: FormatArgs = parse_kwargs(kind, kwargs)?;
                Rule::datetime_format_match(args.column, args.strftime_format)
            }
        }?;

        Ok(Rule {
            meta: document.meta,
            ..rule
        })
    }
}

#[derive(Deserialize)]
struct ColumnListArgs {
    column_list: Vec<String>,
}

#[derive(Deserialize)]
struct ColumnSetArgs {
    column_set: Vec<String>,
    #[serde(default = "default_exact_match")]
    exact_match: bool,
}

#[derive(Deserialize)]
struct RowCountArgs {
    min_value: i64,
    max_value: i64,
}

#[derive(Deserialize)]
struct ColumnArgs {
    column: String,
}

#[derive(Deserialize)]
struct ValueArgs {
    value: i64,
}

#[derive(Deserialize)]
struct TypeArgs {
    column: String,
    type_: String,
}

#[derive(Deserialize)]
struct TypeListArgs {
    column: String,
    type_list: Vec<String>,
}

#[derive(Deserialize)]
struct FormatArgs {
    column: String,
    strftime_format: String,
}

fn default_exact_match() -> bool {
    true
}

fn parse_kwargs<T: DeserializeOwned>(kind: RuleKind, kwargs: Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(kwargs))
        .map_err(|e| QualityError::invalid_rule(kind, format!("malformed kwargs: {e}")))
}

fn collect_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}

fn require_text(kind: RuleKind, param: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(QualityError::invalid_rule(
            kind,
            format!("{param} must not be empty"),
        ));
    }
    Ok(())
}

fn require_names(kind: RuleKind, param: &str, names: &[String]) -> Result<()> {
    if names.is_empty() {
        return Err(QualityError::invalid_rule(
            kind,
            format!("{param} must contain at least one entry"),
        ));
    }
    if names.iter().any(|name| name.trim().is_empty()) {
        return Err(QualityError::invalid_rule(
            kind,
            format!("{param} must not contain empty names"),
        ));
    }
    Ok(())
}

fn non_negative(kind: RuleKind, param: &str, value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| {
        QualityError::invalid_rule(kind, format!("{param} must be non-negative, got {value}"))
    })
}

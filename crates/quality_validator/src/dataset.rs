//! Batch representation for validation.
//!
//! A [`DataSet`] is an in-memory columnar batch: an ordered column schema
//! plus rows keyed by column name. It is the batch type understood by
//! [`DataSetEvaluator`](crate::DataSetEvaluator).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::RuleViolation;

/// A value in a dataset.
///
/// Deserializes from plain JSON scalars, arrays and objects. Dates and
/// timestamps arrive from JSON as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    /// Null/missing value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
    /// List/array value
    List(Vec<DataValue>),
    /// Map/struct value
    Map(HashMap<String, DataValue>),
}

impl DataValue {
    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Null => "null",
            DataValue::String(_) => "string",
            DataValue::Int(_) => "int64",
            DataValue::Float(_) => "float64",
            DataValue::Bool(_) => "boolean",
            DataValue::Map(_) => "map",
            DataValue::List(_) => "list",
        }
    }

    /// Returns the textual content of string values.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DataValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<String> for DataValue {
    fn from(s: String) -> Self {
        DataValue::String(s)
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        DataValue::String(s.to_string())
    }
}

impl From<i64> for DataValue {
    fn from(i: i64) -> Self {
        DataValue::Int(i)
    }
}

impl From<f64> for DataValue {
    fn from(f: f64) -> Self {
        DataValue::Float(f)
    }
}

impl From<bool> for DataValue {
    fn from(b: bool) -> Self {
        DataValue::Bool(b)
    }
}

impl<T: Into<DataValue>> From<Option<T>> for DataValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(DataValue::Null, Into::into)
    }
}

/// A single row of data. Absent columns read as null.
pub type DataRow = HashMap<String, DataValue>;

/// Declared name and type of one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name
    pub name: String,

    /// Declared type (e.g. "string", "int64", "StringType")
    #[serde(rename = "type")]
    pub data_type: String,
}

impl ColumnSchema {
    /// Creates a new column schema.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

static NULL: DataValue = DataValue::Null;

/// A batch of rows with an ordered column schema.
///
/// Serializes as `{"columns": [{"name", "type"}], "rows": [{...}]}`.
///
/// # Example
///
/// ```rust
/// use quality_validator::{ColumnSchema, DataSet, DataValue};
/// use std::collections::HashMap;
///
/// let mut dataset = DataSet::new(vec![
///     ColumnSchema::new("id", "int64"),
///     ColumnSchema::new("dt", "string"),
/// ]);
/// dataset.add_row(HashMap::from([
///     ("id".to_string(), DataValue::Int(1)),
///     ("dt".to_string(), DataValue::from("2022-06-05")),
/// ]));
///
/// assert_eq!(dataset.column_names(), vec!["id", "dt"]);
/// assert_eq!(dataset.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSet {
    columns: Vec<ColumnSchema>,
    #[serde(default)]
    rows: Vec<DataRow>,
}

impl DataSet {
    /// Creates an empty dataset with the given columns.
    pub fn new(columns: Vec<ColumnSchema>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Creates a dataset from columns and rows.
    pub fn from_rows(columns: Vec<ColumnSchema>, rows: Vec<DataRow>) -> Self {
        Self { columns, rows }
    }

    /// Parses a dataset from its JSON form.
    pub fn from_json(content: &str) -> Result<Self, RuleViolation> {
        let dataset: DataSet = serde_json::from_str(content)
            .map_err(|e| RuleViolation::MalformedBatch(e.to_string()))?;
        dataset.check_columns()?;
        Ok(dataset)
    }

    /// Serializes the dataset to JSON.
    pub fn to_json(&self) -> Result<String, RuleViolation> {
        serde_json::to_string_pretty(self).map_err(|e| RuleViolation::MalformedBatch(e.to_string()))
    }

    fn check_columns(&self) -> Result<(), RuleViolation> {
        let mut seen = std::collections::HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(RuleViolation::MalformedBatch(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
        }
        Ok(())
    }

    /// Returns the number of rows in the dataset.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the column schema, in order.
    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    /// Returns the column names, in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns an iterator over the rows.
    pub fn rows(&self) -> impl Iterator<Item = &DataRow> {
        self.rows.iter()
    }

    /// Returns the values of one column, reading absent cells as null.
    pub fn values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a DataValue> + 'a {
        self.rows.iter().map(move |row| row.get(column).unwrap_or(&NULL))
    }

    /// Adds a row to the dataset.
    pub fn add_row(&mut self, row: DataRow) {
        self.rows.push(row);
    }

    /// Keeps only the given columns, in the given order.
    pub fn select(&self, names: &[impl AsRef<str>]) -> Result<DataSet, RuleViolation> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let column = self
                .column(name)
                .ok_or_else(|| RuleViolation::missing_column(name))?;
            columns.push(column.clone());
        }

        let rows = self
            .rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .filter_map(|c| row.get(&c.name).map(|v| (c.name.clone(), v.clone())))
                    .collect()
            })
            .collect();

        Ok(DataSet { columns, rows })
    }

    /// Renames a column in the schema and every row.
    ///
    /// Renaming a column to its own name is a no-op.
    pub fn rename(mut self, from: &str, to: &str) -> Result<DataSet, RuleViolation> {
        if from == to {
            return match self.column(from) {
                Some(_) => Ok(self),
                None => Err(RuleViolation::missing_column(from)),
            };
        }
        if self.column(to).is_some() {
            return Err(RuleViolation::MalformedBatch(format!(
                "cannot rename '{from}' to existing column '{to}'"
            )));
        }
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == from)
            .ok_or_else(|| RuleViolation::missing_column(from))?;
        column.name = to.to_string();

        for row in &mut self.rows {
            if let Some(value) = row.remove(from) {
                row.insert(to.to_string(), value);
            }
        }
        Ok(self)
    }
}

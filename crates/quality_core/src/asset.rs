//! Identifiers for the data being validated.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::builder::is_key_segment;
use crate::{QualityError, Result};

/// Composite identifier for a validated batch: a table plus its partition key.
///
/// The canonical string form `"{table_name}_{dt}"` doubles as the run name
/// of a validation and appears in result keys and alerts.
///
/// ```rust
/// use quality_core::DataAssetName;
///
/// let asset = DataAssetName::new("custom_table", "2022-06-05");
/// assert_eq!(asset.to_string(), "custom_table_2022-06-05");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataAssetName {
    /// Table name
    pub table_name: String,

    /// Date or partition key
    pub dt: String,
}

impl DataAssetName {
    /// Creates a new asset name.
    pub fn new(table_name: impl Into<String>, dt: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            dt: dt.into(),
        }
    }
}

impl DataAssetName {
    /// Creates an asset name whose parts are safe to use in storage keys.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either part is empty or contains
    /// characters outside letters, digits, `_`, `.` and `-`.
    pub fn checked(table_name: impl Into<String>, dt: impl Into<String>) -> Result<Self> {
        let asset = Self::new(table_name, dt);
        for (field, value) in [("table_name", &asset.table_name), ("dt", &asset.dt)] {
            if !is_key_segment(value) {
                return Err(QualityError::configuration(
                    field,
                    format!(
                        "'{value}' may only contain letters, digits, '_', '.' and '-' and must start with a letter or digit"
                    ),
                ));
            }
        }
        Ok(asset)
    }
}

impl fmt::Display for DataAssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.table_name, self.dt)
    }
}

//! # Data Quality Validator
//!
//! In-process evaluation engine for data quality suites. This crate checks
//! an in-memory [`DataSet`] batch against every rule of a suite:
//!
//! - Table checks (column order, column set, column count, row count)
//! - Column checks (nulls, declared types, strftime formats)
//!
//! ## Example
//!
//! ```rust
//! use quality_core::{Evaluator, Rule, SuiteBuilder};
//! use quality_validator::{ColumnSchema, DataSet, DataSetEvaluator};
//!
//! let suite = SuiteBuilder::new("events_suite")
//!     .add(Rule::ordered_columns_match(["id", "dt"])?)
//!     .add(Rule::column_type_match("dt", "StringType")?)
//!     .build()?;
//!
//! let batch = DataSet::new(vec![
//!     ColumnSchema::new("id", "int64"),
//!     ColumnSchema::new("dt", "string"),
//! ]);
//!
//! let outcome = DataSetEvaluator::new().evaluate(&suite, &batch, "events_2022-06-05")?;
//! assert!(outcome.success);
//! # Ok::<(), quality_core::QualityError>(())
//! ```

pub mod column;
mod dataset;
mod engine;
mod error;
pub mod table;
mod types;

pub use dataset::*;
pub use engine::*;
pub use error::*;
pub use types::*;

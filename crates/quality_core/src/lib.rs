//! # Data Quality Core
//!
//! Core types for the data quality gate that runs in front of batch
//! publication.
//!
//! An operator describes what a dataset must look like as a list of
//! strongly-typed [`Rule`]s, bundles them into a named [`Suite`] with the
//! [`SuiteBuilder`], persists the suite, and later runs it against a batch
//! with a [`ValidationRunner`] to get a pass/fail verdict, a durable
//! [`ValidationResult`] and an [`Alert`] on failure.
//!
//! ## Key Concepts
//!
//! - **Rule**: One checkable property of a dataset (column order, row count, nulls, types, formats)
//! - **Suite**: A named, ordered collection of rules plus metadata, persisted as one JSON document
//! - **Runner**: Binds a suite to a batch, delegates evaluation and decides pass/fail
//! - **Services**: The [`Evaluator`], [`SuiteStore`], [`ResultSink`] and [`Notifier`] seams
//!
//! ## Example
//!
//! ```rust
//! use quality_core::{Rule, SuiteBuilder};
//!
//! let columns = ["col1", "col2", "col3", "col4", "dt"];
//!
//! let suite = SuiteBuilder::new("dataframe_validation_suite")
//!     .add(Rule::row_count_between(10_000, 50_000)?)
//!     .add(Rule::ordered_columns_match(columns)?)
//!     .add(Rule::columns_match(columns, false)?)
//!     .build()?;
//!
//! assert_eq!(suite.rules().len(), 3);
//! # Ok::<(), quality_core::QualityError>(())
//! ```

pub mod asset;
pub mod builder;
pub mod config;
pub mod error;
pub mod result;
pub mod rule;
pub mod runner;
pub mod services;
pub mod suite;

pub use asset::*;
pub use builder::*;
pub use config::*;
pub use error::*;
pub use result::*;
pub use rule::*;
pub use runner::*;
pub use services::*;
pub use suite::*;

//! # Data Quality Store
//!
//! Storage and alerting backends for the validation runner:
//!
//! - [`ObjectStore`] backends with explicit write acknowledgement
//!   ([`LocalObjectStore`], [`InMemoryObjectStore`])
//! - [`BucketStore`], the [`SuiteStore`](quality_core::SuiteStore) and
//!   [`ResultSink`](quality_core::ResultSink) over an object store
//! - [`LogNotifier`] and [`WebhookNotifier`] alert channels

mod bucket;
mod notify;
mod object;

pub use bucket::*;
pub use notify::*;
pub use object::*;

//! Stats module - derived metrics and snapshot views

mod aggregator;

pub use aggregator::{AggregateError, Aggregator, LocationSeries};

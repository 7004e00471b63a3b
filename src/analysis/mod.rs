//! Analysis modules.
//!
//! This module holds the aggregation pipeline that turns raw dataset
//! records into the slide datasets.

pub mod aggregator;

pub use aggregator::*;

//! Dataset retrieval.

pub mod client;

pub use client::DataFetcher;

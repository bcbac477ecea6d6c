//! Domain layer for Insight.
//!
//! Holds everything the query-to-visualization pipeline decides on:
//! the dataset catalog, intent classification, series normalization and
//! the query session state machine. Nothing here performs IO or waits.

pub mod catalog;
pub mod chart;
pub mod config;
pub mod error;
pub mod intent;
pub mod query;
pub mod suggestion;

// Re-export common error type
pub use error::{InsightError, Result};

//! Application layer for Insight.
//!
//! This crate provides the use case that drives a query session through its
//! lifecycle, and the deterministic resolver standing in for a real backend.

pub mod keyword_resolver;
pub mod pipeline;

pub use keyword_resolver::KeywordQueryResolver;
pub use pipeline::{QueryPipeline, SubmissionHandle};

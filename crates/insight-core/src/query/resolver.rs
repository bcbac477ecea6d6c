use async_trait::async_trait;

use super::result::ChartResult;
use crate::error::Result;

/// Turns free text into a chart result.
///
/// The contract a real language-understanding backend must satisfy:
/// the future settles with a complete `ChartResult` whose `source_query`
/// is the query it was given, or with an error. Never with partial data.
/// A topic that has no dataset fails with `InsightError::NotFound`.
#[async_trait]
pub trait QueryResolver: Send + Sync {
    async fn resolve(&self, query: &str) -> Result<ChartResult>;
}

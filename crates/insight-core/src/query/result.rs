use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::ChartDataset;
use crate::chart::{ChartSeries, normalize};

/// A dataset answering a specific query, stamped with when it was resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartResult {
    #[serde(flatten)]
    pub dataset: ChartDataset,
    pub source_query: String,
    pub resolved_at: DateTime<Utc>,
}

impl ChartResult {
    /// Stamps `dataset` with `query` and the current time.
    pub fn new(dataset: ChartDataset, query: impl Into<String>) -> Self {
        Self::resolved_at(dataset, query, Utc::now())
    }

    pub fn resolved_at(
        dataset: ChartDataset,
        query: impl Into<String>,
        resolved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            dataset,
            source_query: query.into(),
            resolved_at,
        }
    }

    pub fn title(&self) -> &str {
        &self.dataset.title
    }

    pub fn topic_key(&self) -> &str {
        &self.dataset.topic_key
    }

    pub fn to_series(&self) -> ChartSeries {
        normalize(&self.dataset)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::result::ChartResult;
use super::state::SessionState;
use crate::chart::ChartSeries;

/// A resolved result as the presentation layer sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedChart {
    pub series: ChartSeries,
    pub source_query: String,
    pub resolved_at: DateTime<Utc>,
}

impl ResolvedChart {
    pub fn from_result(result: &ChartResult) -> Self {
        Self {
            series: result.to_series(),
            source_query: result.source_query.clone(),
            resolved_at: result.resolved_at,
        }
    }
}

/// Read-only copy of a query session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub input_text: String,
    pub history: Vec<String>,
    pub processing: bool,
    pub state: SessionState,
    pub chart: Option<ResolvedChart>,
    pub error: Option<String>,
    pub sequence: u64,
}

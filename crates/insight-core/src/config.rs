//! Pipeline configuration model.
//!
//! Loaded from `config.toml` by the infrastructure layer. Every field has a
//! default, so an empty or partial file is valid.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{InsightError, Result};
use crate::suggestion::default_suggestions;

pub const DEFAULT_HISTORY_LIMIT: usize = 10;
pub const DEFAULT_LATENCY_MS: u64 = 1500;

/// What happens when a query is submitted while another is still processing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SubmitPolicy {
    /// The new submission is refused with `Busy`.
    #[default]
    Reject,
    /// The new submission wins; the older outcome is discarded.
    Supersede,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum number of queries kept in history.
    pub history_limit: usize,
    /// Simulated backend latency before a resolution settles.
    pub latency_ms: u64,
    /// Upper bound of extra random latency added on top of `latency_ms`.
    pub latency_jitter_ms: u64,
    /// Fail a resolution that takes longer than this. Unset means wait forever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve_timeout_ms: Option<u64>,
    pub submit_policy: SubmitPolicy,
    /// Optional TOML catalog replacing the builtin datasets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
    pub suggestions: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            latency_ms: DEFAULT_LATENCY_MS,
            latency_jitter_ms: 0,
            resolve_timeout_ms: None,
            submit_policy: SubmitPolicy::default(),
            catalog_path: None,
            suggestions: default_suggestions(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.history_limit == 0 {
            return Err(InsightError::config("history_limit must be at least 1"));
        }
        if self.resolve_timeout_ms == Some(0) {
            return Err(InsightError::config("resolve_timeout_ms must be greater than 0"));
        }
        Ok(())
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    pub fn jitter(&self) -> Duration {
        Duration::from_millis(self.latency_jitter_ms)
    }

    pub fn resolve_timeout(&self) -> Option<Duration> {
        self.resolve_timeout_ms.map(Duration::from_millis)
    }
}

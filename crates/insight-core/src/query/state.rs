use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use super::result::ChartResult;

/// Lifecycle position of a query session.
///
/// `Resolved` and `Failed` are display states: a fresh submit from any of
/// them re-enters `Processing`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Processing,
    Resolved,
    Failed,
}

/// How a resolution settled.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Resolved(ChartResult),
    Failed(String),
}

/// Issued by a successful submit. The sequence number identifies the
/// submission when its outcome is applied later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub sequence: u64,
    pub query: String,
    /// Sequence of the in-flight submission this one replaced, if any.
    pub superseded: Option<u64>,
}

/// Result of applying an outcome to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The outcome belonged to the current submission and was recorded.
    Applied(SessionState),
    /// The outcome belonged to an older submission and was dropped.
    Stale,
}

impl Completion {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

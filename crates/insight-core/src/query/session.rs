//! Query session state machine.
//!
//! Every mutation of the session goes through the methods here:
//!
//! | From | Event | To |
//! |---|---|---|
//! | any | `set_input`, `select_*`, `clear_input` | same |
//! | any (see policy) | `submit` with text | `Processing` |
//! | any | `submit` with blank text | same, `InputRejected` |
//! | `Processing` | `complete` with the current sequence | `Resolved` / `Failed` |
//! | `Resolved` | `clear_result` | `Idle` |
//!
//! Outcomes carrying an outdated sequence number are ignored, which makes
//! the newest submission win even when an older resolution settles last.

use tracing::{debug, warn};

use super::history::QueryHistory;
use super::result::ChartResult;
use super::snapshot::{ResolvedChart, SessionSnapshot};
use super::state::{Completion, Outcome, SessionState, Submission};
use crate::config::{DEFAULT_HISTORY_LIMIT, PipelineConfig, SubmitPolicy};
use crate::error::{GENERIC_RESOLUTION_FAILURE, InsightError, Result};

#[derive(Debug, Clone)]
pub struct QuerySession {
    input_text: String,
    history: QueryHistory,
    processing: bool,
    last_result: Option<ChartResult>,
    last_error: Option<String>,
    policy: SubmitPolicy,
    /// Sequence number of the most recent accepted submission. Zero before any.
    sequence: u64,
}

impl Default for QuerySession {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT, SubmitPolicy::default())
    }
}

impl QuerySession {
    pub fn new(history_limit: usize, policy: SubmitPolicy) -> Self {
        Self {
            input_text: String::new(),
            history: QueryHistory::new(history_limit),
            processing: false,
            last_result: None,
            last_error: None,
            policy,
            sequence: 0,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.history_limit, config.submit_policy)
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn state(&self) -> SessionState {
        if self.processing {
            SessionState::Processing
        } else if self.last_error.is_some() {
            SessionState::Failed
        } else if self.last_result.is_some() {
            SessionState::Resolved
        } else {
            SessionState::Idle
        }
    }

    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    pub fn history(&self) -> &QueryHistory {
        &self.history
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn last_result(&self) -> Option<&ChartResult> {
        self.last_result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn policy(&self) -> SubmitPolicy {
        self.policy
    }

    pub fn current_sequence(&self) -> u64 {
        self.sequence
    }

    /// Whether `submit` would currently be accepted for non-blank text.
    pub fn can_submit(&self) -> bool {
        !self.processing || self.policy == SubmitPolicy::Supersede
    }

    // ============================================================================
    // Input intents
    // ============================================================================

    /// Replaces the draft. Touches nothing else.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input_text = text.into();
    }

    pub fn clear_input(&mut self) {
        self.input_text.clear();
    }

    /// Copies the history entry at `index` (0 = most recent) into the draft.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when `index` is out of range.
    pub fn select_history_item(&mut self, index: usize) -> Result<()> {
        let query = self
            .history
            .get(index)
            .map(str::to_string)
            .ok_or_else(|| InsightError::not_found("history item", index.to_string()))?;
        self.set_input(query);
        Ok(())
    }

    /// Copies `query` into the draft. Same semantics as `set_input`.
    pub fn select_history_text(&mut self, query: impl Into<String>) {
        self.set_input(query);
    }

    /// Copies `suggestion` into the draft. Same semantics as `set_input`.
    pub fn select_suggestion(&mut self, suggestion: impl Into<String>) {
        self.set_input(suggestion);
    }

    // ============================================================================
    // Lifecycle transitions
    // ============================================================================

    /// Starts processing `text`.
    ///
    /// The query is trimmed before it is recorded. Clears the previous
    /// result and error and records the query in history.
    ///
    /// # Errors
    ///
    /// - `InputRejected` when `text` is blank; the session is untouched.
    /// - `Busy` when a query is processing and the policy is `Reject`.
    pub fn submit(&mut self, text: &str) -> Result<Submission> {
        let query = text.trim();
        if query.is_empty() {
            return Err(InsightError::input_rejected("query is empty"));
        }

        let superseded = if self.processing {
            match self.policy {
                SubmitPolicy::Reject => {
                    warn!(target: "insight::session", sequence = self.sequence, "Submit rejected while processing");
                    return Err(InsightError::Busy);
                }
                SubmitPolicy::Supersede => Some(self.sequence),
            }
        } else {
            None
        };

        self.sequence += 1;
        self.processing = true;
        self.last_result = None;
        self.last_error = None;
        self.history.push(query);

        debug!(target: "insight::session", sequence = self.sequence, ?superseded, "Submission accepted");

        Ok(Submission {
            sequence: self.sequence,
            query: query.to_string(),
            superseded,
        })
    }

    /// Applies the outcome of submission `sequence`.
    ///
    /// Ignored unless the session is processing and `sequence` is the most
    /// recent submission.
    pub fn complete(&mut self, sequence: u64, outcome: Outcome) -> Completion {
        if !self.processing || sequence != self.sequence {
            debug!(
                target: "insight::session",
                sequence,
                current = self.sequence,
                "Dropping stale outcome"
            );
            return Completion::Stale;
        }

        self.processing = false;
        match outcome {
            Outcome::Resolved(result) => {
                self.last_error = None;
                self.last_result = Some(result);
            }
            Outcome::Failed(message) => {
                let message = if message.trim().is_empty() {
                    GENERIC_RESOLUTION_FAILURE.to_string()
                } else {
                    message
                };
                self.last_result = None;
                self.last_error = Some(message);
            }
        }

        Completion::Applied(self.state())
    }

    pub fn resolve(&mut self, sequence: u64, result: ChartResult) -> Completion {
        self.complete(sequence, Outcome::Resolved(result))
    }

    pub fn fail(&mut self, sequence: u64, message: impl Into<String>) -> Completion {
        self.complete(sequence, Outcome::Failed(message.into()))
    }

    /// Drops the displayed result. No effect while processing.
    pub fn clear_result(&mut self) {
        if !self.processing {
            self.last_result = None;
        }
    }

    /// Read-only view for the presentation layer.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            input_text: self.input_text.clone(),
            history: self.history.to_vec(),
            processing: self.processing,
            state: self.state(),
            chart: self.last_result.as_ref().map(ResolvedChart::from_result),
            error: self.last_error.clone(),
            sequence: self.sequence,
        }
    }
}

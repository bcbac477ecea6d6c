//! Query pipeline use case.
//!
//! `QueryPipeline` owns the query session and is the only component allowed
//! to apply resolver outcomes to it. Each accepted submission is resolved on
//! a spawned task; when the task settles, the outcome is applied only if its
//! sequence number is still the session's current one.
//!
//! # Thread Safety
//!
//! The session sits behind a `tokio::sync::RwLock` inside an `Arc`, so the
//! pipeline is cheap to clone and every clone drives the same session. Lock
//! order is always session first, then the in-flight slot.

use std::sync::Arc;
use std::time::Duration;

use insight_core::config::PipelineConfig;
use insight_core::error::{GENERIC_RESOLUTION_FAILURE, InsightError, QUERY_CANCELLED, Result};
use insight_core::query::{
    Completion, Outcome, QueryResolver, QuerySession, SessionSnapshot, Submission,
};
use insight_core::suggestion::SuggestionBook;
use tokio::sync::{Mutex, RwLock, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const TARGET: &str = "insight::pipeline";

/// Resolution currently awaited by the pipeline.
struct InFlight {
    sequence: u64,
    cancel: CancellationToken,
}

struct Shared {
    session: RwLock<QuerySession>,
    updates: watch::Sender<SessionSnapshot>,
    in_flight: Mutex<Option<InFlight>>,
}

impl Shared {
    fn publish(&self, snapshot: SessionSnapshot) {
        self.updates.send_replace(snapshot);
    }
}

/// Handle to a submission whose resolution runs in the background.
#[derive(Debug)]
pub struct SubmissionHandle {
    pub sequence: u64,
    pub query: String,
    pub superseded: Option<u64>,
    task: JoinHandle<Completion>,
}

impl SubmissionHandle {
    /// Waits until the outcome has been applied to (or dropped by) the session.
    pub async fn wait(self) -> Completion {
        match self.task.await {
            Ok(completion) => completion,
            Err(e) => {
                error!(target: TARGET, sequence = self.sequence, "Resolution task ended abnormally: {}", e);
                Completion::Stale
            }
        }
    }
}

#[derive(Clone)]
pub struct QueryPipeline {
    shared: Arc<Shared>,
    resolver: Arc<dyn QueryResolver>,
    suggestions: Arc<SuggestionBook>,
    resolve_timeout: Option<Duration>,
}

impl QueryPipeline {
    /// Creates a pipeline around a fresh session configured by `config`.
    pub fn new(resolver: Arc<dyn QueryResolver>, config: &PipelineConfig) -> Self {
        Self::with_session(
            resolver,
            QuerySession::from_config(config),
            SuggestionBook::new(config.suggestions.clone()),
            config.resolve_timeout(),
        )
    }

    pub fn with_session(
        resolver: Arc<dyn QueryResolver>,
        session: QuerySession,
        suggestions: SuggestionBook,
        resolve_timeout: Option<Duration>,
    ) -> Self {
        let (updates, _) = watch::channel(session.snapshot());
        Self {
            shared: Arc::new(Shared {
                session: RwLock::new(session),
                updates,
                in_flight: Mutex::new(None),
            }),
            resolver,
            suggestions: Arc::new(suggestions),
            resolve_timeout,
        }
    }

    /// Receives a new snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.updates.subscribe()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.shared.session.read().await.snapshot()
    }

    pub fn suggestion_book(&self) -> &SuggestionBook {
        &self.suggestions
    }

    /// Suggestions matching the current draft.
    pub async fn suggestions_for_input(&self) -> Vec<String> {
        let session = self.shared.session.read().await;
        self.suggestions
            .filter(session.input_text())
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    // ============================================================================
    // Input intents
    // ============================================================================

    async fn mutate<T>(&self, f: impl FnOnce(&mut QuerySession) -> T) -> T {
        let mut session = self.shared.session.write().await;
        let value = f(&mut *session);
        self.shared.publish(session.snapshot());
        value
    }

    pub async fn set_input(&self, text: impl Into<String>) {
        let text = text.into();
        self.mutate(|session| session.set_input(text)).await
    }

    pub async fn clear_input(&self) {
        self.mutate(QuerySession::clear_input).await
    }

    /// Copies a history entry (0 = most recent) into the draft.
    pub async fn select_history_item(&self, index: usize) -> Result<()> {
        self.mutate(|session| session.select_history_item(index)).await
    }

    pub async fn select_suggestion(&self, suggestion: impl Into<String>) {
        let suggestion = suggestion.into();
        self.mutate(|session| session.select_suggestion(suggestion)).await
    }

    pub async fn clear_result(&self) {
        self.mutate(QuerySession::clear_result).await
    }

    // ============================================================================
    // Submission
    // ============================================================================

    /// Submits `text` and starts resolving it in the background.
    ///
    /// # Errors
    ///
    /// - `InputRejected` for blank text.
    /// - `Busy` when a query is processing and the policy is `Reject`.
    pub async fn submit(&self, text: &str) -> Result<SubmissionHandle> {
        let mut session = self.shared.session.write().await;
        let submission = session.submit(text)?;

        let cancel = CancellationToken::new();
        {
            let mut in_flight = self.shared.in_flight.lock().await;
            if let Some(previous) = in_flight.replace(InFlight {
                sequence: submission.sequence,
                cancel: cancel.clone(),
            }) {
                debug!(target: TARGET, superseded = previous.sequence, "Cancelling superseded resolution");
                previous.cancel.cancel();
            }
        }
        // Published under the lock so a settling resolution cannot overwrite it.
        self.shared.publish(session.snapshot());
        drop(session);

        info!(target: TARGET, sequence = submission.sequence, query = %submission.query, "Query submitted");

        let Submission {
            sequence,
            query,
            superseded,
        } = submission;

        let task = tokio::spawn(run_resolution(
            Arc::clone(&self.shared),
            Arc::clone(&self.resolver),
            sequence,
            query.clone(),
            self.resolve_timeout,
            cancel,
        ));

        Ok(SubmissionHandle {
            sequence,
            query,
            superseded,
            task,
        })
    }

    /// Submits the current draft.
    pub async fn submit_input(&self) -> Result<SubmissionHandle> {
        let text = self.shared.session.read().await.input_text().to_string();
        self.submit(&text).await
    }

    /// Submits `text` and waits for its outcome to be applied.
    pub async fn submit_and_wait(&self, text: &str) -> Result<Completion> {
        Ok(self.submit(text).await?.wait().await)
    }

    /// Cancels the resolution in flight, if any, and fails the session with
    /// [`QUERY_CANCELLED`] so the next submit is accepted.
    ///
    /// Returns `true` when a resolution was cancelled.
    pub async fn cancel_in_flight(&self) -> bool {
        let mut session = self.shared.session.write().await;
        let Some(in_flight) = self.shared.in_flight.lock().await.take() else {
            return false;
        };
        in_flight.cancel.cancel();

        let completion = session.complete(
            in_flight.sequence,
            Outcome::Failed(QUERY_CANCELLED.to_string()),
        );
        if completion.is_applied() {
            self.shared.publish(session.snapshot());
        }
        debug!(target: TARGET, sequence = in_flight.sequence, "Resolution cancelled by caller");
        true
    }
}

/// Resolves one submission and applies its outcome.
async fn run_resolution(
    shared: Arc<Shared>,
    resolver: Arc<dyn QueryResolver>,
    sequence: u64,
    query: String,
    resolve_timeout: Option<Duration>,
    cancel: CancellationToken,
) -> Completion {
    let Some(outcome) = settle(resolver, query, resolve_timeout, &cancel).await else {
        debug!(target: TARGET, sequence, "Resolution cancelled");
        return Completion::Stale;
    };

    let mut session = shared.session.write().await;
    let completion = session.complete(sequence, outcome);
    match completion {
        Completion::Applied(state) => {
            {
                let mut in_flight = shared.in_flight.lock().await;
                if in_flight.as_ref().is_some_and(|f| f.sequence == sequence) {
                    in_flight.take();
                }
            }
            shared.publish(session.snapshot());
            drop(session);
            info!(target: TARGET, sequence, %state, "Query settled");
        }
        Completion::Stale => {
            warn!(target: TARGET, sequence, "Ignoring outcome of superseded submission");
        }
    }
    completion
}

/// Runs the resolver on its own task so a panic or timeout becomes a failure
/// outcome. Returns `None` when cancelled.
async fn settle(
    resolver: Arc<dyn QueryResolver>,
    query: String,
    resolve_timeout: Option<Duration>,
    cancel: &CancellationToken,
) -> Option<Outcome> {
    let work = tokio::spawn(async move { resolver.resolve(&query).await });
    let abort = work.abort_handle();

    let joined = async {
        match resolve_timeout {
            Some(limit) => tokio::time::timeout(limit, work).await.map_err(|_| limit),
            None => Ok(work.await),
        }
    };

    let settled = tokio::select! {
        _ = cancel.cancelled() => {
            abort.abort();
            return None;
        }
        settled = joined => settled,
    };

    let outcome = match settled {
        Ok(Ok(Ok(result))) => Outcome::Resolved(result),
        Ok(Ok(Err(e))) => {
            error!(target: TARGET, "Resolver failed: {}", e);
            Outcome::Failed(e.user_message())
        }
        Ok(Err(join_error)) => {
            error!(target: TARGET, "Resolver task failed: {}", join_error);
            Outcome::Failed(GENERIC_RESOLUTION_FAILURE.to_string())
        }
        Err(limit) => {
            abort.abort();
            let err = InsightError::Timeout {
                after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            };
            warn!(target: TARGET, "{}", err);
            Outcome::Failed(err.user_message())
        }
    };
    Some(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use insight_core::catalog::{DatasetCatalog, InMemoryCatalog, topics};
    use insight_core::config::SubmitPolicy;
    use insight_core::query::{ChartResult, SessionState};

    /// Resolver answering with the sales dataset after a per-query delay.
    struct DelayResolver {
        delays: Vec<(&'static str, u64)>,
    }

    #[async_trait]
    impl QueryResolver for DelayResolver {
        async fn resolve(&self, query: &str) -> Result<ChartResult> {
            let delay = self
                .delays
                .iter()
                .find(|(q, _)| *q == query)
                .map(|(_, ms)| *ms)
                .unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            let dataset = InMemoryCatalog::seeded().lookup(topics::SALES).unwrap();
            Ok(ChartResult::new(dataset, query))
        }
    }

    struct PanickingResolver;

    #[async_trait]
    impl QueryResolver for PanickingResolver {
        async fn resolve(&self, _query: &str) -> Result<ChartResult> {
            panic!("resolver blew up");
        }
    }

    fn pipeline(resolver: impl QueryResolver + 'static, policy: SubmitPolicy, timeout: Option<u64>) -> QueryPipeline {
        let config = PipelineConfig {
            submit_policy: policy,
            resolve_timeout_ms: timeout,
            ..Default::default()
        };
        QueryPipeline::new(Arc::new(resolver), &config)
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_publishes_processing_then_resolved() {
        let pipeline = pipeline(DelayResolver { delays: vec![("a", 100)] }, SubmitPolicy::Reject, None);
        let mut updates = pipeline.subscribe();

        let handle = pipeline.submit("a").await.unwrap();
        assert!(updates.borrow_and_update().processing);

        assert_eq!(handle.wait().await, Completion::Applied(SessionState::Resolved));
        updates.changed().await.unwrap();
        let snapshot = updates.borrow().clone();
        assert_eq!(snapshot.state, SessionState::Resolved);
        assert_eq!(snapshot.chart.unwrap().source_query, "a");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reject_policy_while_processing() {
        let pipeline = pipeline(DelayResolver { delays: vec![("a", 100)] }, SubmitPolicy::Reject, None);
        let handle = pipeline.submit("a").await.unwrap();

        let err = pipeline.submit("b").await.unwrap_err();
        assert!(err.is_busy());

        handle.wait().await;
        assert_eq!(pipeline.snapshot().await.history, vec!["a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_supersede_last_submit_wins() {
        let pipeline = pipeline(
            DelayResolver {
                delays: vec![("a", 500), ("b", 50)],
            },
            SubmitPolicy::Supersede,
            None,
        );

        let first = pipeline.submit("a").await.unwrap();
        let second = pipeline.submit("b").await.unwrap();
        assert_eq!(second.superseded, Some(first.sequence));

        assert!(second.wait().await.is_applied());
        assert_eq!(first.wait().await, Completion::Stale);

        let snapshot = pipeline.snapshot().await;
        assert_eq!(snapshot.chart.unwrap().source_query, "b");
        assert!(!snapshot.processing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fails_and_late_result_ignored() {
        let pipeline = pipeline(
            DelayResolver {
                delays: vec![("slow", 1_000), ("fast", 10)],
            },
            SubmitPolicy::Reject,
            Some(100),
        );

        let slow = pipeline.submit("slow").await.unwrap();
        assert_eq!(slow.wait().await, Completion::Applied(SessionState::Failed));
        let snapshot = pipeline.snapshot().await;
        assert!(snapshot.error.unwrap().contains("too long"));

        let fast = pipeline.submit("fast").await.unwrap();
        assert!(fast.wait().await.is_applied());
        tokio::time::sleep(Duration::from_secs(2)).await;

        let snapshot = pipeline.snapshot().await;
        assert_eq!(snapshot.state, SessionState::Resolved);
        assert_eq!(snapshot.chart.unwrap().source_query, "fast");
    }

    #[tokio::test]
    async fn test_panicking_resolver_fails_session() {
        let pipeline = pipeline(PanickingResolver, SubmitPolicy::Reject, None);
        let completion = pipeline.submit_and_wait("anything").await.unwrap();
        assert_eq!(completion, Completion::Applied(SessionState::Failed));

        let snapshot = pipeline.snapshot().await;
        assert_eq!(snapshot.error.as_deref(), Some(GENERIC_RESOLUTION_FAILURE));
        assert!(snapshot.chart.is_none());
    }

    #[tokio::test]
    async fn test_input_intents() {
        let pipeline = pipeline(DelayResolver { delays: Vec::new() }, SubmitPolicy::Reject, None);

        pipeline.set_input("rev").await;
        assert_eq!(pipeline.suggestions_for_input().await.len(), 2);

        pipeline.select_suggestion("Show monthly website traffic trends").await;
        assert_eq!(pipeline.snapshot().await.input_text, "Show monthly website traffic trends");

        pipeline.submit_input().await.unwrap().wait().await;
        pipeline.clear_input().await;
        pipeline.select_history_item(0).await.unwrap();
        assert_eq!(pipeline.snapshot().await.input_text, "Show monthly website traffic trends");
        assert!(pipeline.select_history_item(3).await.is_err());

        pipeline.clear_result().await;
        assert_eq!(pipeline.snapshot().await.state, SessionState::Idle);
    }

    #[tokio::test]
    async fn test_blank_submit_never_reaches_session() {
        let pipeline = pipeline(DelayResolver { delays: Vec::new() }, SubmitPolicy::Reject, None);
        let updates = pipeline.subscribe();

        let err = pipeline.submit("   ").await.unwrap_err();
        assert!(err.is_input_rejected());
        assert!(!updates.has_changed().unwrap());
        assert_eq!(pipeline.snapshot().await.sequence, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_in_flight_frees_session() {
        let pipeline = pipeline(DelayResolver { delays: vec![("slow a", 1_000)] }, SubmitPolicy::Reject, None);
        let handle = pipeline.submit("slow a").await.unwrap();

        assert!(pipeline.cancel_in_flight().await);
        assert_eq!(handle.wait().await, Completion::Stale);

        tokio::time::sleep(Duration::from_secs(60)).await;
        let snapshot = pipeline.snapshot().await;
        assert!(!snapshot.processing);
        assert_eq!(snapshot.state, SessionState::Failed);
        assert_eq!(snapshot.error.as_deref(), Some(QUERY_CANCELLED));
        assert_eq!(*pipeline.subscribe().borrow(), snapshot);

        let completion = pipeline.submit_and_wait("b").await.unwrap();
        assert_eq!(completion, Completion::Applied(SessionState::Resolved));
        assert!(!pipeline.cancel_in_flight().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_reports_configured_limit() {
        let pipeline = pipeline(DelayResolver { delays: vec![("slow", 1_000)] }, SubmitPolicy::Reject, Some(250));
        let completion = pipeline.submit_and_wait("slow").await.unwrap();
        assert_eq!(completion, Completion::Applied(SessionState::Failed));
        assert_eq!(
            pipeline.snapshot().await.error,
            Some(InsightError::Timeout { after_ms: 250 }.user_message())
        );
    }
}

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use insight_application::{KeywordQueryResolver, QueryPipeline};
use insight_core::Result;
use insight_core::catalog::{DatasetCatalog, InMemoryCatalog, topics};
use insight_core::config::{PipelineConfig, SubmitPolicy};
use insight_core::query::{ChartResult, Completion, QueryResolver, SessionState};

fn pipeline_with(catalog: InMemoryCatalog, config: PipelineConfig) -> QueryPipeline {
    let catalog: Arc<dyn DatasetCatalog> = Arc::new(catalog);
    let resolver = KeywordQueryResolver::from_config(catalog, &config);
    QueryPipeline::new(Arc::new(resolver), &config)
}

#[tokio::test(start_paused = true)]
async fn test_sales_query_resolves_to_sales_dataset() {
    let pipeline = pipeline_with(InMemoryCatalog::seeded(), PipelineConfig::default());

    let completion = pipeline
        .submit_and_wait("Show sales performance by region")
        .await
        .expect("submit should be accepted");
    assert_eq!(completion, Completion::Applied(SessionState::Resolved));

    let snapshot = pipeline.snapshot().await;
    assert!(!snapshot.processing);
    assert!(snapshot.error.is_none());

    let chart = snapshot.chart.expect("chart should be present");
    assert_eq!(chart.series.title, "Sales Performance by Region (Q1-Q2 2023)");
    assert_eq!(
        chart.series.series_names().collect::<Vec<_>>(),
        vec!["North", "South", "East", "West"]
    );
    assert!(chart.series.series.iter().all(|s| s.values.len() == 6));
    assert_eq!(chart.source_query, "Show sales performance by region");
}

#[tokio::test(start_paused = true)]
async fn test_missing_dataset_fails_session() {
    let catalog = InMemoryCatalog::seeded().without(topics::CHURN);
    let pipeline = pipeline_with(catalog, PipelineConfig::default());

    let completion = pipeline.submit_and_wait("churn analysis").await.unwrap();
    assert_eq!(completion, Completion::Applied(SessionState::Failed));

    let snapshot = pipeline.snapshot().await;
    assert_eq!(snapshot.state, SessionState::Failed);
    assert!(!snapshot.error.as_deref().unwrap_or_default().is_empty());
    assert!(snapshot.chart.is_none());

    // Failed is interactive: the next submit goes through.
    let completion = pipeline.submit_and_wait("website traffic").await.unwrap();
    assert_eq!(completion, Completion::Applied(SessionState::Resolved));
}

#[tokio::test(start_paused = true)]
async fn test_stale_resolution_does_not_overwrite_newer() {
    let config = PipelineConfig {
        submit_policy: SubmitPolicy::Supersede,
        ..Default::default()
    };
    let pipeline = pipeline_with(InMemoryCatalog::seeded(), config);

    let a = pipeline.submit("Show monthly website traffic trends").await.unwrap();
    let b = pipeline.submit("Analyze customer churn rate by segment").await.unwrap();

    let (a_done, b_done) = tokio::join!(a.wait(), b.wait());
    assert_eq!(a_done, Completion::Stale);
    assert!(b_done.is_applied());

    let snapshot = pipeline.snapshot().await;
    let chart = snapshot.chart.unwrap();
    assert_eq!(chart.series.title, "Customer Churn Rate by Segment");
    assert_eq!(snapshot.history.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_history_through_pipeline() {
    let config = PipelineConfig {
        latency_ms: 0,
        ..Default::default()
    };
    let pipeline = pipeline_with(InMemoryCatalog::seeded(), config);

    pipeline.submit_and_wait("a").await.unwrap();
    pipeline.submit_and_wait("a").await.unwrap();
    assert_eq!(pipeline.snapshot().await.history, vec!["a"]);

    for i in 0..11 {
        pipeline.submit_and_wait(&format!("distinct {i}")).await.unwrap();
    }
    let history = pipeline.snapshot().await.history;
    assert_eq!(history.len(), 10);
    assert_eq!(history.first().map(String::as_str), Some("distinct 10"));
    assert_eq!(history.last().map(String::as_str), Some("distinct 1"));
}

/// Answers "fast ..." queries immediately and "slow ..." queries after 60 ms.
struct SplitLatencyResolver;

#[async_trait]
impl QueryResolver for SplitLatencyResolver {
    async fn resolve(&self, query: &str) -> Result<ChartResult> {
        if query.starts_with("slow") {
            tokio::time::sleep(Duration::from_millis(60)).await;
        }
        let dataset = InMemoryCatalog::seeded().lookup(topics::SALES).unwrap();
        Ok(ChartResult::new(dataset, query))
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_published_snapshot_tracks_session_on_resubmit() {
    let pipeline = QueryPipeline::new(Arc::new(SplitLatencyResolver), &PipelineConfig::default());
    let updates = pipeline.subscribe();

    for i in 0..60 {
        pipeline.submit(&format!("fast {i}")).await.unwrap();

        // Resubmit as soon as the fast query settles, racing its publish.
        let slow = loop {
            match pipeline.submit(&format!("slow {i}")).await {
                Ok(handle) => break handle,
                Err(e) if e.is_busy() => tokio::task::yield_now().await,
                Err(e) => panic!("unexpected submit error: {e}"),
            }
        };

        tokio::time::sleep(Duration::from_millis(5)).await;
        let session = pipeline.snapshot().await;
        let published = updates.borrow().clone();
        assert!(session.processing, "iteration {i}: slow query settled too early");
        assert_eq!(published, session, "iteration {i}: watch diverged from session");

        assert!(slow.wait().await.is_applied());
        assert_eq!(*updates.borrow(), pipeline.snapshot().await);
    }
}

//! Deterministic stand-in for a query backend.
//!
//! Classifies the query with the keyword rule table, looks the topic up in
//! the catalog and waits a configurable latency before settling, so callers
//! observe the same asynchronous shape a network-backed resolver would have.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use insight_core::catalog::DatasetCatalog;
use insight_core::config::{DEFAULT_LATENCY_MS, PipelineConfig};
use insight_core::error::{InsightError, Result};
use insight_core::intent::IntentClassifier;
use insight_core::query::{ChartResult, QueryResolver};
use rand::Rng;

pub struct KeywordQueryResolver {
    classifier: IntentClassifier,
    catalog: Arc<dyn DatasetCatalog>,
    latency: Duration,
    jitter: Duration,
}

impl KeywordQueryResolver {
    /// Creates a resolver with the default rule table and latency.
    pub fn new(catalog: Arc<dyn DatasetCatalog>) -> Self {
        Self {
            classifier: IntentClassifier::default(),
            catalog,
            latency: Duration::from_millis(DEFAULT_LATENCY_MS),
            jitter: Duration::ZERO,
        }
    }

    pub fn from_config(catalog: Arc<dyn DatasetCatalog>, config: &PipelineConfig) -> Self {
        Self::new(catalog).with_latency(config.latency(), config.jitter())
    }

    pub fn with_classifier(mut self, classifier: IntentClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Sets the base latency and the upper bound of random extra latency.
    pub fn with_latency(mut self, latency: Duration, jitter: Duration) -> Self {
        self.latency = latency;
        self.jitter = jitter;
        self
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    fn delay(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.latency;
        }
        self.latency + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }

    /// Resolves without waiting.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the classified topic has no dataset.
    pub fn resolve_now(&self, query: &str) -> Result<ChartResult> {
        let topic = self.classifier.classify(query);
        let dataset = self
            .catalog
            .lookup(topic)
            .ok_or_else(|| InsightError::not_found("dataset", topic))?;

        tracing::debug!(target: "insight::resolver", topic, query, "Query classified");
        Ok(ChartResult::new(dataset, query))
    }
}

#[async_trait]
impl QueryResolver for KeywordQueryResolver {
    async fn resolve(&self, query: &str) -> Result<ChartResult> {
        let delay = self.delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.resolve_now(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insight_core::catalog::{InMemoryCatalog, topics};
    use tokio::time::Instant;

    fn seeded() -> Arc<dyn DatasetCatalog> {
        Arc::new(InMemoryCatalog::seeded())
    }

    #[test]
    fn test_resolve_now_stamps_query() {
        let resolver = KeywordQueryResolver::new(seeded());
        let result = resolver.resolve_now("Show monthly website traffic trends").unwrap();
        assert_eq!(result.topic_key(), topics::TRAFFIC);
        assert_eq!(result.source_query, "Show monthly website traffic trends");
        assert_eq!(result.title(), "Monthly Website Traffic Trends");
    }

    #[test]
    fn test_catalog_miss_is_not_found() {
        let catalog = Arc::new(InMemoryCatalog::seeded().without(topics::CHURN));
        let resolver = KeywordQueryResolver::new(catalog);
        let err = resolver.resolve_now("churn analysis").unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_waits_for_latency() {
        let resolver = KeywordQueryResolver::new(seeded());
        let started = Instant::now();

        let result = resolver.resolve("top customers").await.unwrap();

        assert_eq!(result.topic_key(), topics::CUSTOMERS);
        assert!(started.elapsed() >= Duration::from_millis(DEFAULT_LATENCY_MS));
    }

    #[tokio::test(start_paused = true)]
    async fn test_jitter_bounds() {
        let resolver = KeywordQueryResolver::new(seeded())
            .with_latency(Duration::from_millis(100), Duration::from_millis(50));
        for _ in 0..20 {
            let delay = resolver.delay();
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(150));
        }
    }

    #[tokio::test]
    async fn test_zero_latency_from_config() {
        let config = PipelineConfig {
            latency_ms: 0,
            ..Default::default()
        };
        let resolver = KeywordQueryResolver::from_config(seeded(), &config);
        let result = resolver.resolve("asdkjasd").await.unwrap();
        assert_eq!(result.topic_key(), topics::SALES);
    }
}

//! Dataset catalog trait and the in-memory implementation.

use std::collections::HashMap;

use super::model::ChartDataset;
use crate::error::{InsightError, Result};

/// Read-only lookup of datasets by topic key.
///
/// Implementations are shared across every resolution, so they must be
/// cheap to query and free of side effects.
pub trait DatasetCatalog: Send + Sync {
    /// Returns the dataset registered under `topic_key`, if any.
    fn lookup(&self, topic_key: &str) -> Option<ChartDataset>;

    /// Returns every registered topic key, in registration order.
    fn topic_keys(&self) -> Vec<String>;

    fn contains(&self, topic_key: &str) -> bool {
        self.lookup(topic_key).is_some()
    }
}

/// Catalog held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    order: Vec<String>,
    datasets: HashMap<String, ChartDataset>,
}

impl InMemoryCatalog {
    /// Builds a catalog from already constructed datasets.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDataset` if a dataset breaks its invariants or a
    /// topic key appears twice.
    pub fn from_datasets(datasets: impl IntoIterator<Item = ChartDataset>) -> Result<Self> {
        let mut catalog = Self::default();
        for dataset in datasets {
            catalog.insert(dataset)?;
        }
        Ok(catalog)
    }

    fn insert(&mut self, dataset: ChartDataset) -> Result<()> {
        dataset.validate()?;
        if self.datasets.contains_key(&dataset.topic_key) {
            return Err(InsightError::invalid_dataset(
                &dataset.topic_key,
                "duplicate topic key",
            ));
        }
        self.insert_unchecked(dataset);
        Ok(())
    }

    pub(crate) fn insert_unchecked(&mut self, dataset: ChartDataset) {
        self.order.push(dataset.topic_key.clone());
        self.datasets.insert(dataset.topic_key.clone(), dataset);
    }

    /// Returns a copy of this catalog with `topic_key` removed.
    pub fn without(&self, topic_key: &str) -> Self {
        let mut copy = self.clone();
        copy.order.retain(|key| key != topic_key);
        copy.datasets.remove(topic_key);
        copy
    }

    /// Iterates datasets in registration order.
    pub fn datasets(&self) -> impl Iterator<Item = &ChartDataset> {
        self.order.iter().filter_map(|key| self.datasets.get(key))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl DatasetCatalog for InMemoryCatalog {
    fn lookup(&self, topic_key: &str) -> Option<ChartDataset> {
        self.datasets.get(topic_key).cloned()
    }

    fn topic_keys(&self) -> Vec<String> {
        self.order.clone()
    }
}

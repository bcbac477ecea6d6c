//! Catalog file DTOs.
//!
//! On-disk layout of `catalog.toml`:
//!
//! ```toml
//! schema_version = "1.0.0"
//!
//! [[dataset]]
//! topic = "sales"
//! title = "Sales Performance by Region (Q1-Q2 2023)"
//! kind = "bar"
//! labels = ["Jan", "Feb"]
//!
//! [[dataset.series]]
//! name = "North"
//! values = [4000, 4200]
//! color = "rgba(75, 192, 192, 0.6)"   # or an array, one color per label
//! ```

use serde::{Deserialize, Serialize};

use insight_core::catalog::{ChartDataset, ChartKind, ColorHint, InMemoryCatalog, SeriesDefinition};
use insight_core::error::{InsightError, Result};

pub const CATALOG_SCHEMA_VERSION: &str = "1.0.0";

fn default_schema_version() -> String {
    CATALOG_SCHEMA_VERSION.to_string()
}

// ============================================================================
// Catalog DTOs
// ============================================================================

/// Root of the catalog file, version 1.0.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFileV1 {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    #[serde(rename = "dataset", default)]
    pub datasets: Vec<DatasetV1>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetV1 {
    pub topic: String,
    pub title: String,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    #[serde(default)]
    pub series: Vec<SeriesV1>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesV1 {
    pub name: String,
    pub values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorHint>,
}

// ============================================================================
// Domain conversions
// ============================================================================

impl From<SeriesV1> for SeriesDefinition {
    fn from(dto: SeriesV1) -> Self {
        SeriesDefinition {
            name: dto.name,
            values: dto.values,
            color_hint: dto.color,
        }
    }
}

impl From<&SeriesDefinition> for SeriesV1 {
    fn from(series: &SeriesDefinition) -> Self {
        SeriesV1 {
            name: series.name.clone(),
            values: series.values.clone(),
            color: series.color_hint.clone(),
        }
    }
}

impl TryFrom<DatasetV1> for ChartDataset {
    type Error = InsightError;

    fn try_from(dto: DatasetV1) -> Result<Self> {
        ChartDataset::new(
            dto.topic,
            dto.title,
            dto.kind,
            dto.labels,
            dto.series.into_iter().map(Into::into).collect(),
        )
    }
}

impl From<&ChartDataset> for DatasetV1 {
    fn from(dataset: &ChartDataset) -> Self {
        DatasetV1 {
            topic: dataset.topic_key.clone(),
            title: dataset.title.clone(),
            kind: dataset.chart_kind,
            labels: dataset.labels.clone(),
            series: dataset.series.iter().map(Into::into).collect(),
        }
    }
}

impl TryFrom<CatalogFileV1> for InMemoryCatalog {
    type Error = InsightError;

    fn try_from(dto: CatalogFileV1) -> Result<Self> {
        if dto.schema_version != CATALOG_SCHEMA_VERSION {
            return Err(InsightError::config(format!(
                "unsupported catalog schema version '{}' (expected {})",
                dto.schema_version, CATALOG_SCHEMA_VERSION
            )));
        }
        let datasets = dto
            .datasets
            .into_iter()
            .map(ChartDataset::try_from)
            .collect::<Result<Vec<_>>>()?;
        InMemoryCatalog::from_datasets(datasets)
    }
}

impl From<&InMemoryCatalog> for CatalogFileV1 {
    fn from(catalog: &InMemoryCatalog) -> Self {
        CatalogFileV1 {
            schema_version: default_schema_version(),
            datasets: catalog.datasets().map(Into::into).collect(),
        }
    }
}

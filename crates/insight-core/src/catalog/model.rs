//! Catalog domain models.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::{InsightError, Result};

/// Chart kind a dataset prefers to be drawn as.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
}

/// Rendering hint for a series: one color for the whole series, or one color per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorHint {
    Solid(String),
    Palette(Vec<String>),
}

/// A named numeric series aligned to the dataset's category labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesDefinition {
    pub name: String,
    pub values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_hint: Option<ColorHint>,
}

impl SeriesDefinition {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
            color_hint: None,
        }
    }

    pub fn with_color(mut self, hint: ColorHint) -> Self {
        self.color_hint = Some(hint);
        self
    }
}

/// A catalog entry: labeled, multi-series numeric data plus a preferred chart kind.
///
/// Construct through [`ChartDataset::new`] so the invariants hold:
/// labels are non-empty and every series has exactly one value per label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub topic_key: String,
    pub title: String,
    pub chart_kind: ChartKind,
    pub labels: Vec<String>,
    pub series: Vec<SeriesDefinition>,
}

impl ChartDataset {
    /// Builds a dataset and validates it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDataset` when any invariant is violated.
    pub fn new(
        topic_key: impl Into<String>,
        title: impl Into<String>,
        chart_kind: ChartKind,
        labels: Vec<String>,
        series: Vec<SeriesDefinition>,
    ) -> Result<Self> {
        let dataset = Self {
            topic_key: topic_key.into(),
            title: title.into(),
            chart_kind,
            labels,
            series,
        };
        dataset.validate()?;
        Ok(dataset)
    }

    /// Checks the dataset invariants.
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: String| Err(InsightError::invalid_dataset(&self.topic_key, reason));

        if self.topic_key.trim().is_empty() {
            return fail("topic key is empty".to_string());
        }
        if self.labels.is_empty() {
            return fail("labels are empty".to_string());
        }
        if self.series.is_empty() {
            return fail("dataset has no series".to_string());
        }

        for series in &self.series {
            if series.values.len() != self.labels.len() {
                return fail(format!(
                    "series '{}' has {} values for {} labels",
                    series.name,
                    series.values.len(),
                    self.labels.len()
                ));
            }
            if series.values.iter().any(|v| !v.is_finite()) {
                return fail(format!("series '{}' contains a non-finite value", series.name));
            }
            if let Some(ColorHint::Palette(colors)) = &series.color_hint {
                if colors.len() != self.labels.len() {
                    return fail(format!(
                        "series '{}' palette has {} colors for {} labels",
                        series.name,
                        colors.len(),
                        self.labels.len()
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn series_names(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.name.as_str())
    }
}

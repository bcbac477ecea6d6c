//! Chart-agnostic series structure and the normalizer that builds it.

use serde::{Deserialize, Serialize};

use crate::catalog::{ChartDataset, ChartKind, ColorHint};

/// One named series in column form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedSeries {
    pub name: String,
    pub values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_hint: Option<ColorHint>,
}

/// A series' value inside a category group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesValue {
    pub series: String,
    pub value: f64,
}

/// Row form: one category label with the value of every series, in series order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub label: String,
    pub values: Vec<SeriesValue>,
}

impl CategoryGroup {
    /// Value contributed by `series` to this category.
    pub fn value(&self, series: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|entry| entry.series == series)
            .map(|entry| entry.value)
    }
}

/// Canonical structure handed to charting surfaces.
///
/// Holds the same numbers twice: column-per-series (`series`) for
/// libraries that want datasets, and row-per-category (`groups`) for
/// libraries that want records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub title: String,
    pub kind: ChartKind,
    pub categories: Vec<String>,
    pub series: Vec<NamedSeries>,
    pub groups: Vec<CategoryGroup>,
}

impl ChartSeries {
    pub fn series_names(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.name.as_str())
    }

    pub fn group(&self, label: &str) -> Option<&CategoryGroup> {
        self.groups.iter().find(|g| g.label == label)
    }
}

/// Remaps a dataset into a [`ChartSeries`].
///
/// Values pass through untouched. Label order and series order are preserved
/// in both the column and the row view.
pub fn normalize(dataset: &ChartDataset) -> ChartSeries {
    let groups = dataset
        .labels
        .iter()
        .enumerate()
        .map(|(index, label)| CategoryGroup {
            label: label.clone(),
            values: dataset
                .series
                .iter()
                .filter_map(|s| {
                    s.values.get(index).map(|value| SeriesValue {
                        series: s.name.clone(),
                        value: *value,
                    })
                })
                .collect(),
        })
        .collect();

    ChartSeries {
        title: dataset.title.clone(),
        kind: dataset.chart_kind,
        categories: dataset.labels.clone(),
        series: dataset
            .series
            .iter()
            .map(|s| NamedSeries {
                name: s.name.clone(),
                values: s.values.clone(),
                color_hint: s.color_hint.clone(),
            })
            .collect(),
        groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DatasetCatalog, InMemoryCatalog, SeriesDefinition, topics};

    #[test]
    fn test_single_series_groups() {
        let dataset = ChartDataset::new(
            "demo",
            "Demo",
            ChartKind::Bar,
            vec!["Jan".to_string(), "Feb".to_string()],
            vec![SeriesDefinition::new("North", vec![1.0, 2.0])],
        )
        .unwrap();

        let chart = normalize(&dataset);

        assert_eq!(
            chart.groups,
            vec![
                CategoryGroup {
                    label: "Jan".to_string(),
                    values: vec![SeriesValue {
                        series: "North".to_string(),
                        value: 1.0
                    }],
                },
                CategoryGroup {
                    label: "Feb".to_string(),
                    values: vec![SeriesValue {
                        series: "North".to_string(),
                        value: 2.0
                    }],
                },
            ]
        );
    }

    #[test]
    fn test_multi_series_order_preserved() {
        let sales = InMemoryCatalog::seeded().lookup(topics::SALES).unwrap();
        let chart = normalize(&sales);

        assert_eq!(chart.kind, ChartKind::Bar);
        assert_eq!(chart.categories, sales.labels);
        assert_eq!(chart.groups.len(), 6);
        for group in &chart.groups {
            let names: Vec<&str> = group.values.iter().map(|v| v.series.as_str()).collect();
            assert_eq!(names, vec!["North", "South", "East", "West"]);
        }
        let march = chart.group("Mar").unwrap();
        assert_eq!(march.value("East"), Some(5400.0));
        assert_eq!(march.value("Central"), None);
    }

    #[test]
    fn test_values_pass_through() {
        let churn = InMemoryCatalog::seeded().lookup(topics::CHURN).unwrap();
        let chart = normalize(&churn);
        assert_eq!(chart.series[0].values, churn.series[0].values);
        assert_eq!(chart.series[0].color_hint, churn.series[0].color_hint);
        assert_eq!(chart.group("Startup").unwrap().value("Churn Rate (%)"), Some(8.7));
    }
}

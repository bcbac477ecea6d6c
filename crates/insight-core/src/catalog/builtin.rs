//! Builtin datasets seeded at startup.
//!
//! These datasets are always available and are used whenever no catalog
//! file overrides them. They are built once and cached for the lifetime
//! of the process.

use std::sync::OnceLock;

use super::model::{ChartDataset, ChartKind, ColorHint, SeriesDefinition};
use super::repository::InMemoryCatalog;

/// Topic keys the builtin catalog always provides.
pub mod topics {
    pub const SALES: &str = "sales";
    pub const REVENUE: &str = "revenue";
    pub const CUSTOMERS: &str = "customers";
    pub const TRAFFIC: &str = "traffic";
    pub const CHURN: &str = "churn";
}

static BUILTIN_DATASETS: OnceLock<Vec<ChartDataset>> = OnceLock::new();

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn solid(color: &str) -> Option<ColorHint> {
    Some(ColorHint::Solid(color.to_string()))
}

fn palette(colors: &[&str]) -> Option<ColorHint> {
    Some(ColorHint::Palette(strings(colors)))
}

fn series(name: &str, values: &[f64], color_hint: Option<ColorHint>) -> SeriesDefinition {
    SeriesDefinition {
        name: name.to_string(),
        values: values.to_vec(),
        color_hint,
    }
}

/// Returns all builtin datasets in catalog order.
pub fn builtin_datasets() -> &'static [ChartDataset] {
    BUILTIN_DATASETS.get_or_init(|| {
        vec![
            ChartDataset {
                topic_key: topics::SALES.to_string(),
                title: "Sales Performance by Region (Q1-Q2 2023)".to_string(),
                chart_kind: ChartKind::Bar,
                labels: strings(&["Jan", "Feb", "Mar", "Apr", "May", "Jun"]),
                series: vec![
                    series(
                        "North",
                        &[4000.0, 4200.0, 4500.0, 4800.0, 5100.0, 5400.0],
                        solid("rgba(75, 192, 192, 0.6)"),
                    ),
                    series(
                        "South",
                        &[3000.0, 3100.0, 3300.0, 3400.0, 3600.0, 3800.0],
                        solid("rgba(153, 102, 255, 0.6)"),
                    ),
                    series(
                        "East",
                        &[5000.0, 5200.0, 5400.0, 5600.0, 5800.0, 6000.0],
                        solid("rgba(255, 159, 64, 0.6)"),
                    ),
                    series(
                        "West",
                        &[4500.0, 4700.0, 4900.0, 5100.0, 5300.0, 5500.0],
                        solid("rgba(54, 162, 235, 0.6)"),
                    ),
                ],
            },
            ChartDataset {
                topic_key: topics::REVENUE.to_string(),
                title: "Revenue by Product Category".to_string(),
                chart_kind: ChartKind::Pie,
                labels: strings(&[
                    "Electronics",
                    "Clothing",
                    "Home Goods",
                    "Toys",
                    "Sports",
                    "Beauty",
                ]),
                series: vec![series(
                    "Revenue by Category",
                    &[12000.0, 8000.0, 6000.0, 4000.0, 3000.0, 2000.0],
                    palette(&[
                        "rgba(255, 99, 132, 0.6)",
                        "rgba(54, 162, 235, 0.6)",
                        "rgba(255, 206, 86, 0.6)",
                        "rgba(75, 192, 192, 0.6)",
                        "rgba(153, 102, 255, 0.6)",
                        "rgba(255, 159, 64, 0.6)",
                    ]),
                )],
            },
            ChartDataset {
                topic_key: topics::CUSTOMERS.to_string(),
                title: "Top 5 Customers by Revenue".to_string(),
                chart_kind: ChartKind::Bar,
                labels: strings(&[
                    "ABC Corp",
                    "XYZ Ltd",
                    "Acme Inc",
                    "Tech Solutions",
                    "Global Services",
                ]),
                series: vec![series(
                    "Revenue ($)",
                    &[42000.0, 38000.0, 32000.0, 28000.0, 25000.0],
                    solid("rgba(54, 162, 235, 0.6)"),
                )],
            },
            ChartDataset {
                topic_key: topics::TRAFFIC.to_string(),
                title: "Monthly Website Traffic Trends".to_string(),
                chart_kind: ChartKind::Line,
                labels: strings(&[
                    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov",
                    "Dec",
                ]),
                series: vec![series(
                    "Monthly Website Visitors",
                    &[
                        15000.0, 16000.0, 18000.0, 21000.0, 24000.0, 26000.0, 28000.0, 27000.0,
                        25000.0, 23000.0, 22000.0, 24000.0,
                    ],
                    solid("rgba(75, 192, 192, 1)"),
                )],
            },
            ChartDataset {
                topic_key: topics::CHURN.to_string(),
                title: "Customer Churn Rate by Segment".to_string(),
                chart_kind: ChartKind::Bar,
                labels: strings(&["Enterprise", "SMB", "Startup", "Individual"]),
                series: vec![series(
                    "Churn Rate (%)",
                    &[2.3, 4.5, 8.7, 12.2],
                    palette(&[
                        "rgba(75, 192, 192, 0.6)",
                        "rgba(255, 206, 86, 0.6)",
                        "rgba(255, 159, 64, 0.6)",
                        "rgba(255, 99, 132, 0.6)",
                    ]),
                )],
            },
        ]
    })
}

impl InMemoryCatalog {
    /// Returns a catalog seeded with the builtin datasets.
    pub fn seeded() -> Self {
        let mut catalog = Self::default();
        for dataset in builtin_datasets() {
            catalog.insert_unchecked(dataset.clone());
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::repository::DatasetCatalog;

    #[test]
    fn test_builtin_datasets_are_valid() {
        for dataset in builtin_datasets() {
            dataset.validate().unwrap();
        }
        // Validating construction must agree with the seeded shortcut.
        let checked = InMemoryCatalog::from_datasets(builtin_datasets().to_vec()).unwrap();
        assert_eq!(checked.topic_keys(), InMemoryCatalog::seeded().topic_keys());
    }

    #[test]
    fn test_seeded_topics() {
        let catalog = InMemoryCatalog::seeded();
        for topic in [
            topics::SALES,
            topics::REVENUE,
            topics::CUSTOMERS,
            topics::TRAFFIC,
            topics::CHURN,
        ] {
            assert!(catalog.contains(topic), "missing builtin topic {topic}");
        }
    }

    #[test]
    fn test_sales_dataset_shape() {
        let sales = InMemoryCatalog::seeded().lookup(topics::SALES).unwrap();
        assert_eq!(sales.title, "Sales Performance by Region (Q1-Q2 2023)");
        assert_eq!(
            sales.series_names().collect::<Vec<_>>(),
            vec!["North", "South", "East", "West"]
        );
        assert!(sales.series.iter().all(|s| s.values.len() == 6));
    }
}

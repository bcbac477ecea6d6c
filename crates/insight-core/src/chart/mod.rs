//! Series normalization for charting surfaces.

mod series;

pub use series::{CategoryGroup, ChartSeries, NamedSeries, SeriesValue, normalize};

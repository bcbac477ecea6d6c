//! Dataset catalog domain module.
//!
//! # Module Structure
//!
//! - `model`: Dataset domain model (`ChartDataset`, `SeriesDefinition`, `ChartKind`, `ColorHint`)
//! - `repository`: Lookup trait (`DatasetCatalog`) and `InMemoryCatalog`
//! - `builtin`: Datasets seeded at startup

mod builtin;
mod model;
mod repository;

pub use builtin::{builtin_datasets, topics};
pub use model::{ChartDataset, ChartKind, ColorHint, SeriesDefinition};
pub use repository::{DatasetCatalog, InMemoryCatalog};

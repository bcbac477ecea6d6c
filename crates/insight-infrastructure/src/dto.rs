//! On-disk data transfer objects and their domain conversions.

mod catalog;

pub use catalog::{CATALOG_SCHEMA_VERSION, CatalogFileV1, DatasetV1, SeriesV1};

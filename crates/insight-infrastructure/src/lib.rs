pub mod config_service;
pub mod dto;
pub mod paths;
pub mod toml_catalog_repository;

pub use crate::config_service::ConfigService;
pub use crate::paths::InsightPaths;
pub use crate::toml_catalog_repository::TomlCatalogRepository;

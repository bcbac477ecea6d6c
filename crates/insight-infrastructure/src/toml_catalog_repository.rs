//! TOML-based dataset catalog repository.
//!
//! Reads `catalog.toml` into an [`InMemoryCatalog`]. A missing file is not an
//! error: the builtin datasets are used instead.

use std::fs;
use std::path::{Path, PathBuf};

use insight_core::catalog::InMemoryCatalog;
use insight_core::config::PipelineConfig;
use insight_core::error::Result;

use crate::dto::CatalogFileV1;
use crate::paths::InsightPaths;

/// Loads and saves dataset catalogs stored as TOML.
#[derive(Debug, Clone)]
pub struct TomlCatalogRepository {
    path: PathBuf,
}

impl TomlCatalogRepository {
    /// Creates a repository at the default location (`~/.config/insight/catalog.toml`).
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: InsightPaths::catalog_file()?,
        })
    }

    /// Creates a repository reading from a custom path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses `catalog_path` from the config when set, the default location otherwise.
    pub fn for_config(config: &PipelineConfig) -> Result<Self> {
        match &config.catalog_path {
            Some(path) => Ok(Self::with_path(path)),
            None => Self::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the catalog.
    ///
    /// # Errors
    ///
    /// - `Serialization` when the file is not valid TOML for the catalog layout
    /// - `Config` when the schema version is unsupported
    /// - `InvalidDataset` when any dataset breaks its invariants
    pub fn load(&self) -> Result<InMemoryCatalog> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "catalog file missing, using builtin datasets");
            return Ok(InMemoryCatalog::seeded());
        }

        let content = fs::read_to_string(&self.path)?;
        let dto: CatalogFileV1 = toml::from_str(&content)?;
        let catalog = InMemoryCatalog::try_from(dto)?;

        if catalog.is_empty() {
            tracing::warn!(path = %self.path.display(), "catalog file defines no datasets");
        }
        tracing::debug!(path = %self.path.display(), datasets = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Writes the catalog as pretty TOML, creating parent directories as needed.
    pub fn save(&self, catalog: &InMemoryCatalog) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&CatalogFileV1::from(catalog))?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    /// Writes the builtin datasets unless a catalog file already exists.
    ///
    /// Returns `true` when a file was written.
    pub fn export_builtin(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        self.save(&InMemoryCatalog::seeded())?;
        Ok(true)
    }
}

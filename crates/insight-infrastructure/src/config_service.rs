//! Configuration service implementation.
//!
//! Loads the pipeline configuration from `~/.config/insight/config.toml`
//! and caches it for the lifetime of the process.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use insight_core::config::PipelineConfig;
use insight_core::error::Result;

use crate::paths::InsightPaths;

/// Loads and caches the [`PipelineConfig`].
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration, filled on first successful load.
    config: Arc<RwLock<Option<PipelineConfig>>>,
}

impl ConfigService {
    /// Creates a service reading the default config file.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(InsightPaths::config_file()?))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    ///
    /// A missing or empty file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` for malformed TOML and `Config` when a value is out of range.
    pub fn get_config(&self) -> Result<PipelineConfig> {
        {
            let cached = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref config) = *cached {
                return Ok(config.clone());
            }
        }

        let loaded = self.load_config()?;

        let mut cached = self.config.write().unwrap_or_else(|e| e.into_inner());
        *cached = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut cached = self.config.write().unwrap_or_else(|e| e.into_inner());
        *cached = None;
    }

    /// Persists the configuration and refreshes the cache.
    pub fn save(&self, config: &PipelineConfig) -> Result<()> {
        config.validate()?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml::to_string_pretty(config)?)?;

        let mut cached = self.config.write().unwrap_or_else(|e| e.into_inner());
        *cached = Some(config.clone());
        Ok(())
    }

    fn load_config(&self) -> Result<PipelineConfig> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "config file missing, using defaults");
            return Ok(PipelineConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(PipelineConfig::default());
        }

        let config: PipelineConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

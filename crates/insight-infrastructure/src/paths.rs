//! Unified path management for insight configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/insight/           # Config directory (platform equivalent elsewhere)
//! ├── config.toml              # Pipeline configuration
//! └── catalog.toml             # Optional dataset catalog override
//! ```

use std::path::PathBuf;

use insight_core::error::{InsightError, Result};

const APP_DIR: &str = "insight";

pub struct InsightPaths;

impl InsightPaths {
    /// Returns the insight configuration directory.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error when the platform config directory cannot be determined.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| InsightError::config("Cannot find config directory"))
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn catalog_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("catalog.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_live_in_config_dir() {
        // Headless CI boxes may lack a config dir entirely.
        let Ok(dir) = InsightPaths::config_dir() else {
            return;
        };
        assert!(dir.ends_with(APP_DIR));
        assert_eq!(InsightPaths::config_file().unwrap(), dir.join("config.toml"));
        assert_eq!(InsightPaths::catalog_file().unwrap(), dir.join("catalog.toml"));
    }
}

//! Default filesystem locations following OS conventions.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

/// Application paths for the engine's persisted state.
///
/// Linux: config `~/.config/duoprint/`, data `~/.local/share/duoprint/`.
/// macOS and Windows follow the platform equivalents via `directories`.
#[derive(Clone, Debug)]
pub struct AppPaths {
    /// Configuration directory (engine config TOML).
    pub config: PathBuf,
    /// Data directory (template store root).
    pub data: PathBuf,
}

impl AppPaths {
    pub fn new() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "LotusEmberLabs", "duoprint")
            .context("Failed to determine project directories")?;

        Ok(Self {
            config: proj_dirs.config_dir().to_path_buf(),
            data: proj_dirs.data_dir().to_path_buf(),
        })
    }

    /// Create the config and data directories.
    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.config).context("Failed to create config directory")?;
        fs::create_dir_all(&self.data).context("Failed to create data directory")?;
        fs::create_dir_all(self.templates_dir())
            .context("Failed to create templates directory")?;

        log::debug!("Config: {}", self.config.display());
        log::debug!("Data:   {}", self.data.display());
        Ok(())
    }

    /// Engine config file location.
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.toml")
    }

    /// Template store root (directory-per-identity layout lives below it).
    pub fn templates_dir(&self) -> PathBuf {
        self.data.join("templates")
    }
}

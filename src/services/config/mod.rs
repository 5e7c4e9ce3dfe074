//! Application configuration, read from `config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::models::slot::GridConfig;

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DATABASE_FILE_NAME: &str = "moim.db";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Overrides the database location. Point several clients at the same
    /// file to share rooms between them.
    pub database_path: Option<PathBuf>,
    pub save_debounce_ms: u64,
    pub poll_interval_ms: u64,
    /// Member count at which a cell reaches full heat.
    pub heat_cap: usize,
    pub top_n: usize,
    /// TTF/OTF font installed at startup, for Hangul labels.
    pub font_path: Option<PathBuf>,
    pub grid: GridConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            save_debounce_ms: 300,
            poll_interval_ms: 1_000,
            heat_cap: 5,
            top_n: 3,
            font_path: None,
            grid: GridConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the configuration from the platform config directory.
    /// Any problem falls back to defaults so the app can still start.
    pub fn load() -> Self {
        match config_dir() {
            Some(dir) => Self::load_or_default(&dir.join(CONFIG_FILE_NAME)),
            None => {
                log::warn!("No config directory available, using default configuration");
                Self::default()
            }
        }
    }

    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::info!("No configuration at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load configuration: {:#}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.sanitize();
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let raw = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        fs::write(path, raw).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Database file to open: the configured override, or `moim.db` in
    /// the platform data directory.
    pub fn resolve_database_path(&self) -> PathBuf {
        if let Some(path) = &self.database_path {
            return path.clone();
        }

        match data_dir() {
            Some(dir) => dir.join(DATABASE_FILE_NAME),
            None => PathBuf::from(DATABASE_FILE_NAME),
        }
    }

    fn sanitize(&mut self) {
        if let Err(e) = self.grid.validate() {
            log::warn!("Invalid grid configuration ({}), using the default grid", e);
            self.grid = GridConfig::default();
        }
        if self.heat_cap == 0 {
            log::warn!("heat_cap must be at least 1, using default");
            self.heat_cap = AppConfig::default().heat_cap;
        }
        if self.poll_interval_ms == 0 {
            self.poll_interval_ms = AppConfig::default().poll_interval_ms;
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "Moim", "Moim")
}

pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

//! Application configuration management.
//!
//! Configuration covers the CMS origin, the response cache TTL, whether
//! content comes from the live CMS or from exported snapshots, the query
//! shape and the menu's narrow/wide viewport breakpoint.
//!
//! Configuration is stored at `~/.config/shotsite/config.json`. Missing
//! fields fall back to defaults; `SHOTSITE_CMS_URL` and `SHOTSITE_DATA_DIR`
//! override the file. Values are read once at startup.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::QueryShape;
use crate::cache::DEFAULT_TTL_SECS;
use crate::menu::DEFAULT_BREAKPOINT_PX;

/// Application name used for config directory paths
const APP_NAME: &str = "shotsite";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Production CMS origin
pub const DEFAULT_CMS_URL: &str = "https://hairpassion-production.up.railway.app";

pub const ENV_CMS_URL: &str = "SHOTSITE_CMS_URL";
pub const ENV_DATA_DIR: &str = "SHOTSITE_DATA_DIR";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataSource {
    #[default]
    Live,
    /// Serve exported snapshot files from `dir`
    Static { dir: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub cache_ttl_secs: i64,
    pub data_source: DataSource,
    pub query_shape: QueryShape,
    pub menu_breakpoint: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CMS_URL.to_string(),
            cache_ttl_secs: DEFAULT_TTL_SECS,
            data_source: DataSource::Live,
            query_shape: QueryShape::Current,
            menu_breakpoint: DEFAULT_BREAKPOINT_PX,
        }
    }
}

impl Config {
    /// Load from the default config path, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let config = match Self::config_path() {
            Ok(path) => Self::load_from(&path)?,
            Err(_) => Self::default(),
        };
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_CMS_URL).filter(|v| !v.is_empty()) {
            self.base_url = url;
        }
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
            self.data_source = DataSource::Static { dir: PathBuf::from(dir) };
        }
        self
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache_ttl_secs.max(0))
    }
}

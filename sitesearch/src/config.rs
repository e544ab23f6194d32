use crate::interface::SiteSearchError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Host-level settings for the search widget.
///
/// The debounce delay and history capacity are fixed constants and are not
/// configurable here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Site origin the endpoint path is resolved against
    pub base_url: String,
    pub search_path: String,
    pub lookup_timeout_ms: u64,
    /// Directory for persisted history; platform data dir when unset
    pub storage_dir: Option<PathBuf>,
    pub placeholder: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            search_path: "/api/search".to_string(),
            lookup_timeout_ms: 10_000,
            storage_dir: None,
            placeholder: "Search...".to_string(),
        }
    }
}

impl WidgetConfig {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|h| h.join(".config"))
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
            })
            .join("sitesearch")
            .join("config.toml")
    }

    /// Load from the default path, or return defaults if missing or unreadable
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
                Self::default()
            }
        }
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SiteSearchError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| SiteSearchError::Config(format!("Failed to read config: {}", e)))?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), SiteSearchError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SiteSearchError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| SiteSearchError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, content)
            .map_err(|e| SiteSearchError::Config(format!("Failed to write config: {}", e)))?;
        Ok(())
    }

    /// Absolute lookup endpoint (`base_url` joined with `search_path`)
    pub fn endpoint(&self) -> Result<Url, SiteSearchError> {
        let base = Url::parse(&self.base_url)?;
        Ok(base.join(&self.search_path)?)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    /// Where persisted history lives
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join("sitesearch")
        })
    }
}

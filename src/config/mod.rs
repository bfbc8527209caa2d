//! Configuration management.
//!
//! Configuration is read from `~/.config/article-reader/config.toml` at
//! startup. If the file doesn't exist, a default configuration with comments
//! is created.

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::DEFAULT_BASE_URL;
use crate::reader::{ImageThresholds, MIN_IMAGE_HEIGHT, MIN_IMAGE_WIDTH};

/// Environment variable that takes precedence over `api.token`.
pub const TOKEN_ENV: &str = "ARTICLE_API_TOKEN";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub reader: ReaderConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The token to send, preferring the environment over the file.
    pub fn resolved_token(&self) -> Option<String> {
        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.token.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub min_image_width: u32,
    pub min_image_height: u32,
    pub verify_image_sizes: bool,
    pub open_browser_on_fallback: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            min_image_width: MIN_IMAGE_WIDTH,
            min_image_height: MIN_IMAGE_HEIGHT,
            verify_image_sizes: true,
            open_browser_on_fallback: true,
        }
    }
}

impl ReaderConfig {
    pub fn thresholds(&self) -> ImageThresholds {
        ImageThresholds {
            min_width: self.min_image_width,
            min_height: self.min_image_height,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Defaults to the platform data directory when unset
    pub db_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            Self::create_default_config(config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::Io {
            path: config_path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/article-reader/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("article-reader").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    fn default_config_content() -> &'static str {
        r##"# article-reader configuration

[api]
# Parsing backend
base_url = "https://klinkerapps-article.herokuapp.com/"

# API token appended to every request. ARTICLE_API_TOKEN overrides it.
# token = "your-token"

# Request timeout in seconds
timeout_secs = 30

[reader]
# Inline images smaller than this (in pixels) are hidden
min_image_width = 200
min_image_height = 100

# Download inline images to check their size
verify_image_sizes = true

# Open the system browser when a page can't be shown as an article
open_browser_on_fallback = true

[store]
# Article cache location, defaults to the platform data directory
# db_path = "/path/to/articles.db"
"##
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

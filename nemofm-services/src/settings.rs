// SPDX-License-Identifier: LGPL-3.0-only
use anyhow::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use xdg::BaseDirectories;
use smol::fs;

use crate::filesystem::scan::DEFAULT_BATCH_SIZE;
use crate::thumbnail::cache::DEFAULT_JPEG_QUALITY;
use crate::thumbnail::DEFAULT_THUMBNAIL_SIZE;

const CONFIG_PREFIX: &str = "nemofm";
const CONFIG_FILE: &str = "config.toml";

/// The configuration as written in a config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General application settings
    #[serde(default)]
    pub general: GeneralSettings,
    /// Directory listing settings
    #[serde(default)]
    pub browser: BrowserConfig,
    /// Thumbnail cache settings
    #[serde(default)]
    pub thumbnails: ThumbnailConfig,
    /// Any other sections are captured here
    #[serde(flatten)]
    pub other: HashMap<String, toml::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneralSettings {
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrowserConfig {
    pub batch_size: Option<usize>,
    pub channel_capacity: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThumbnailConfig {
    pub cache_root: Option<PathBuf>,
    pub default_size: Option<u32>,
    pub jpeg_quality: Option<u8>,
    pub cache_exact_matches: Option<bool>,
}

/// Resolved directory listing settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserSettings {
    /// Maximum entries per scan batch.
    pub batch_size: usize,
    /// How many batches may wait between the scanner and the model.
    pub channel_capacity: usize,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            channel_capacity: 16,
        }
    }
}

/// Resolved thumbnail settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailSettings {
    /// Root of the on-disk cache. `None` means the platform cache directory.
    pub cache_root: Option<PathBuf>,
    /// Edge length used when a request carries no size.
    pub default_size: u32,
    /// JPEG quality for cached thumbnails (1-100).
    pub jpeg_quality: u8,
    /// Also cache sources that already have the requested size.
    pub cache_exact_matches: bool,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            cache_root: None,
            default_size: DEFAULT_THUMBNAIL_SIZE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            cache_exact_matches: false,
        }
    }
}

/// Registry for managing application settings.
#[derive(Debug, Default)]
pub struct SettingsRegistry {
    config: Config,
}

impl SettingsRegistry {
    /// Create a new SettingsRegistry and load configuration from standard locations.
    pub async fn new() -> Result<Self> {
        let mut registry = Self::default();
        registry.load().await?;
        Ok(registry)
    }

    /// Build a registry from a single TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(Self { config })
    }

    /// Load configuration from standard locations in precedence order.
    ///
    /// Order (later overrides earlier):
    /// 1. System Data: /usr/share/nemofm/config.toml (and XDG_DATA_DIRS)
    /// 2. System Config: /etc/xdg/nemofm/config.toml (and XDG_CONFIG_DIRS)
    /// 3. User Config: ~/.config/nemofm/config.toml (XDG_CONFIG_HOME)
    ///
    /// The config search yields the user file first, so reversing it puts
    /// the user file last.
    pub async fn load(&mut self) -> Result<()> {
        let xdg_dirs = BaseDirectories::with_prefix(CONFIG_PREFIX)?;

        for path in xdg_dirs.find_data_files(CONFIG_FILE).rev() {
            self.load_file(&path).await;
        }

        for path in xdg_dirs.find_config_files(CONFIG_FILE).rev() {
            self.load_file(&path).await;
        }

        Ok(())
    }

    async fn load_file(&mut self, path: &Path) {
        log::info!("Loading config from: {:?}", path);
        match fs::read_to_string(path).await {
            Ok(content) => match toml::from_str::<Config>(&content) {
                Ok(loaded_config) => {
                    self.merge(loaded_config);
                },
                Err(e) => {
                    log::error!("Failed to parse config file {:?}: {}", path, e);
                },
            },
            Err(e) => {
                log::warn!("Failed to read config file {:?}: {}", path, e);
            },
        }
    }

    /// Load configuration from explicit paths, in order.
    pub async fn load_from_paths(&mut self, paths: Vec<PathBuf>) -> Vec<Result<()>> {
        let mut results = Vec::new();

        for path in paths {
            let result = async {
                let content = fs::read_to_string(&path)
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to read config file {:?}: {}", path, e))?;

                let loaded_config: Config = toml::from_str(&content)
                    .map_err(|e| anyhow::anyhow!("Failed to parse config file {:?}: {}", path, e))?;

                self.merge(loaded_config);
                Ok(())
            }
            .await;

            results.push(result);
        }

        results
    }

    /// Merge a loaded config into the current config.
    fn merge(&mut self, other: Config) {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        take(&mut self.config.general.log_level, other.general.log_level);

        take(&mut self.config.browser.batch_size, other.browser.batch_size);
        take(&mut self.config.browser.channel_capacity, other.browser.channel_capacity);

        let thumbnails = &mut self.config.thumbnails;
        take(&mut thumbnails.cache_root, other.thumbnails.cache_root);
        take(&mut thumbnails.default_size, other.thumbnails.default_size);
        take(&mut thumbnails.jpeg_quality, other.thumbnails.jpeg_quality);
        take(&mut thumbnails.cache_exact_matches, other.thumbnails.cache_exact_matches);

        self.config.other.extend(other.other);
    }

    /// Get the raw merged configuration.
    pub fn get(&self) -> &Config {
        &self.config
    }

    /// Listing settings with defaults filled in.
    pub fn browser(&self) -> BrowserSettings {
        let defaults = BrowserSettings::default();
        let browser = &self.config.browser;
        BrowserSettings {
            batch_size: browser.batch_size.filter(|&n| n > 0).unwrap_or(defaults.batch_size),
            channel_capacity: browser
                .channel_capacity
                .filter(|&n| n > 0)
                .unwrap_or(defaults.channel_capacity),
        }
    }

    /// Thumbnail settings with defaults filled in.
    pub fn thumbnails(&self) -> ThumbnailSettings {
        let defaults = ThumbnailSettings::default();
        let thumbnails = &self.config.thumbnails;
        ThumbnailSettings {
            cache_root: thumbnails.cache_root.clone(),
            default_size: thumbnails
                .default_size
                .filter(|&n| n > 0)
                .unwrap_or(defaults.default_size),
            jpeg_quality: thumbnails
                .jpeg_quality
                .map(|q| q.clamp(1, 100))
                .unwrap_or(defaults.jpeg_quality),
            cache_exact_matches: thumbnails
                .cache_exact_matches
                .unwrap_or(defaults.cache_exact_matches),
        }
    }

    /// Configured log filter, if any.
    pub fn log_level(&self) -> Option<&str> {
        self.config.general.log_level.as_deref()
    }
}

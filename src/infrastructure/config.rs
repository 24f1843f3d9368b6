//! Configuration infrastructure
//!
//! Loads and manages the application's JSON config file. Every field has
//! a serde default, so a minimal file containing only `ebay_url` (the
//! original deployment format) still parses.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tracing::info;

use super::parsing::{ListingSelectors, PriceBand};

/// Default values for configuration settings.
pub mod defaults {
    /// Page budget for CLI batch runs.
    pub const MAX_PAGES: u32 = 5;

    /// Page budget for the HTTP path, kept low for faster responses.
    pub const SERVER_MAX_PAGES: u32 = 2;

    /// Politeness delay between successive page requests.
    pub const REQUEST_DELAY_MS: u64 = 2000;

    pub const REQUEST_TIMEOUT_SECONDS: u64 = 10;

    /// Desktop-browser user agent presented to the marketplace.
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
        AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

    /// Plausible price band for the product category.
    pub const PRICE_BAND_MIN: f64 = 10.0;
    pub const PRICE_BAND_MAX: f64 = 5000.0;

    /// Tukey fence multiplier for outlier removal.
    pub const FENCE_MULTIPLIER: f64 = 1.5;

    /// Below this sample size, quartiles are unreliable and outlier
    /// removal is skipped.
    pub const MIN_SAMPLE_FOR_FENCES: usize = 3;

    pub const LOG_LEVEL: &str = "info";

    pub const SERVER_HOST: &str = "0.0.0.0";
    pub const SERVER_PORT: u16 = 5000;

    pub const CONFIG_FILE: &str = "config.json";
    pub const RESULT_FILE: &str = "average_price.json";
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Target search URL for CLI batch runs.
    pub ebay_url: String,

    /// Maximum pages to scrape in a CLI batch run.
    pub max_pages: u32,

    /// Maximum pages to scrape per HTTP request.
    pub server_max_pages: u32,

    /// Politeness delay between page requests in milliseconds.
    pub request_delay_ms: u64,

    /// HTTP request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// User agent string presented to the marketplace.
    pub user_agent: String,

    /// Plausible price range for the product category.
    pub price_band: PriceBand,

    /// Outlier-removal policy for the statistics engine.
    pub outlier: OutlierConfig,

    /// CSS selector fallback chains for listing extraction.
    pub selectors: ListingSelectors,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// HTTP server binding.
    pub server: ServerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ebay_url: String::new(),
            max_pages: defaults::MAX_PAGES,
            server_max_pages: defaults::SERVER_MAX_PAGES,
            request_delay_ms: defaults::REQUEST_DELAY_MS,
            request_timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            user_agent: defaults::USER_AGENT.to_string(),
            price_band: PriceBand::default(),
            outlier: OutlierConfig::default(),
            selectors: ListingSelectors::default(),
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// Outlier-removal settings for the statistics engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierConfig {
    pub fence_multiplier: f64,
    pub min_sample_for_fences: usize,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            fence_multiplier: defaults::FENCE_MULTIPLIER,
            min_sample_for_fences: defaults::MIN_SAMPLE_FOR_FENCES,
        }
    }
}

/// Logging configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable file output into logs/scraper.log
    pub file_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            file_output: true,
        }
    }
}

/// HTTP server binding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::SERVER_HOST.to_string(),
            port: defaults::SERVER_PORT,
        }
    }
}

/// Why the config file could not be loaded.
///
/// The CLI reports these two cases with distinct guidance text.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("config file is malformed: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("failed to read config file: {0}")]
    Io(#[source] std::io::Error),
}

/// Configuration manager for loading and saving settings.
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Load configuration, reporting missing and malformed files
    /// distinctly so callers can give targeted guidance.
    pub async fn load(&self) -> Result<AppConfig, ConfigError> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(ConfigError::Io)?;

        let config = serde_json::from_str(&content).map_err(ConfigError::Malformed)?;
        info!("Loaded configuration from: {:?}", self.config_path);
        Ok(config)
    }

    /// Load configuration, creating the file with defaults when absent.
    pub async fn load_or_default(&self) -> Result<AppConfig> {
        match self.load().await {
            Ok(config) => Ok(config),
            Err(ConfigError::NotFound(_)) => {
                info!(
                    "Configuration file not found, creating default: {:?}",
                    self.config_path
                );
                let config = AppConfig::default();
                self.save(&config).await?;
                Ok(config)
            }
            Err(e) => Err(e).context("Failed to load configuration"),
        }
    }

    /// Save configuration to file as pretty-printed JSON.
    pub async fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create config directory")?;
            }
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new(Path::new(defaults::CONFIG_FILE))
    }
}

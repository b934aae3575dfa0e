//! # Scanner Configuration
//!
//! Runtime settings for the scanner host.
//!
//! ## Configuration Sources (in priority order)
//! 1. Environment variables (`SHELF_*`)
//! 2. Config file (`scanner.toml` in the platform config directory)
//! 3. Defaults
//!
//! ## Example Config File
//! ```toml
//! [catalog]
//! database_path = "/var/lib/shelf/catalog.db"
//!
//! [decoder]
//! channel_capacity = 32
//!
//! [logging]
//! filter = "info,shelf=debug,sqlx=warn"
//! ```
//!
//! Scan timing (debounce window, lookup timeout, found delay) lives in
//! `shelf-core` as constants.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};

// =============================================================================
// Catalog Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// SQLite file holding the product catalog.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "shelf", "scanner")
        .map(|dirs| dirs.data_dir().join("catalog.db"))
        .unwrap_or_else(|| PathBuf::from("./shelf_dev.db"))
}

impl Default for CatalogSettings {
    fn default() -> Self {
        CatalogSettings {
            database_path: default_database_path(),
        }
    }
}

// =============================================================================
// Decoder Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderSettings {
    /// Buffer between the decode loop and the controller. A full buffer
    /// slows the decode loop down rather than dropping detections.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_channel_capacity() -> usize {
    32
}

impl Default for DecoderSettings {
    fn default() -> Self {
        DecoderSettings {
            channel_capacity: default_channel_capacity(),
        }
    }
}

// =============================================================================
// Logging Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` wins over it.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info,shelf=debug,sqlx=warn".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// Root Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShelfConfig {
    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub decoder: DecoderSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl ShelfConfig {
    /// Loads from `config_path` (or the default path), applies environment
    /// overrides, then validates. A missing file means defaults.
    pub fn load(config_path: Option<PathBuf>) -> EngineResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading scanner config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn save(&self, config_path: Option<PathBuf>) -> EngineResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| EngineError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Scanner config saved");
        Ok(())
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.catalog.database_path.as_os_str().is_empty() {
            return Err(EngineError::InvalidConfig(
                "catalog.database_path must not be empty".into(),
            ));
        }

        if self.decoder.channel_capacity == 0 {
            return Err(EngineError::InvalidConfig(
                "decoder.channel_capacity must be greater than 0".into(),
            ));
        }

        if self.logging.filter.trim().is_empty() {
            return Err(EngineError::InvalidConfig(
                "logging.filter must not be empty".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("SHELF_DB_PATH") {
            debug!(path = %path, "Overriding catalog path from environment");
            self.catalog.database_path = PathBuf::from(path);
        }

        if let Ok(filter) = std::env::var("SHELF_LOG") {
            self.logging.filter = filter;
        }

        if let Ok(capacity) = std::env::var("SHELF_DECODER_CHANNEL_CAPACITY") {
            match capacity.parse::<usize>() {
                Ok(c) => self.decoder.channel_capacity = c,
                Err(_) => warn!(value = %capacity, "Ignoring invalid SHELF_DECODER_CHANNEL_CAPACITY"),
            }
        }
    }

    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "shelf", "scanner")
            .map(|dirs| dirs.config_dir().join("scanner.toml"))
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::filters::FilterLimits;
use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, FILTER_MAX_ITEMS, FILTER_MAX_JSON_BYTES,
    SQLITE_BUSY_TIMEOUT_SECS, SQLITE_MAX_CONNECTIONS,
};

// =============================================================================
// File Config (JSON)
// =============================================================================

/// Database configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatabaseFileConfig {
    pub max_connections: Option<u32>,
    pub busy_timeout_secs: Option<u64>,
}

/// Filter request limits section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FiltersFileConfig {
    pub max_json_bytes: Option<usize>,
    pub max_items: Option<usize>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub data_dir: Option<String>,
    pub database: Option<DatabaseFileConfig>,
    pub filters: Option<FiltersFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if other.data_dir.is_some() {
            tracing::trace!(data_dir = ?other.data_dir, "Merging data_dir");
            self.data_dir = other.data_dir;
        }

        // Database
        if let Some(database) = other.database {
            let current = self.database.get_or_insert_with(DatabaseFileConfig::default);
            if database.max_connections.is_some() {
                tracing::trace!(max_connections = ?database.max_connections, "Merging database.max_connections");
                current.max_connections = database.max_connections;
            }
            if database.busy_timeout_secs.is_some() {
                tracing::trace!(busy_timeout_secs = ?database.busy_timeout_secs, "Merging database.busy_timeout_secs");
                current.busy_timeout_secs = database.busy_timeout_secs;
            }
        }

        // Filters
        if let Some(filters) = other.filters {
            let current = self.filters.get_or_insert_with(FiltersFileConfig::default);
            if filters.max_json_bytes.is_some() {
                tracing::trace!(max_json_bytes = ?filters.max_json_bytes, "Merging filters.max_json_bytes");
                current.max_json_bytes = filters.max_json_bytes;
            }
            if filters.max_items.is_some() {
                tracing::trace!(max_items = ?filters.max_items, "Merging filters.max_items");
                current.max_items = filters.max_items;
            }
        }
    }
}

// =============================================================================
// Runtime Config
// =============================================================================

/// Database configuration (final/runtime)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub busy_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: SQLITE_MAX_CONNECTIONS,
            busy_timeout_secs: SQLITE_BUSY_TIMEOUT_SECS,
        }
    }
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Explicit data directory; `None` means the platform default
    pub data_dir: Option<PathBuf>,
    pub database: DatabaseConfig,
    pub filters: FilterLimits,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.classroll/classroll.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        // 1. Load from profile dir - skip if not exists
        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        // 2. Load from CLI-specified path OR local directory
        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        // 3. Layer configs: defaults -> file config -> CLI/env overrides
        let file_database = file_config.database.unwrap_or_default();
        let file_filters = file_config.filters.unwrap_or_default();

        let data_dir = cli
            .data_dir
            .clone()
            .or_else(|| file_config.data_dir.as_deref().map(expand_path));

        let database = DatabaseConfig {
            max_connections: cli
                .db_max_connections
                .or(file_database.max_connections)
                .unwrap_or(SQLITE_MAX_CONNECTIONS),
            busy_timeout_secs: file_database
                .busy_timeout_secs
                .unwrap_or(SQLITE_BUSY_TIMEOUT_SECS),
        };

        let filters = FilterLimits {
            max_json_bytes: cli
                .filter_max_json_bytes
                .or(file_filters.max_json_bytes)
                .unwrap_or(FILTER_MAX_JSON_BYTES),
            max_items: cli
                .filter_max_items
                .or(file_filters.max_items)
                .unwrap_or(FILTER_MAX_ITEMS),
        };

        let config = Self {
            data_dir,
            database,
            filters,
        };
        config.validate()?;

        tracing::debug!(
            data_dir = ?config.data_dir,
            max_connections = config.database.max_connections,
            max_filter_items = config.filters.max_items,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.database.max_connections == 0 {
            anyhow::bail!("Configuration error: database.max_connections must be greater than 0");
        }
        if self.filters.max_json_bytes == 0 {
            anyhow::bail!("Configuration error: filters.max_json_bytes must be greater than 0");
        }
        if self.filters.max_items == 0 {
            anyhow::bail!("Configuration error: filters.max_items must be greater than 0");
        }
        Ok(())
    }
}

/// Get the profile config path (~/.classroll/classroll.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

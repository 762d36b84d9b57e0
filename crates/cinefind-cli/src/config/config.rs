//! `AppConfig` struct and TOML loading.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use cinefind_api::trending::DEFAULT_TRENDING_LIMIT;
use serde::{Deserialize, Serialize};

/// Default TMDB response language.
const DEFAULT_LANGUAGE: &str = "en-US";

/// Default debounce interval for the search box in milliseconds.
const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Top-level application configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// TMDB client settings.
    #[serde(default)]
    pub tmdb: TmdbConfig,
    /// Trending store settings.
    #[serde(default)]
    pub trending: TrendingConfig,
    /// Interactive browser settings.
    #[serde(default)]
    pub browser: BrowserConfig,
}

/// TMDB client configuration. The API token comes from `TMDB_API_TOKEN`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TmdbConfig {
    /// Response language (e.g. `en-US`, `ja-JP`).
    #[serde(default = "default_language")]
    pub language: String,
    /// Overrides the API base URL.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            base_url: None,
        }
    }
}

/// Which trending store backend to use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrendingBackendKind {
    /// Local `SQLite` database under the data directory.
    #[default]
    Sqlite,
    /// Hosted Appwrite collection.
    Appwrite,
}

/// Trending store configuration. The Appwrite key comes from `APPWRITE_API_KEY`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrendingConfig {
    /// Store backend.
    #[serde(default)]
    pub backend: TrendingBackendKind,
    /// Number of entries shown in the trending strip.
    #[serde(default = "default_trending_limit")]
    pub limit: u32,
    /// Appwrite API endpoint (e.g. `https://cloud.appwrite.io/v1`).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Appwrite project ID.
    #[serde(default)]
    pub project_id: Option<String>,
    /// Appwrite database ID.
    #[serde(default)]
    pub database_id: Option<String>,
    /// Appwrite collection ID.
    #[serde(default)]
    pub collection_id: Option<String>,
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            backend: TrendingBackendKind::default(),
            limit: default_trending_limit(),
            endpoint: None,
            project_id: None,
            database_id: None,
            collection_id: None,
        }
    }
}

/// Interactive browser configuration.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BrowserConfig {
    /// Search box debounce interval in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl BrowserConfig {
    /// Debounce interval as a `Duration`.
    #[must_use]
    pub const fn debounce_interval(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_language() -> String {
    String::from(DEFAULT_LANGUAGE)
}

const fn default_trending_limit() -> u32 {
    DEFAULT_TRENDING_LIMIT
}

const fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_default_config() {
        // Arrange & Act
        let config = AppConfig::default();

        // Assert
        assert_eq!(config.tmdb.language, "en-US");
        assert_eq!(config.trending.backend, TrendingBackendKind::Sqlite);
        assert_eq!(config.trending.limit, 5);
        assert_eq!(
            config.browser.debounce_interval(),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_empty_file_returns_default() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_appwrite_config() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[tmdb]
language = "ja-JP"

[trending]
backend = "appwrite"
limit = 8
endpoint = "https://cloud.appwrite.io/v1"
project_id = "proj"
database_id = "db"
collection_id = "metrics"

[browser]
debounce_ms = 300
"#,
        )
        .unwrap();

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config.tmdb.language, "ja-JP");
        assert!(config.tmdb.base_url.is_none());
        assert_eq!(config.trending.backend, TrendingBackendKind::Appwrite);
        assert_eq!(config.trending.limit, 8);
        assert_eq!(config.trending.project_id.as_deref(), Some("proj"));
        assert_eq!(config.trending.collection_id.as_deref(), Some("metrics"));
        assert_eq!(config.browser.debounce_ms, 300);
    }

    #[test]
    fn test_load_partial_section_fills_defaults() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[trending]\nlimit = 3\n").unwrap();

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config.trending.backend, TrendingBackendKind::Sqlite);
        assert_eq!(config.trending.limit, 3);
        assert_eq!(config.tmdb.language, "en-US");
    }

    #[test]
    fn test_load_unknown_backend_fails() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[trending]\nbackend = \"redis\"\n").unwrap();

        // Act
        let result = AppConfig::load(&path);

        // Assert
        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse"));
    }
}

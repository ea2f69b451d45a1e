use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::{Client, ClientBuilder, DEFAULT_BASE_URL};

/// On-disk client configuration, for callers that prefer a config file
/// over wiring credentials through code.
///
/// Everything is optional; missing fields keep their defaults. The
/// `CONSUMPTION_API_KEY` and `CONSUMPTION_BASE_URL` environment variables
/// override the file when set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// API key for the prediction service.
    pub apikey: Option<String>,

    /// Base URL for all requests. Should not have a trailing slash.
    pub base_url: String,

    /// Request timeout in seconds. Timeouts are surfaced immediately; no
    /// retry is attempted.
    pub timeout_secs: Option<u64>,

    /// Proxy URL for all requests.
    pub proxy: Option<String>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            apikey: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
            proxy: None,
        }
    }
}

impl FileConfig {
    /// Load config from the default location, then apply environment
    /// overrides. A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load config from an explicit path, without environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save config to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save config to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Default config file path.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("consumption-client").join("config.toml"))
    }

    /// Let `CONSUMPTION_API_KEY` / `CONSUMPTION_BASE_URL` win over the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("CONSUMPTION_API_KEY") {
            if !key.is_empty() {
                self.apikey = Some(key);
            }
        }
        if let Ok(url) = std::env::var("CONSUMPTION_BASE_URL") {
            if !url.is_empty() {
                self.base_url = url;
            }
        }
    }

    /// Turn this configuration into a [`ClientBuilder`].
    ///
    /// A missing API key is not an error here; it becomes
    /// [`crate::ApiError::Config`] at `build()` time.
    pub fn into_builder(self) -> ClientBuilder {
        let mut builder = Client::builder(self.apikey.unwrap_or_default()).base_url(self.base_url);
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(proxy) = self.proxy {
            builder = builder.proxy(proxy);
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.apikey.is_none());
        assert!(config.timeout_secs.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let mut config = FileConfig::default();
        config.apikey = Some("test-key".to_string());
        config.timeout_secs = Some(10);
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: FileConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.apikey.as_deref(), Some("test-key"));
        assert_eq!(parsed.timeout_secs, Some(10));
        assert_eq!(parsed.base_url, config.base_url);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: FileConfig = toml::from_str("apikey = \"abc\"").unwrap();
        assert_eq!(parsed.apikey.as_deref(), Some("abc"));
        assert_eq!(parsed.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = FileConfig::default();
        config.apikey = Some("round-trip".to_string());
        config.proxy = Some("http://proxy.internal:8080".to_string());
        config.save_to(&path).unwrap();

        let loaded = FileConfig::load_from(&path).unwrap();
        assert_eq!(loaded.apikey.as_deref(), Some("round-trip"));
        assert_eq!(loaded.proxy.as_deref(), Some("http://proxy.internal:8080"));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = FileConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert!(loaded.apikey.is_none());
        assert_eq!(loaded.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = FileConfig {
            apikey: Some("from-file".to_string()),
            ..FileConfig::default()
        };
        std::env::set_var("CONSUMPTION_API_KEY", "from-env");
        config.apply_env_overrides();
        std::env::remove_var("CONSUMPTION_API_KEY");
        assert_eq!(config.apikey.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_builder_from_config_without_key_fails_at_build() {
        let err = FileConfig::default().into_builder().build().unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }
}

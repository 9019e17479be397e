//! Configuration management for Highlight Studio.
//!
//! Every setting has a compiled-in default; a TOML file may override any
//! section. A missing file is not an error.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Status polling settings
    #[serde(default)]
    pub polling: PollingConfig,

    /// Upload validation settings
    #[serde(default)]
    pub upload: UploadConfig,

    /// Highlight player defaults
    #[serde(default)]
    pub player: PlayerConfig,

    /// Social platforms known to the content plan view
    #[serde(default = "default_platforms")]
    pub platforms: Vec<PlatformConfig>,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the highlight backend (no trailing `/api`)
    pub base_url: String,

    /// Timeout for ordinary requests in seconds
    pub timeout_seconds: u64,

    /// Timeout for upload requests in seconds
    pub upload_timeout_seconds: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

/// Processing status polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Interval between status requests in milliseconds
    pub interval_ms: u64,

    /// Consecutive failed status requests tolerated before giving up
    pub max_consecutive_failures: u32,
}

/// Upload validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum accepted file size in bytes
    pub max_file_size_bytes: u64,

    /// Accepted MIME types
    pub allowed_types: Vec<String>,

    /// Accepted file extensions, including the leading dot
    pub allowed_extensions: Vec<String>,
}

/// Highlight player defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub controls: bool,
    pub autoplay: bool,
    pub preload: String,
}

/// Display metadata for a social platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    #[serde(default)]
    pub enabled: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log directory path
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output (stderr)
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_seconds: 30,
            upload_timeout_seconds: 3600,
            user_agent: concat!("highlight-studio/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            max_consecutive_failures: 3,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 1000 * 1024 * 1024,
            allowed_types: vec![
                "video/mp4".to_string(),
                "video/quicktime".to_string(),
                "video/x-msvideo".to_string(),
            ],
            allowed_extensions: vec![".mp4".to_string(), ".mov".to_string(), ".avi".to_string()],
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            controls: true,
            autoplay: false,
            preload: "auto".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            default_level: "warn".to_string(),
            console: true,
            file: true,
            json_format: false,
        }
    }
}

fn platform(id: &str, name: &str, color: &str, enabled: bool) -> PlatformConfig {
    PlatformConfig {
        id: id.to_string(),
        name: name.to_string(),
        icon: id.to_string(),
        color: color.to_string(),
        enabled,
    }
}

fn default_platforms() -> Vec<PlatformConfig> {
    vec![
        platform("instagram", "Instagram", "#E1306C", true),
        platform("youtube", "YouTube", "#FF0000", true),
        platform("tiktok", "TikTok", "#000000", false),
        platform("twitter", "Twitter", "#1DA1F2", false),
        platform("facebook", "Facebook", "#4267B2", false),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            polling: PollingConfig::default(),
            upload: UploadConfig::default(),
            player: PlayerConfig::default(),
            platforms: default_platforms(),
            logging: LoggingConfig::default(),
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl UploadConfig {
    /// Maximum file size in whole mebibytes, as shown to users
    pub fn max_file_size_mb(&self) -> u64 {
        self.max_file_size_bytes / (1024 * 1024)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        tracing::debug!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }

    /// Reject settings the client cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.polling.interval_ms == 0 {
            bail!("polling.interval_ms must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.polling.interval(), Duration::from_secs(5));
        assert_eq!(config.upload.max_file_size_mb(), 1000);
        assert_eq!(config.platforms.len(), 5);
        assert!(config.platforms[0].enabled);
        assert!(!config.platforms[2].enabled);
        assert_eq!(config.player.preload, "auto");
    }

    #[test]
    fn test_save_and_load_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        let mut original_config = Config::default();
        original_config.api.base_url = "http://media-box:9000".to_string();
        original_config.save(&config_path)?;

        assert!(config_path.exists());

        let loaded_config = Config::from_file(&config_path)?;
        assert_eq!(loaded_config.api.base_url, "http://media-box:9000");
        assert_eq!(loaded_config.platforms, original_config.platforms);
        assert_eq!(
            loaded_config.upload.allowed_types,
            original_config.upload.allowed_types
        );

        Ok(())
    }

    #[test]
    fn test_partial_config_falls_back_to_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "[polling]\ninterval_ms = 250\nmax_consecutive_failures = 1\n",
        )?;

        let config = Config::from_file(&config_path)?;
        assert_eq!(config.polling.interval_ms, 250);
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.platforms.len(), 5);

        Ok(())
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.api.timeout_seconds, 30);
    }

    #[test]
    fn test_zero_poll_interval_is_rejected() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[polling]\ninterval_ms = 0\n")?;

        let err = Config::from_file(&config_path).unwrap_err();
        assert!(format!("{err:#}").contains("polling.interval_ms must be greater than zero"));
        Ok(())
    }

    #[test]
    fn test_invalid_config_is_an_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[api\nbase_url = ")?;

        assert!(Config::from_file(&config_path).is_err());
        Ok(())
    }
}

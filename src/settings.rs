use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::api::{ClientConfig, RetryPolicy};
use crate::cli::Cli;
use crate::theme::ThemeVariant;

const APP_SENTINEL: &str = "insta-feed";
const REDACTED: &str = "<redacted>";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_FEED_PATH: &str = "/api/v1/posts/";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_feed_path() -> String {
    DEFAULT_FEED_PATH.to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "_app")]
    pub app: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_feed_path")]
    pub feed_path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<ThemeVariant>,

    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: APP_SENTINEL.to_string(),
            base_url: default_base_url(),
            feed_path: default_feed_path(),
            cookie: None,
            timeout_secs: default_timeout_secs(),
            theme: None,
            retry: RetryPolicy::default(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize settings")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.app != APP_SENTINEL {
            bail!(
                "Settings file appears to belong to another application (expected _app = '{}', found '{}')",
                APP_SENTINEL,
                self.app
            );
        }
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be at least 1");
        }
        Ok(())
    }

    /// Command-line flags take precedence over the file.
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(base_url) = &cli.base_url {
            self.base_url.clone_from(base_url);
        }
        if let Some(feed) = &cli.feed {
            self.feed_path.clone_from(feed);
        }
        if cli.cookie.is_some() {
            self.cookie.clone_from(&cli.cookie);
        }
        if cli.dark {
            self.theme = Some(ThemeVariant::Dark);
        } else if cli.light {
            self.theme = Some(ThemeVariant::Light);
        }
        self
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            cookie: self.cookie.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            retry: self.retry,
        }
    }

    /// Copy safe to print: the cookie value is masked.
    pub fn redacted(&self) -> Self {
        Self {
            cookie: self.cookie.as_ref().map(|_| REDACTED.to_string()),
            ..self.clone()
        }
    }
}

pub fn config_dir(custom: Option<&PathBuf>) -> Option<PathBuf> {
    custom
        .cloned()
        .or_else(|| dirs::home_dir().map(|p| p.join(".config").join("insta-feed")))
}

pub fn settings_path(config_dir: &Path) -> PathBuf {
    config_dir.join("settings.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn load_missing_file_returns_default() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.toml");

        let settings = Settings::load(&path).unwrap();

        assert_eq!(settings.app, "insta-feed");
        assert_eq!(settings.base_url, "http://localhost:8000");
        assert_eq!(settings.feed_path, "/api/v1/posts/");
        assert_eq!(settings.timeout_secs, 10);
        assert!(settings.cookie.is_none());
    }

    #[test]
    fn load_valid_settings() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.toml");

        fs::write(
            &path,
            "_app = \"insta-feed\"\nbase_url = \"http://photos.test\"\ntheme = \"light\"\n\n[retry]\nmax_attempts = 5\n",
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();

        assert_eq!(settings.base_url, "http://photos.test");
        assert_eq!(settings.theme, Some(ThemeVariant::Light));
        assert_eq!(settings.retry.max_attempts, 5);
        assert_eq!(settings.retry.base_delay_ms, 250);
        assert_eq!(settings.feed_path, "/api/v1/posts/");
    }

    #[test]
    fn wrong_sentinel_returns_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.toml");

        fs::write(&path, "_app = \"other-app\"\n").unwrap();

        let result = Settings::load(&path);

        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("another application"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.toml");
        fs::write(&path, "_app = \"insta-feed\"\ntimeout_secs = 0\n").unwrap();

        assert!(Settings::load(&path).is_err());
    }

    #[test]
    fn save_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("dir").join("settings.toml");

        let settings = Settings {
            theme: Some(ThemeVariant::Dark),
            ..Default::default()
        };

        settings.save(&path).unwrap();

        assert!(path.exists());
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("_app = \"insta-feed\""));
        assert!(content.contains("theme = \"dark\""));
    }

    #[test]
    fn round_trip_serialization() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.toml");

        let original = Settings {
            cookie: Some("session=abc".to_string()),
            ..Default::default()
        };

        original.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();

        assert_eq!(loaded, original);
    }

    #[test]
    fn cli_overrides_file() {
        let cli = Cli::parse_from(["feed", "--base-url", "http://other.test", "--dark"]);
        let settings = Settings {
            base_url: "http://photos.test".to_string(),
            cookie: Some("session=file".to_string()),
            theme: Some(ThemeVariant::Light),
            ..Default::default()
        }
        .with_cli(&cli);

        assert_eq!(settings.base_url, "http://other.test");
        assert_eq!(settings.cookie.as_deref(), Some("session=file"));
        assert_eq!(settings.theme, Some(ThemeVariant::Dark));
    }

    #[test]
    fn redacted_masks_cookie() {
        let settings = Settings {
            cookie: Some("session=secret".to_string()),
            ..Default::default()
        };
        let shown = toml::to_string_pretty(&settings.redacted()).unwrap();
        assert!(!shown.contains("secret"));
        assert!(shown.contains(REDACTED));
    }

    #[test]
    fn client_config_carries_timeout_and_retry() {
        let settings = Settings {
            timeout_secs: 3,
            ..Default::default()
        };
        let config = settings.client_config();
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn config_dir_uses_custom_when_provided() {
        let custom = PathBuf::from("/custom/path");
        let result = config_dir(Some(&custom));
        assert_eq!(result, Some(PathBuf::from("/custom/path")));
    }

    #[test]
    fn config_dir_falls_back_to_default() {
        let result = config_dir(None);
        assert!(result.is_some());
        assert!(result.unwrap().ends_with("insta-feed"));
    }
}

use crate::error::CatalogError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const ENV_FILE: &str = ".env";

pub const ENV_FEED_URL: &str = "SHEETS_JSON_URL";
pub const ENV_WRITE_URL: &str = "APPS_SCRIPT_URL";
pub const ENV_FEED_PROVIDER: &str = "ASSET_FEED_PROVIDER";
pub const ENV_PROXY_BIND: &str = "ASSET_PROXY_BIND";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub write: WriteConfig,
    pub proxy: ProxyConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeedProvider {
    /// Spreadsheet JSON feed, decoded client-side.
    #[default]
    Sheets,
    /// This system's own `GET /api/assets` endpoint.
    Proxy,
    /// Built-in sample catalog.
    Demo,
}

impl FeedProvider {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sheets" => Some(Self::Sheets),
            "proxy" => Some(Self::Proxy),
            "demo" => Some(Self::Demo),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct FeedConfig {
    pub provider: FeedProvider,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct WriteConfig {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProxyConfig {
    pub bind: String,
    /// How long a successful feed decode is served from memory. 0 disables.
    pub revalidate_secs: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            revalidate_secs: 60,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file for the dashboard (the terminal belongs to the UI).
    pub file: String,
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: "asset-catalog.log".to_string(),
            filter: "asset_catalog=info".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Like [`Config::load`], but a missing file yields defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).with_context(|| "Failed to parse config TOML")?;
        Ok(config)
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        Self::load_env_file_from(Path::new(ENV_FILE));
    }

    pub fn load_env_file_from(path: &Path) {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return,
        };
        // Strip BOM if present (common on Windows-created files)
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        for (key, value) in parse_env_lines(content) {
            if std::env::var(&key).is_err() {
                std::env::set_var(key, value);
            }
        }
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), CatalogError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup. Empty values are ignored; an
    /// unknown provider name is rejected.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), CatalogError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).and_then(non_empty);

        if let Some(url) = get(ENV_FEED_URL) {
            self.feed.url = Some(url);
        }
        if let Some(url) = get(ENV_WRITE_URL) {
            self.write.url = Some(url);
        }
        if let Some(raw) = get(ENV_FEED_PROVIDER) {
            self.feed.provider = FeedProvider::parse(&raw).ok_or_else(|| {
                CatalogError::Configuration(format!(
                    "unknown {} '{}' (expected sheets, proxy or demo)",
                    ENV_FEED_PROVIDER, raw
                ))
            })?;
        }
        if let Some(bind) = get(ENV_PROXY_BIND) {
            self.proxy.bind = bind;
        }
        Ok(())
    }

    /// The read feed URL, required by every provider except `demo`.
    pub fn feed_url(&self) -> Result<&str, CatalogError> {
        self.feed
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                CatalogError::Configuration(format!(
                    "feed URL not configured (set feed.url or {})",
                    ENV_FEED_URL
                ))
            })
    }

    /// The write endpoint URL. Absent means edits stay local.
    pub fn write_url(&self) -> Option<&str> {
        self.write
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn proxy_revalidate(&self) -> Duration {
        Duration::from_secs(self.proxy.revalidate_secs)
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse `KEY=VALUE` lines, skipping blanks and comments and unquoting values.
fn parse_env_lines(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(|line| line.trim().trim_matches('\r'))
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_parses() {
        let config = Config::load(Path::new("config.toml")).unwrap();
        assert_eq!(config.feed.provider, FeedProvider::Sheets);
        assert_eq!(config.proxy.bind, "127.0.0.1:3000");
        assert_eq!(config.proxy.revalidate_secs, 60);
        assert!(config.write_url().is_none());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.feed.provider, FeedProvider::Sheets);
        assert_eq!(config.logging.file, "asset-catalog.log");
        assert!(matches!(config.feed_url(), Err(CatalogError::Configuration(_))));
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml_str(
            r#"
            [feed]
            provider = "proxy"
            url = "http://127.0.0.1:3000/api/assets"

            [proxy]
            revalidate_secs = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.feed.provider, FeedProvider::Proxy);
        assert_eq!(config.feed_url().unwrap(), "http://127.0.0.1:3000/api/assets");
        assert_eq!(config.proxy.bind, "127.0.0.1:3000");
        assert!(config.proxy_revalidate().is_zero());
    }

    #[test]
    fn test_unknown_provider_rejected_in_toml() {
        assert!(Config::from_toml_str("[feed]\nprovider = \"ftp\"").is_err());
    }

    #[test]
    fn test_blank_urls_count_as_absent() {
        let config = Config::from_toml_str("[feed]\nurl = \"  \"\n[write]\nurl = \"\"").unwrap();
        assert!(config.feed_url().is_err());
        assert!(config.write_url().is_none());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_FEED_URL, "https://docs.example.com/gviz/tq"),
            (ENV_WRITE_URL, "https://script.example.com/exec"),
            (ENV_FEED_PROVIDER, "Demo"),
            (ENV_PROXY_BIND, ""),
        ]);
        let mut config = Config::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.feed_url().unwrap(), "https://docs.example.com/gviz/tq");
        assert_eq!(config.write_url(), Some("https://script.example.com/exec"));
        assert_eq!(config.feed.provider, FeedProvider::Demo);
        assert_eq!(config.proxy.bind, "127.0.0.1:3000");
    }

    #[test]
    fn test_unknown_provider_override_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|key| (key == ENV_FEED_PROVIDER).then(|| "demoo".to_string()))
            .unwrap_err();
        assert!(matches!(err, CatalogError::Configuration(_)));
        assert!(err.message().contains("demoo"));
        assert_eq!(config.feed.provider, FeedProvider::Sheets);
    }

    #[test]
    fn test_env_lines_parsed() {
        let parsed = parse_env_lines(
            "# comment\n\nSHEETS_JSON_URL=\"https://a.example/x\"\r\nAPPS_SCRIPT_URL='b'\nnot a pair\n",
        );
        assert_eq!(
            parsed,
            vec![
                ("SHEETS_JSON_URL".to_string(), "https://a.example/x".to_string()),
                ("APPS_SCRIPT_URL".to_string(), "b".to_string()),
            ]
        );
    }
}

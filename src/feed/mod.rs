pub mod demo;
pub mod envelope;
pub mod proxy_client;
pub mod script;
pub mod sheets;
pub mod types;

use crate::config::{Config, FeedProvider};
use crate::error::CatalogError;
use async_trait::async_trait;
use std::sync::Arc;
use types::{AssetRecord, FieldMutation};

/// Source of the authoritative record set.
#[async_trait]
pub trait AssetFeed: Send + Sync {
    async fn fetch_assets(&self) -> Result<Vec<AssetRecord>, CatalogError>;
    fn source_name(&self) -> &str;
}

/// Remote store that accepts single-field edits.
#[async_trait]
pub trait AssetWriter: Send + Sync {
    async fn write_field(&self, mutation: &FieldMutation) -> Result<(), CatalogError>;
}

/// Build the feed selected by `feed.provider`.
pub fn build_feed(config: &Config) -> Result<Arc<dyn AssetFeed>, CatalogError> {
    let feed: Arc<dyn AssetFeed> = match config.feed.provider {
        FeedProvider::Sheets => Arc::new(sheets::SheetsFeed::new(config.feed_url()?)?),
        FeedProvider::Proxy => Arc::new(proxy_client::ProxyFeed::new(config.feed_url()?)?),
        FeedProvider::Demo => Arc::new(demo::DemoFeed::sample()),
    };
    Ok(feed)
}

/// Build the write endpoint client. `None` when no write URL is configured,
/// which leaves edits local-only.
pub fn build_writer(config: &Config) -> Result<Option<Arc<dyn AssetWriter>>, CatalogError> {
    match config.write_url() {
        Some(url) if config.feed.provider != FeedProvider::Demo => {
            Ok(Some(Arc::new(script::ScriptWriter::new(url)?)))
        }
        _ => Ok(None),
    }
}

/// Shared HTTP client settings for every outbound endpoint.
pub(crate) fn http_client() -> Result<reqwest::Client, CatalogError> {
    reqwest::Client::builder()
        .pool_max_idle_per_host(4)
        .build()
        .map_err(|e| CatalogError::transport("failed to build HTTP client", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheets_provider_requires_url() {
        let config = Config::default();
        let err = build_feed(&config).err().unwrap();
        assert!(matches!(err, CatalogError::Configuration(_)));
    }

    #[test]
    fn test_demo_provider_needs_no_url() {
        let mut config = Config::default();
        config.feed.provider = FeedProvider::Demo;
        let feed = build_feed(&config).unwrap();
        assert_eq!(feed.source_name(), "demo");
    }

    #[test]
    fn test_writer_absent_without_url() {
        let config = Config::default();
        assert!(build_writer(&config).unwrap().is_none());
    }

    #[test]
    fn test_writer_disabled_in_demo_mode() {
        let mut config = Config::default();
        config.feed.provider = FeedProvider::Demo;
        config.write.url = Some("http://127.0.0.1:9/exec".to_string());
        assert!(build_writer(&config).unwrap().is_none());
    }

    #[test]
    fn test_writer_built_with_url() {
        let mut config = Config::default();
        config.write.url = Some("http://127.0.0.1:9/exec".to_string());
        assert!(build_writer(&config).unwrap().is_some());
    }
}

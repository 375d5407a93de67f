use super::envelope;
use super::types::AssetRecord;
use super::AssetFeed;
use crate::error::CatalogError;
use async_trait::async_trait;
use reqwest::Client;

/// Spreadsheet JSON feed, fetched directly and decoded client-side.
pub struct SheetsFeed {
    client: Client,
    url: String,
}

impl SheetsFeed {
    pub fn new(url: &str) -> Result<Self, CatalogError> {
        Ok(Self::with_client(super::http_client()?, url))
    }

    pub fn with_client(client: Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl AssetFeed for SheetsFeed {
    async fn fetch_assets(&self) -> Result<Vec<AssetRecord>, CatalogError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| CatalogError::transport("feed request failed", e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CatalogError::Transport(format!(
                "feed request failed ({}): {}",
                status, body
            )));
        }

        let text = resp
            .text()
            .await
            .map_err(|e| CatalogError::transport("failed to read feed body", e))?;

        let records = envelope::decode_assets(&text)?;
        tracing::debug!(count = records.len(), "decoded spreadsheet feed");
        Ok(records)
    }

    fn source_name(&self) -> &str {
        "sheets"
    }
}

use super::types::{assets_from_rows, AssetRecord, FlatRecord};
use super::AssetFeed;
use crate::error::CatalogError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// Body of `GET /api/assets`, in either its success or error shape.
#[derive(Debug, Deserialize)]
struct ProxyBody {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Vec<FlatRecord>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Reads records from this system's own proxy endpoint instead of the
/// spreadsheet feed. Rows go through the same typed conversion.
pub struct ProxyFeed {
    client: Client,
    url: String,
}

impl ProxyFeed {
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
impl AssetFeed for ProxyFeed {
    async fn fetch_assets(&self) -> Result<Vec<AssetRecord>, CatalogError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| CatalogError::transport("proxy request failed", e))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| CatalogError::transport("failed to read proxy body", e))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ProxyBody>(&text)
                .ok()
                .and_then(|b| b.message.or(b.error))
                .unwrap_or(text);
            return Err(CatalogError::Transport(format!(
                "proxy request failed ({}): {}",
                status, detail
            )));
        }

        let body: ProxyBody = serde_json::from_str(&text)
            .map_err(|e| CatalogError::format("proxy response is not valid JSON", e))?;
        if !body.success {
            return Err(CatalogError::Format(
                "proxy response did not report success".to_string(),
            ));
        }

        assets_from_rows(&body.data)
    }

    fn source_name(&self) -> &str {
        "proxy"
    }
}

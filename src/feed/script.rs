use super::types::FieldMutation;
use super::AssetWriter;
use crate::error::CatalogError;
use async_trait::async_trait;
use reqwest::Client;

/// Remote scripting endpoint that applies `{id, field, value}` edits to the sheet.
/// No response schema is required; any non-success status is a failed write.
pub struct ScriptWriter {
    client: Client,
    url: String,
}

impl ScriptWriter {
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
impl AssetWriter for ScriptWriter {
    async fn write_field(&self, mutation: &FieldMutation) -> Result<(), CatalogError> {
        let resp = self
            .client
            .post(&self.url)
            .json(mutation)
            .send()
            .await
            .map_err(|e| CatalogError::transport("write request failed", e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CatalogError::Transport(format!(
                "write rejected ({}): {}",
                status, body
            )));
        }

        tracing::debug!(id = %mutation.id, field = %mutation.field, "write accepted");
        Ok(())
    }
}

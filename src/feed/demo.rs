use super::types::{AssetId, AssetKind, AssetRecord, AssetStatus};
use super::AssetFeed;
use crate::error::CatalogError;
use async_trait::async_trait;
use serde_json::Map;
use std::time::Duration;

/// In-memory catalog used by `--demo` and when no spreadsheet is available.
pub struct DemoFeed {
    records: Vec<AssetRecord>,
    latency: Duration,
}

impl DemoFeed {
    pub fn new(records: Vec<AssetRecord>) -> Self {
        Self {
            records,
            latency: Duration::ZERO,
        }
    }

    /// The six-asset sample catalog.
    pub fn sample() -> Self {
        Self::new(sample_records())
    }

    /// Delay every fetch, so the loading state is visible.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl AssetFeed for DemoFeed {
    async fn fetch_assets(&self) -> Result<Vec<AssetRecord>, CatalogError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(self.records.clone())
    }

    fn source_name(&self) -> &str {
        "demo"
    }
}

#[allow(clippy::too_many_arguments)]
fn record(
    id: i64,
    name: &str,
    kind: AssetKind,
    url: &str,
    tags: &str,
    version: &str,
    status: AssetStatus,
    updated_at: &str,
) -> AssetRecord {
    AssetRecord {
        id: AssetId::Int(id),
        name: name.to_string(),
        kind,
        url: url.to_string(),
        tags: tags.to_string(),
        version: version.to_string(),
        status,
        updated_at: updated_at.to_string(),
        extra: Map::new(),
    }
}

pub fn sample_records() -> Vec<AssetRecord> {
    vec![
        record(
            1,
            "Main Stylesheet",
            AssetKind::Css,
            "https://cdn.example.com/styles/main.css",
            "layout,responsive,core",
            "2.1.0",
            AssetStatus::Active,
            "2024-12-15T10:30:00Z",
        ),
        record(
            2,
            "App Bundle",
            AssetKind::Js,
            "https://cdn.example.com/scripts/app.bundle.js",
            "core,production",
            "3.0.2",
            AssetStatus::Active,
            "2024-12-14T15:20:00Z",
        ),
        record(
            3,
            "Hero Background",
            AssetKind::Img,
            "https://cdn.example.com/images/hero-bg.webp",
            "hero,landing,optimized",
            "1.0.0",
            AssetStatus::Active,
            "2024-12-13T09:15:00Z",
        ),
        record(
            4,
            "Analytics Script",
            AssetKind::Js,
            "https://cdn.example.com/scripts/analytics.js",
            "tracking,analytics",
            "1.5.0",
            AssetStatus::Beta,
            "2024-12-12T14:00:00Z",
        ),
        record(
            5,
            "Legacy Theme",
            AssetKind::Css,
            "https://cdn.example.com/styles/legacy-theme.css",
            "deprecated,legacy",
            "1.0.0",
            AssetStatus::Disabled,
            "2024-11-20T08:00:00Z",
        ),
        record(
            6,
            "Logo SVG",
            AssetKind::Img,
            "https://cdn.example.com/images/logo.svg",
            "branding,logo,vector",
            "2.0.0",
            AssetStatus::Active,
            "2024-12-10T11:30:00Z",
        ),
    ]
}

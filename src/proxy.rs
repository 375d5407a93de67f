//! Local HTTP proxy exposing the decoded feed as `GET /api/assets`.
//!
//! The feed is fetched server-side on each request, except that a successful
//! decode is reused until the revalidation interval elapses.

use crate::error::CatalogError;
use crate::feed::types::AssetRecord;
use crate::feed::AssetFeed;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tower_http::trace::TraceLayer;

/// Error label shared by every failure response.
pub const FETCH_FAILED: &str = "Failed to fetch assets";

#[derive(Clone)]
pub struct ProxyState {
    /// `None` when no feed URL is configured; every request then fails.
    feed: Option<Arc<dyn AssetFeed>>,
    cache: Arc<Mutex<Option<Cached>>>,
    revalidate: Duration,
}

struct Cached {
    fetched_at: Instant,
    records: Vec<AssetRecord>,
}

impl ProxyState {
    pub fn new(feed: Arc<dyn AssetFeed>, revalidate: Duration) -> Self {
        Self {
            feed: Some(feed),
            cache: Arc::new(Mutex::new(None)),
            revalidate,
        }
    }

    /// State for a proxy started without a feed URL.
    pub fn unconfigured() -> Self {
        Self {
            feed: None,
            cache: Arc::new(Mutex::new(None)),
            revalidate: Duration::ZERO,
        }
    }

    fn cached(&self) -> Option<Vec<AssetRecord>> {
        if self.revalidate.is_zero() {
            return None;
        }
        let guard = self.cache.lock().ok()?;
        guard
            .as_ref()
            .filter(|c| c.fetched_at.elapsed() < self.revalidate)
            .map(|c| c.records.clone())
    }

    fn store(&self, records: &[AssetRecord]) {
        if self.revalidate.is_zero() {
            return;
        }
        if let Ok(mut guard) = self.cache.lock() {
            *guard = Some(Cached {
                fetched_at: Instant::now(),
                records: records.to_vec(),
            });
        }
    }

    async fn load(&self) -> Result<Vec<AssetRecord>, CatalogError> {
        if let Some(records) = self.cached() {
            return Ok(records);
        }
        let feed = self.feed.as_ref().ok_or_else(|| {
            CatalogError::Configuration("SHEETS_JSON_URL not configured".to_string())
        })?;
        let records = feed.fetch_assets().await?;
        self.store(&records);
        Ok(records)
    }
}

#[derive(Debug, Serialize)]
pub struct AssetsResponse {
    pub success: bool,
    pub data: Vec<AssetRecord>,
    pub count: usize,
    pub timestamp: String,
}

/// Any failure maps to the same 500 body.
#[derive(Debug)]
pub struct ProxyError(CatalogError);

impl From<CatalogError> for ProxyError {
    fn from(err: CatalogError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "asset proxy request failed");
        let body = Json(serde_json::json!({
            "error": FETCH_FAILED,
            "message": self.0.message(),
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

pub fn create_app(state: ProxyState) -> Router {
    Router::new()
        .route("/api/assets", get(list_assets))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn list_assets(State(state): State<ProxyState>) -> Result<Json<AssetsResponse>, ProxyError> {
    let data = state.load().await?;
    Ok(Json(AssetsResponse {
        success: true,
        count: data.len(),
        data,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}

/// Run the proxy until `shutdown_signal` resolves.
pub async fn serve(
    listener: tokio::net::TcpListener,
    state: ProxyState,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::demo::DemoFeed;

    #[tokio::test]
    async fn test_cache_disabled_with_zero_interval() {
        let state = ProxyState::new(Arc::new(DemoFeed::sample()), Duration::ZERO);
        state.load().await.unwrap();
        assert!(state.cache.lock().unwrap().is_none());
        assert!(state.cached().is_none());
    }

    #[tokio::test]
    async fn test_cache_serves_within_interval() {
        let state = ProxyState::new(Arc::new(DemoFeed::sample()), Duration::from_secs(60));
        let first = state.load().await.unwrap();
        assert_eq!(state.cached(), Some(first));
    }

    #[tokio::test]
    async fn test_unconfigured_is_configuration_error() {
        let err = ProxyState::unconfigured().load().await.unwrap_err();
        assert!(matches!(err, CatalogError::Configuration(_)));
    }
}

use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::feed::types::{AssetId, AssetRecord, EditableField, FieldMutation};
use crate::feed::{AssetFeed, AssetWriter};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Completion of a background network call, delivered to the event loop.
#[derive(Debug)]
pub enum PipelineEvent {
    FeedLoaded(Result<Vec<AssetRecord>, CatalogError>),
    WriteFinished {
        mutation: FieldMutation,
        result: Result<(), CatalogError>,
    },
}

/// What applying a [`PipelineEvent`] did to the catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    Loaded { count: usize },
    LoadFailed(CatalogError),
    WriteConfirmed(FieldMutation),
    /// The write failed; a full refetch has been started.
    Reconciling {
        mutation: FieldMutation,
        error: CatalogError,
    },
}

/// Wires the catalog to its feed and optional write endpoint. Network calls
/// run as spawned tasks; all catalog mutation happens in the caller.
pub struct Pipeline {
    feed: Arc<dyn AssetFeed>,
    writer: Option<Arc<dyn AssetWriter>>,
    events: mpsc::UnboundedSender<PipelineEvent>,
}

impl Pipeline {
    pub fn new(
        feed: Arc<dyn AssetFeed>,
        writer: Option<Arc<dyn AssetWriter>>,
    ) -> (Self, mpsc::UnboundedReceiver<PipelineEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (
            Self {
                feed,
                writer,
                events,
            },
            rx,
        )
    }

    pub fn source_name(&self) -> &str {
        self.feed.source_name()
    }

    pub fn writes_enabled(&self) -> bool {
        self.writer.is_some()
    }

    /// Start a fetch. Overlapping fetches are not fenced; the last to land wins.
    pub fn refresh(&self, catalog: &mut Catalog) {
        catalog.begin_fetch();
        let feed = self.feed.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = feed.fetch_assets().await;
            let _ = tx.send(PipelineEvent::FeedLoaded(result));
        });
    }

    /// Confirm the open edit: apply locally first, then persist.
    pub fn commit_edit(&self, catalog: &mut Catalog) -> Option<FieldMutation> {
        let mutation = catalog.commit_edit()?;
        self.persist(mutation.clone());
        Some(mutation)
    }

    pub fn commit(
        &self,
        catalog: &mut Catalog,
        id: AssetId,
        field: EditableField,
        value: String,
    ) -> FieldMutation {
        let mutation = catalog.commit(id, field, value);
        self.persist(mutation.clone());
        mutation
    }

    fn persist(&self, mutation: FieldMutation) {
        let Some(writer) = self.writer.clone() else {
            tracing::debug!(id = %mutation.id, field = %mutation.field, "no write endpoint, edit kept local");
            return;
        };
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = writer.write_field(&mutation).await;
            let _ = tx.send(PipelineEvent::WriteFinished { mutation, result });
        });
    }

    pub fn handle_event(&self, catalog: &mut Catalog, event: PipelineEvent) -> Reaction {
        match event {
            PipelineEvent::FeedLoaded(Ok(records)) => {
                let count = records.len();
                catalog.finish_fetch(Ok(records));
                tracing::info!(count, source = self.source_name(), "assets loaded");
                Reaction::Loaded { count }
            }
            PipelineEvent::FeedLoaded(Err(e)) => {
                tracing::error!(error = %e, "asset fetch failed");
                catalog.finish_fetch(Err(e.clone()));
                Reaction::LoadFailed(e)
            }
            PipelineEvent::WriteFinished {
                mutation,
                result: Ok(()),
            } => {
                tracing::info!(id = %mutation.id, field = %mutation.field, "edit saved");
                Reaction::WriteConfirmed(mutation)
            }
            PipelineEvent::WriteFinished {
                mutation,
                result: Err(error),
            } => {
                tracing::warn!(
                    id = %mutation.id,
                    field = %mutation.field,
                    error = %error,
                    "write failed, reloading assets"
                );
                self.refresh(catalog);
                Reaction::Reconciling { mutation, error }
            }
        }
    }
}

use crate::edit::EditSession;
use crate::error::CatalogError;
use crate::feed::types::{AssetId, AssetKind, AssetRecord, AssetStatus, EditableField, FieldMutation};
use crate::filter::{self, FilterState};

/// Counters for the stats row, over the full record set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub total: usize,
    pub active: usize,
    pub css: usize,
    pub js: usize,
    pub img: usize,
}

/// Client-side state: the last-known-good record set plus the filter and
/// edit session over it. Every transition that changes the filter inputs
/// recomputes the visible set before returning.
#[derive(Debug, Default)]
pub struct Catalog {
    records: Vec<AssetRecord>,
    filter: FilterState,
    edit: EditSession,
    visible: Vec<usize>,
    pending_fetches: usize,
    loaded_once: bool,
    last_error: Option<CatalogError>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(filter: FilterState) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn records(&self) -> &[AssetRecord] {
        &self.records
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn edit(&self) -> &EditSession {
        &self.edit
    }

    pub fn last_error(&self) -> Option<&CatalogError> {
        self.last_error.as_ref()
    }

    pub fn has_loaded(&self) -> bool {
        self.loaded_once
    }

    // -- fetch lifecycle --

    pub fn begin_fetch(&mut self) {
        self.pending_fetches += 1;
    }

    /// Apply a feed result. Success replaces every record (discarding any
    /// optimistic state); failure keeps the previous set.
    pub fn finish_fetch(&mut self, result: Result<Vec<AssetRecord>, CatalogError>) {
        self.pending_fetches = self.pending_fetches.saturating_sub(1);
        match result {
            Ok(records) => {
                self.records = records;
                self.loaded_once = true;
                self.last_error = None;
                self.recompute();
            }
            Err(e) => {
                self.last_error = Some(e);
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending_fetches > 0
    }

    // -- filtering --

    pub fn visible(&self) -> impl Iterator<Item = &AssetRecord> + '_ {
        self.visible.iter().filter_map(|&i| self.records.get(i))
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn visible_at(&self, row: usize) -> Option<&AssetRecord> {
        self.visible.get(row).and_then(|&i| self.records.get(i))
    }

    pub fn set_query(&mut self, query: String) {
        self.filter.query = query;
        self.recompute();
    }

    pub fn push_query_char(&mut self, c: char) {
        self.filter.query.push(c);
        self.recompute();
    }

    pub fn pop_query_char(&mut self) {
        self.filter.query.pop();
        self.recompute();
    }

    pub fn cycle_kind(&mut self) {
        self.filter.cycle_kind();
        self.recompute();
    }

    pub fn cycle_status(&mut self) {
        self.filter.cycle_status();
        self.recompute();
    }

    pub fn reset_filters(&mut self) {
        self.filter = FilterState::all();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.visible = filter::visible_indices(&self.records, &self.filter);
    }

    // -- editing --

    /// Open an edit on an existing record, seeded with its current value.
    pub fn begin_edit(&mut self, id: &AssetId, field: EditableField) -> bool {
        let Some(record) = self.records.iter().find(|r| &r.id == id) else {
            return false;
        };
        let current = record.field(field).to_string();
        if let Some(dropped) = self.edit.begin(id.clone(), field, &current) {
            tracing::debug!(id = %dropped.record_id, field = %dropped.field, "discarded open edit");
        }
        true
    }

    pub fn edit_session_mut(&mut self) -> &mut EditSession {
        &mut self.edit
    }

    pub fn cancel_edit(&mut self) -> bool {
        self.edit.cancel()
    }

    /// Confirm the open edit and apply it locally.
    pub fn commit_edit(&mut self) -> Option<FieldMutation> {
        let mutation = self.edit.confirm()?;
        self.apply_mutation(&mutation);
        Some(mutation)
    }

    /// Optimistically set `field` on record `id`. Any open edit is closed.
    pub fn commit(&mut self, id: AssetId, field: EditableField, value: String) -> FieldMutation {
        self.edit = EditSession::Idle;
        let mutation = FieldMutation { id, field, value };
        self.apply_mutation(&mutation);
        mutation
    }

    /// Returns false when the id is no longer present.
    pub fn apply_mutation(&mut self, mutation: &FieldMutation) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| r.id == mutation.id) else {
            return false;
        };
        record.set_field(mutation.field, mutation.value.clone());
        if matches!(mutation.field, EditableField::Name | EditableField::Url | EditableField::Tags) {
            self.recompute();
        }
        true
    }

    /// Cell text, showing the pending value for the cell under edit.
    pub fn display_value<'a>(&'a self, record: &'a AssetRecord, field: EditableField) -> &'a str {
        self.edit
            .pending_for(&record.id, field)
            .unwrap_or_else(|| record.field(field))
    }

    pub fn stats(&self) -> CatalogStats {
        self.records.iter().fold(
            CatalogStats {
                total: self.records.len(),
                ..CatalogStats::default()
            },
            |mut stats, r| {
                if r.status == AssetStatus::Active {
                    stats.active += 1;
                }
                match r.kind {
                    AssetKind::Css => stats.css += 1,
                    AssetKind::Js => stats.js += 1,
                    AssetKind::Img => stats.img += 1,
                    AssetKind::Other(_) => {}
                }
                stats
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::demo::sample_records;
    use crate::filter::Selector;

    fn loaded() -> Catalog {
        let mut catalog = Catalog::with_filter(FilterState::all());
        catalog.begin_fetch();
        catalog.finish_fetch(Ok(sample_records()));
        catalog
    }

    #[test]
    fn test_loading_state_tracks_outstanding_fetches() {
        let mut catalog = Catalog::new();
        assert!(!catalog.is_loading());
        catalog.begin_fetch();
        catalog.begin_fetch();
        catalog.finish_fetch(Ok(sample_records()));
        assert!(catalog.is_loading());
        catalog.finish_fetch(Ok(sample_records()));
        assert!(!catalog.is_loading());
        assert!(catalog.has_loaded());
    }

    #[test]
    fn test_default_filter_shows_active_only() {
        let mut catalog = Catalog::new();
        catalog.begin_fetch();
        catalog.finish_fetch(Ok(sample_records()));
        assert_eq!(catalog.visible_len(), 4);
        assert!(catalog.visible().all(|r| r.status == AssetStatus::Active));
    }

    #[test]
    fn test_failed_fetch_keeps_last_known_good() {
        let mut catalog = loaded();
        catalog.begin_fetch();
        catalog.finish_fetch(Err(CatalogError::Transport("down".to_string())));
        assert_eq!(catalog.records().len(), 6);
        assert!(catalog.last_error().is_some());
        assert!(!catalog.is_loading());
    }

    #[test]
    fn test_commit_updates_only_target_record() {
        let mut catalog = loaded();
        let before = catalog.records().to_vec();
        let mutation = catalog.commit(AssetId::Int(2), EditableField::Name, "New Name".to_string());
        assert_eq!(mutation.value, "New Name");

        for (old, new) in before.iter().zip(catalog.records()) {
            if new.id == AssetId::Int(2) {
                assert_eq!(new.name, "New Name");
                assert_eq!(new.updated_at, old.updated_at);
                assert_eq!(new.url, old.url);
            } else {
                assert_eq!(old, new);
            }
        }
    }

    #[test]
    fn test_commit_against_missing_id_is_local_noop() {
        let mut catalog = loaded();
        let before = catalog.records().to_vec();
        let mutation = catalog.commit(AssetId::Int(99), EditableField::Tags, "x".to_string());
        assert_eq!(mutation.id, AssetId::Int(99));
        assert_eq!(catalog.records(), before.as_slice());
    }

    #[test]
    fn test_edit_flow_shows_pending_value() {
        let mut catalog = loaded();
        assert!(catalog.begin_edit(&AssetId::Int(3), EditableField::Tags));
        catalog.edit_session_mut().input("hero".to_string());

        let record = catalog.records()[2].clone();
        assert_eq!(catalog.display_value(&record, EditableField::Tags), "hero");
        assert_eq!(record.tags, "hero,landing,optimized");

        let mutation = catalog.commit_edit().unwrap();
        assert_eq!(mutation.value, "hero");
        assert_eq!(catalog.records()[2].tags, "hero");
        assert!(!catalog.edit().is_editing());
    }

    #[test]
    fn test_begin_edit_unknown_id() {
        let mut catalog = loaded();
        assert!(!catalog.begin_edit(&AssetId::Text("nope".to_string()), EditableField::Name));
        assert!(!catalog.edit().is_editing());
    }

    #[test]
    fn test_edit_recomputes_visible_set() {
        let mut catalog = loaded();
        catalog.set_query("stylesheet".to_string());
        assert_eq!(catalog.visible_len(), 1);
        catalog.commit(AssetId::Int(1), EditableField::Name, "Main Styles".to_string());
        assert_eq!(catalog.visible_len(), 0);
    }

    #[test]
    fn test_filter_persists_across_refetch() {
        let mut catalog = loaded();
        catalog.cycle_kind();
        assert_eq!(catalog.filter().kind, Selector::Only(AssetKind::Css));
        catalog.begin_fetch();
        catalog.finish_fetch(Ok(sample_records()));
        assert_eq!(catalog.filter().kind, Selector::Only(AssetKind::Css));
        assert_eq!(catalog.visible_len(), 2);
        catalog.reset_filters();
        assert_eq!(catalog.visible_len(), 6);
    }

    #[test]
    fn test_stats_over_full_set() {
        let mut catalog = loaded();
        catalog.set_query("logo".to_string());
        assert_eq!(
            catalog.stats(),
            CatalogStats {
                total: 6,
                active: 4,
                css: 2,
                js: 2,
                img: 2
            }
        );
    }
}

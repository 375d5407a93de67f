use crate::feed::types::{AssetKind, AssetRecord, AssetStatus};

/// Either "any value" or one exact value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selector<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Selector<T> {
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(want) => want == value,
        }
    }
}

/// Active predicates. Conjunctive; survives refetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub query: String,
    pub kind: Selector<AssetKind>,
    pub status: Selector<AssetStatus>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            query: String::new(),
            kind: Selector::All,
            status: Selector::Only(AssetStatus::Active),
        }
    }
}

impl FilterState {
    /// No predicates at all.
    pub fn all() -> Self {
        Self {
            query: String::new(),
            kind: Selector::All,
            status: Selector::All,
        }
    }

    pub fn matches(&self, record: &AssetRecord) -> bool {
        if !self.status.admits(&record.status) {
            return false;
        }
        if !self.kind.admits(&record.kind) {
            return false;
        }
        if self.query.trim().is_empty() {
            return true;
        }
        let needle = self.query.to_lowercase();
        [&record.name, &record.tags, &record.url]
            .iter()
            .any(|hay| hay.to_lowercase().contains(&needle))
    }

    /// All → css → js → img → All.
    pub fn cycle_kind(&mut self) {
        self.kind = match &self.kind {
            Selector::All => Selector::Only(AssetKind::Css),
            Selector::Only(AssetKind::Css) => Selector::Only(AssetKind::Js),
            Selector::Only(AssetKind::Js) => Selector::Only(AssetKind::Img),
            Selector::Only(_) => Selector::All,
        };
    }

    /// All → active → beta → disabled → All.
    pub fn cycle_status(&mut self) {
        self.status = match &self.status {
            Selector::All => Selector::Only(AssetStatus::Active),
            Selector::Only(AssetStatus::Active) => Selector::Only(AssetStatus::Beta),
            Selector::Only(AssetStatus::Beta) => Selector::Only(AssetStatus::Disabled),
            Selector::Only(_) => Selector::All,
        };
    }

    pub fn kind_label(&self) -> &str {
        match &self.kind {
            Selector::All => "All Types",
            Selector::Only(kind) => kind.label(),
        }
    }

    pub fn status_label(&self) -> &str {
        match &self.status {
            Selector::All => "All Status",
            Selector::Only(status) => status.as_str(),
        }
    }
}

/// Visible subset of `records`, in source order.
pub fn apply<'a>(records: &'a [AssetRecord], filter: &FilterState) -> Vec<&'a AssetRecord> {
    records.iter().filter(|r| filter.matches(r)).collect()
}

/// Like [`apply`], but yields positions into `records`.
pub fn visible_indices(records: &[AssetRecord], filter: &FilterState) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| filter.matches(r))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::demo::sample_records;
    use crate::feed::types::AssetId;

    fn ids(records: &[&AssetRecord]) -> Vec<AssetId> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_status_filter_example() {
        let mut records = sample_records();
        records.truncate(2);
        records[1].status = AssetStatus::Beta;
        let filter = FilterState {
            query: String::new(),
            kind: Selector::All,
            status: Selector::Only(AssetStatus::Active),
        };
        assert_eq!(ids(&apply(&records, &filter)), vec![AssetId::Int(1)]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let records = sample_records();
        let filter = FilterState {
            query: "HERO".to_string(),
            ..FilterState::all()
        };
        let visible = apply(&records, &filter);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Hero Background");
    }

    #[test]
    fn test_search_covers_tags_and_url() {
        let records = sample_records();
        let by_tag = FilterState {
            query: "tracking".to_string(),
            ..FilterState::all()
        };
        assert_eq!(ids(&apply(&records, &by_tag)), vec![AssetId::Int(4)]);

        let by_url = FilterState {
            query: "legacy-theme.css".to_string(),
            ..FilterState::all()
        };
        assert_eq!(ids(&apply(&records, &by_url)), vec![AssetId::Int(5)]);
    }

    #[test]
    fn test_whitespace_query_is_inactive() {
        let records = sample_records();
        let filter = FilterState {
            query: "   ".to_string(),
            ..FilterState::all()
        };
        assert_eq!(apply(&records, &filter).len(), records.len());
    }

    #[test]
    fn test_predicates_are_conjunctive() {
        let records = sample_records();
        let combined = FilterState {
            query: "core".to_string(),
            kind: Selector::Only(AssetKind::Js),
            status: Selector::Only(AssetStatus::Active),
        };
        let singles = [
            FilterState {
                query: combined.query.clone(),
                ..FilterState::all()
            },
            FilterState {
                kind: combined.kind.clone(),
                ..FilterState::all()
            },
            FilterState {
                status: combined.status.clone(),
                ..FilterState::all()
            },
        ];
        let each: Vec<Vec<AssetId>> = singles.iter().map(|f| ids(&apply(&records, f))).collect();

        // intersection of the single-predicate results, in source order
        let intersection: Vec<AssetId> = records
            .iter()
            .map(|r| r.id.clone())
            .filter(|id| each.iter().all(|subset| subset.contains(id)))
            .collect();

        assert_eq!(ids(&apply(&records, &combined)), intersection);
        assert!(each.iter().all(|subset| subset.len() > intersection.len()));
        assert!(!intersection.is_empty());

        let disjoint = FilterState {
            kind: Selector::Only(AssetKind::Css),
            status: Selector::Only(AssetStatus::Beta),
            ..FilterState::all()
        };
        assert!(apply(&records, &disjoint).is_empty());
    }

    #[test]
    fn test_apply_is_idempotent_and_ordered() {
        let records = sample_records();
        let filter = FilterState {
            kind: Selector::Only(AssetKind::Img),
            ..FilterState::default()
        };
        let once: Vec<AssetRecord> = apply(&records, &filter).into_iter().cloned().collect();
        let twice: Vec<AssetRecord> = apply(&once, &filter).into_iter().cloned().collect();
        assert_eq!(once, twice);
        assert_eq!(
            once.iter().map(|r| r.id.clone()).collect::<Vec<_>>(),
            vec![AssetId::Int(3), AssetId::Int(6)]
        );
    }

    #[test]
    fn test_visible_indices_match_apply() {
        let records = sample_records();
        let filter = FilterState::default();
        let indices = visible_indices(&records, &filter);
        assert_eq!(indices, vec![0, 1, 2, 5]);
    }

    #[test]
    fn test_cycles_wrap_to_all() {
        let mut filter = FilterState::all();
        for expected in ["CSS", "JavaScript", "Images", "All Types"] {
            filter.cycle_kind();
            assert_eq!(filter.kind_label(), expected);
        }
        for expected in ["active", "beta", "disabled", "All Status"] {
            filter.cycle_status();
            assert_eq!(filter.status_label(), expected);
        }
    }
}

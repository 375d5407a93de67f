use crate::feed::types::{AssetId, EditableField, FieldMutation};

/// The single open inline edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveEdit {
    pub record_id: AssetId,
    pub field: EditableField,
    pub pending: String,
}

/// At most one edit exists at a time. Committing is not a resting state:
/// [`EditSession::confirm`] hands back the mutation and returns to `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditSession {
    #[default]
    Idle,
    Editing(ActiveEdit),
}

impl EditSession {
    /// Open an edit seeded with `current`. Any open edit is dropped without
    /// a commit and returned.
    pub fn begin(&mut self, record_id: AssetId, field: EditableField, current: &str) -> Option<ActiveEdit> {
        let previous = std::mem::replace(
            self,
            Self::Editing(ActiveEdit {
                record_id,
                field,
                pending: current.to_string(),
            }),
        );
        match previous {
            Self::Editing(edit) => Some(edit),
            Self::Idle => None,
        }
    }

    /// Replace the pending value. No-op when idle.
    pub fn input(&mut self, value: String) {
        if let Self::Editing(edit) = self {
            edit.pending = value;
        }
    }

    pub fn push_char(&mut self, c: char) {
        if let Self::Editing(edit) = self {
            edit.pending.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Self::Editing(edit) = self {
            edit.pending.pop();
        }
    }

    /// Abort. Returns whether an edit was open.
    pub fn cancel(&mut self) -> bool {
        matches!(std::mem::take(self), Self::Editing(_))
    }

    /// Close the edit and produce the mutation to apply.
    pub fn confirm(&mut self) -> Option<FieldMutation> {
        match std::mem::take(self) {
            Self::Editing(edit) => Some(FieldMutation {
                id: edit.record_id,
                field: edit.field,
                value: edit.pending,
            }),
            Self::Idle => None,
        }
    }

    pub fn active(&self) -> Option<&ActiveEdit> {
        match self {
            Self::Editing(edit) => Some(edit),
            Self::Idle => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing(_))
    }

    /// Pending value if this exact cell is under edit.
    pub fn pending_for(&self, id: &AssetId, field: EditableField) -> Option<&str> {
        self.active()
            .filter(|edit| &edit.record_id == id && edit.field == field)
            .map(|edit| edit.pending.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_then_confirm() {
        let mut session = EditSession::default();
        assert!(session.begin(AssetId::Int(2), EditableField::Name, "App Bundle").is_none());
        session.input("New Name".to_string());
        let mutation = session.confirm().unwrap();
        assert_eq!(mutation.id, AssetId::Int(2));
        assert_eq!(mutation.field, EditableField::Name);
        assert_eq!(mutation.value, "New Name");
        assert_eq!(session, EditSession::Idle);
    }

    #[test]
    fn test_typing_edits_pending_value() {
        let mut session = EditSession::default();
        session.begin(AssetId::Int(1), EditableField::Version, "2.1.0");
        session.backspace();
        session.push_char('1');
        assert_eq!(session.pending_for(&AssetId::Int(1), EditableField::Version), Some("2.1.1"));
        assert_eq!(session.pending_for(&AssetId::Int(1), EditableField::Name), None);
    }

    #[test]
    fn test_cancel_produces_nothing() {
        let mut session = EditSession::default();
        session.begin(AssetId::Int(1), EditableField::Url, "x");
        assert!(session.cancel());
        assert!(session.confirm().is_none());
        assert!(!session.cancel());
    }

    #[test]
    fn test_new_edit_replaces_open_one() {
        let mut session = EditSession::default();
        session.begin(AssetId::Int(1), EditableField::Name, "a");
        session.input("draft".to_string());
        let dropped = session.begin(AssetId::Int(3), EditableField::Tags, "hero").unwrap();
        assert_eq!(dropped.pending, "draft");
        assert_eq!(session.active().unwrap().record_id, AssetId::Int(3));
        assert_eq!(session.confirm().unwrap().value, "hero");
    }

    #[test]
    fn test_idle_ignores_input() {
        let mut session = EditSession::default();
        session.input("ignored".to_string());
        session.push_char('x');
        session.backspace();
        assert!(!session.is_editing());
    }
}

use crate::feed::types::EditableField;
use crate::pipeline::Reaction;
use std::collections::VecDeque;

const MAX_LOGS: usize = 200;

/// Where plain keystrokes go. Editing is tracked by the catalog's edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Table,
    Search,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub message: String,
}

/// Presentation-only state. Records, filters and edits live in `Catalog`.
#[derive(Debug, Clone)]
pub struct UiState {
    pub focus: Focus,
    pub selected_row: usize,
    pub selected_field: EditableField,
    pub logs: VecDeque<LogEntry>,
    pub spinner_frame: u8,
    pub source_name: String,
    pub writes_enabled: bool,
}

impl UiState {
    pub fn new(source_name: &str, writes_enabled: bool) -> Self {
        Self {
            focus: Focus::Table,
            selected_row: 0,
            selected_field: EditableField::Name,
            logs: VecDeque::with_capacity(MAX_LOGS),
            spinner_frame: 0,
            source_name: source_name.to_string(),
            writes_enabled,
        }
    }

    pub fn push_log(&mut self, level: &str, message: String) {
        let time = chrono::Local::now().format("%H:%M:%S%.3f").to_string();
        if self.logs.len() >= MAX_LOGS {
            self.logs.pop_front();
        }
        self.logs.push_back(LogEntry {
            time,
            level: level.to_string(),
            message,
        });
    }

    pub fn log_reaction(&mut self, reaction: &Reaction) {
        match reaction {
            Reaction::Loaded { count } => {
                self.push_log("INFO", format!("Loaded {} assets from {}", count, self.source_name))
            }
            Reaction::LoadFailed(e) => self.push_log("ERROR", format!("Fetch failed: {}", e)),
            Reaction::WriteConfirmed(m) => {
                self.push_log("INFO", format!("Saved {} of asset {}", m.field, m.id))
            }
            Reaction::Reconciling { mutation, error } => self.push_log(
                "WARN",
                format!(
                    "Save of {} for asset {} failed ({}), reloading",
                    mutation.field, mutation.id, error
                ),
            ),
        }
    }

    pub fn select_next(&mut self, visible: usize) {
        if visible > 0 {
            self.selected_row = (self.selected_row + 1).min(visible - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    /// Keep the selection inside the visible set after it shrinks.
    pub fn clamp_selection(&mut self, visible: usize) {
        self.selected_row = self.selected_row.min(visible.saturating_sub(1));
    }

    pub fn tick_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }
}

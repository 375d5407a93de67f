use super::state::{Focus, UiState};
use crate::catalog::Catalog;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Work the key handler can't do on its own because it needs the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Quit,
    Refresh,
    /// Confirm the open edit and persist it.
    Commit,
}

pub fn handle_key(key: KeyEvent, catalog: &mut Catalog, ui: &mut UiState) -> Option<UiAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(UiAction::Quit);
    }
    if catalog.edit().is_editing() {
        return handle_edit_key(key, catalog, ui);
    }
    match ui.focus {
        Focus::Search => {
            handle_search_key(key, catalog, ui);
            None
        }
        Focus::Table => handle_table_key(key, catalog, ui),
    }
}

fn handle_edit_key(key: KeyEvent, catalog: &mut Catalog, ui: &mut UiState) -> Option<UiAction> {
    match key.code {
        KeyCode::Enter => Some(UiAction::Commit),
        KeyCode::Esc => {
            catalog.cancel_edit();
            None
        }
        // Leaving the cell counts as confirming it.
        KeyCode::Tab => {
            ui.selected_field = ui.selected_field.next();
            Some(UiAction::Commit)
        }
        KeyCode::Up => {
            ui.select_prev();
            Some(UiAction::Commit)
        }
        KeyCode::Down => {
            ui.select_next(catalog.visible_len());
            Some(UiAction::Commit)
        }
        KeyCode::Backspace => {
            catalog.edit_session_mut().backspace();
            None
        }
        KeyCode::Char(c) => {
            catalog.edit_session_mut().push_char(c);
            None
        }
        _ => None,
    }
}

fn handle_search_key(key: KeyEvent, catalog: &mut Catalog, ui: &mut UiState) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => ui.focus = Focus::Table,
        KeyCode::Backspace => {
            catalog.pop_query_char();
            ui.clamp_selection(catalog.visible_len());
        }
        KeyCode::Char(c) => {
            catalog.push_query_char(c);
            ui.clamp_selection(catalog.visible_len());
        }
        _ => {}
    }
}

fn handle_table_key(key: KeyEvent, catalog: &mut Catalog, ui: &mut UiState) -> Option<UiAction> {
    match key.code {
        KeyCode::Char('q') => return Some(UiAction::Quit),
        KeyCode::Char('r') => return Some(UiAction::Refresh),
        KeyCode::Char('/') => ui.focus = Focus::Search,
        KeyCode::Char('t') => catalog.cycle_kind(),
        KeyCode::Char('s') => catalog.cycle_status(),
        KeyCode::Char('x') => catalog.reset_filters(),
        KeyCode::Up | KeyCode::Char('k') => ui.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => ui.select_next(catalog.visible_len()),
        KeyCode::Left => ui.selected_field = ui.selected_field.prev(),
        KeyCode::Right => ui.selected_field = ui.selected_field.next(),
        KeyCode::Enter | KeyCode::Char('e') => {
            if let Some(id) = catalog.visible_at(ui.selected_row).map(|r| r.id.clone()) {
                catalog.begin_edit(&id, ui.selected_field);
            }
        }
        _ => {}
    }
    ui.clamp_selection(catalog.visible_len());
    None
}

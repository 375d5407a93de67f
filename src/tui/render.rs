use std::borrow::Cow;

use super::state::{Focus, UiState};
use crate::catalog::Catalog;
use crate::feed::types::{AssetRecord, AssetStatus, EditableField};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub fn draw(f: &mut Frame, catalog: &Catalog, ui: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(8),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, catalog, ui, chunks[0]);
    draw_stats(f, catalog, chunks[1]);
    draw_filter_bar(f, catalog, ui, chunks[2]);
    draw_assets(f, catalog, ui, chunks[3]);
    draw_logs(f, ui, chunks[4]);
    draw_footer(f, catalog, ui, chunks[5]);
}

fn draw_header(f: &mut Frame, catalog: &Catalog, ui: &UiState, area: Rect) {
    let activity = if catalog.is_loading() {
        let ch = SPINNER_FRAMES[(ui.spinner_frame as usize) % SPINNER_FRAMES.len()];
        Span::styled(format!(" {} loading", ch), Style::default().fg(Color::Cyan))
    } else {
        Span::styled(" idle", Style::default().fg(Color::DarkGray))
    };

    let writes = if ui.writes_enabled {
        Span::styled("saving to sheet", Style::default().fg(Color::Green))
    } else {
        Span::styled("local edits only", Style::default().fg(Color::Yellow))
    };

    let line = Line::from(vec![
        Span::styled(" Asset Catalog", Style::default().add_modifier(Modifier::BOLD)),
        activity,
        Span::styled(" | source: ", Style::default().fg(Color::DarkGray)),
        Span::raw(ui.source_name.as_str()),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        writes,
    ]);
    let para = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(para, area);
}

fn draw_stats(f: &mut Frame, catalog: &Catalog, area: Rect) {
    let stats = catalog.stats();
    let stat = |label: &'static str, value: usize, color: Color| {
        vec![
            Span::styled(format!(" {}: ", label), Style::default().fg(Color::DarkGray)),
            Span::styled(value.to_string(), Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::raw("  "),
        ]
    };

    let spans: Vec<Span> = [
        stat("Total", stats.total, Color::White),
        stat("Active", stats.active, Color::Green),
        stat("CSS", stats.css, Color::Blue),
        stat("JS", stats.js, Color::Yellow),
        stat("Images", stats.img, Color::Magenta),
    ]
    .into_iter()
    .flatten()
    .collect();

    let para = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(para, area);
}

fn draw_filter_bar(f: &mut Frame, catalog: &Catalog, ui: &UiState, area: Rect) {
    let filter = catalog.filter();
    let searching = ui.focus == Focus::Search;

    let search = if filter.query.is_empty() && !searching {
        Span::styled("Search assets...", Style::default().fg(Color::DarkGray))
    } else if searching {
        Span::styled(format!("{}▏", filter.query), Style::default().fg(Color::Yellow))
    } else {
        Span::raw(filter.query.as_str())
    };

    let line = Line::from(vec![
        Span::styled(" [/] ", Style::default().fg(Color::Yellow)),
        search,
        Span::styled("   [t] ", Style::default().fg(Color::Yellow)),
        Span::raw(filter.kind_label()),
        Span::styled("   [s] ", Style::default().fg(Color::Yellow)),
        Span::raw(filter.status_label()),
    ]);

    let border = if searching { Color::Yellow } else { Color::Reset };
    let block = Block::default()
        .title(" Filters ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_assets(f: &mut Frame, catalog: &Catalog, ui: &UiState, area: Rect) {
    let title = format!(" Assets ({}) ", catalog.visible_len());
    let block = Block::default().title(title).borders(Borders::ALL);

    if catalog.visible_len() == 0 {
        let (text, color) = if catalog.is_loading() {
            ("Loading assets...", Color::Cyan)
        } else {
            ("No assets found", Color::DarkGray)
        };
        let para = Paragraph::new(Line::from(Span::styled(text, Style::default().fg(color))))
            .block(block);
        f.render_widget(para, area);
        return;
    }

    let header = Row::new(vec![
        "ID", "Name", "Type", "URL", "Tags", "Version", "Status", "Updated",
    ])
    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let visible_lines = area.height.saturating_sub(3) as usize;
    let offset = ui.selected_row.saturating_sub(visible_lines.saturating_sub(1));

    let rows: Vec<Row> = catalog
        .visible()
        .enumerate()
        .skip(offset)
        .take(visible_lines)
        .map(|(i, record)| asset_row(catalog, ui, record, i == ui.selected_row))
        .collect();

    let widths = [
        Constraint::Length(5),
        Constraint::Percentage(18),
        Constraint::Length(5),
        Constraint::Percentage(30),
        Constraint::Percentage(20),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Length(13),
    ];
    let table = Table::new(rows, widths).header(header).block(block);
    f.render_widget(table, area);
}

fn asset_row<'a>(catalog: &'a Catalog, ui: &UiState, record: &'a AssetRecord, selected: bool) -> Row<'a> {
    let editable = |field: EditableField| {
        let editing = catalog.edit().pending_for(&record.id, field).is_some();
        let text = catalog.display_value(record, field);
        let text = if field == EditableField::Tags && !editing {
            record.tag_chips().join(" · ")
        } else if editing {
            format!("{}▏", text)
        } else {
            text.to_string()
        };
        let style = if editing {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else if selected && field == ui.selected_field {
            Style::default().add_modifier(Modifier::UNDERLINED | Modifier::BOLD)
        } else {
            Style::default()
        };
        Cell::from(text).style(style)
    };

    let status_color = match record.status {
        AssetStatus::Active => Color::Green,
        AssetStatus::Beta => Color::Yellow,
        AssetStatus::Disabled => Color::Red,
        AssetStatus::Other(_) => Color::DarkGray,
    };

    let row = Row::new(vec![
        Cell::from(record.id.to_string()).style(Style::default().fg(Color::DarkGray)),
        editable(EditableField::Name),
        Cell::from(record.kind.as_str().to_uppercase()),
        editable(EditableField::Url),
        editable(EditableField::Tags),
        editable(EditableField::Version),
        Cell::from(record.status.as_str()).style(Style::default().fg(status_color)),
        Cell::from(format_updated(&record.updated_at).into_owned()).style(Style::default().fg(Color::DarkGray)),
    ]);

    if selected {
        row.style(Style::default().bg(Color::DarkGray))
    } else {
        row
    }
}

fn draw_logs(f: &mut Frame, ui: &UiState, area: Rect) {
    let max_width = area.width.saturating_sub(2) as usize; // borders
    let visible_lines = area.height.saturating_sub(2) as usize;

    let lines: Vec<Line> = ui
        .logs
        .iter()
        .rev()
        .take(visible_lines)
        .map(|l| {
            let color = match l.level.as_str() {
                "ERROR" => Color::Red,
                "WARN" => Color::Yellow,
                _ => Color::DarkGray,
            };
            let prefix = format!(" {} [{}] ", l.time, l.level);
            let msg_max = max_width.saturating_sub(prefix.len());
            let msg = truncate_with_ellipsis(&l.message, msg_max);
            Line::from(vec![
                Span::styled(prefix, Style::default().fg(color)),
                Span::raw(msg.into_owned()),
            ])
        })
        .collect();

    let block = Block::default().title(" Log ").borders(Borders::ALL);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_footer(f: &mut Frame, catalog: &Catalog, ui: &UiState, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
    let line = if catalog.edit().is_editing() {
        Line::from(vec![
            key("  [Enter]"),
            Span::raw(" save  "),
            key("[Esc]"),
            Span::raw(" cancel  "),
            key("[Tab/↑/↓]"),
            Span::raw(" save and move  "),
        ])
    } else if ui.focus == Focus::Search {
        Line::from(vec![
            Span::raw("  type to search  "),
            key("[Enter/Esc]"),
            Span::raw(" done  "),
        ])
    } else {
        Line::from(vec![
            key("  [q]"),
            Span::raw("uit  "),
            key("[r]"),
            Span::raw("efresh  "),
            key("[/]"),
            Span::raw(" search  "),
            key("[t]"),
            Span::raw("ype  "),
            key("[s]"),
            Span::raw("tatus  "),
            key("[x]"),
            Span::raw(" reset  "),
            key("[←/→]"),
            Span::raw(" column  "),
            key("[e]"),
            Span::raw("dit  "),
        ])
    };
    f.render_widget(Paragraph::new(line), area);
}

/// `2024-12-15T10:30:00Z` -> `Dec 15, 2024`. Unparseable text is shown as-is.
fn format_updated(raw: &str) -> Cow<'_, str> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Cow::Owned(dt.format("%b %-d, %Y").to_string());
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Cow::Owned(date.format("%b %-d, %Y").to_string());
    }
    Cow::Borrowed(raw)
}

fn truncate_with_ellipsis(s: &str, max_width: usize) -> Cow<'_, str> {
    let char_count = s.chars().count();
    if char_count <= max_width {
        Cow::Borrowed(s)
    } else if max_width <= 3 {
        Cow::Owned(".".repeat(max_width))
    } else {
        let end = s
            .char_indices()
            .nth(max_width - 3)
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        Cow::Owned(format!("{}...", &s[..end]))
    }
}

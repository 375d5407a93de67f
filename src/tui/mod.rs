pub mod keys;
pub mod render;
pub mod state;

use crate::catalog::Catalog;
use crate::pipeline::{Pipeline, PipelineEvent};
use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use futures_util::StreamExt;
use keys::UiAction;
use ratatui::prelude::*;
use state::UiState;
use std::io::stdout;
use std::time::Duration;
use tokio::sync::mpsc;

/// Run the dashboard until the user quits. Owns the catalog; all state
/// changes happen on this task.
pub async fn run_tui(
    catalog: Catalog,
    pipeline: Pipeline,
    events: mpsc::UnboundedReceiver<PipelineEvent>,
) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = tui_loop(&mut terminal, catalog, pipeline, events).await;

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn tui_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    mut catalog: Catalog,
    pipeline: Pipeline,
    mut events: mpsc::UnboundedReceiver<PipelineEvent>,
) -> Result<()> {
    let mut ui = UiState::new(pipeline.source_name(), pipeline.writes_enabled());
    let mut term_events = EventStream::new();
    let mut tick = tokio::time::interval(Duration::from_millis(100));
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    pipeline.refresh(&mut catalog);
    ui.push_log("INFO", format!("Fetching assets from {}", ui.source_name));

    loop {
        ui.clamp_selection(catalog.visible_len());
        terminal.draw(|f| render::draw(f, &catalog, &ui))?;

        tokio::select! {
            maybe_key = term_events.next() => match maybe_key {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    match keys::handle_key(key, &mut catalog, &mut ui) {
                        Some(UiAction::Quit) => return Ok(()),
                        Some(UiAction::Refresh) => {
                            pipeline.refresh(&mut catalog);
                            ui.push_log("INFO", "Refreshing assets".to_string());
                        }
                        Some(UiAction::Commit) => {
                            if let Some(m) = pipeline.commit_edit(&mut catalog) {
                                ui.push_log("INFO", format!("Updated {} of asset {}", m.field, m.id));
                            }
                        }
                        None => {}
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },
            Some(event) = events.recv() => {
                let reaction = pipeline.handle_event(&mut catalog, event);
                ui.log_reaction(&reaction);
            }
            _ = tick.tick() => {
                if catalog.is_loading() {
                    ui.tick_spinner();
                }
            }
        }
    }
}

//! Ratatui-based terminal UI.
//!
//! The TUI provides a listing-id input, the listing summary, and the annotated
//! price-history chart (Plotters widget) for the selected listing.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Terminal,
};
use tracing::debug;

use crate::app::pipeline::lookup_view;
use crate::domain::{ChartRules, ListingView, UNKNOWN_RULE_MESSAGE};
use crate::error::AppError;
use crate::io::listing::ListingStore;

mod plotters_chart;

use plotters_chart::GougePlottersChart;

/// Start the TUI, optionally preloading a listing.
pub fn run(store: ListingStore, rules: ChartRules, initial_id: Option<String>) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(store, rules, initial_id);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    store: ListingStore,
    rules: ChartRules,
    id_input: String,
    editing_id: bool,
    cursor: usize,
    status: String,
    view: Option<ListingView>,
}

impl App {
    fn new(store: ListingStore, rules: ChartRules, initial_id: Option<String>) -> Self {
        let mut app = Self {
            store,
            rules,
            id_input: initial_id.unwrap_or_default(),
            editing_id: false,
            cursor: 0,
            status: String::new(),
            view: None,
        };
        if app.id_input.trim().is_empty() {
            app.editing_id = true;
            app.status = format!("{} listings loaded. Type an ID and press Enter.", app.store.len());
        } else {
            app.load_current();
        }
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_id {
            self.handle_id_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Enter | KeyCode::Char('/') => {
                self.editing_id = true;
                self.status = "Editing listing ID. Enter to load, Esc to cancel.".to_string();
            }
            KeyCode::Tab | KeyCode::Char('n') => self.step_listing(1),
            KeyCode::BackTab | KeyCode::Char('p') => self.step_listing(-1),
            _ => {}
        }
        false
    }

    fn handle_id_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_id = false;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_id = false;
                self.load_current();
            }
            KeyCode::Backspace => {
                self.id_input.pop();
            }
            KeyCode::Char(c) if !c.is_control() => self.id_input.push(c),
            _ => {}
        }
    }

    /// Cycle through the ids in the store.
    fn step_listing(&mut self, delta: isize) {
        let ids: Vec<String> = self.store.ids().map(str::to_string).collect();
        if ids.is_empty() {
            self.status = "Listing store is empty.".to_string();
            return;
        }
        let n = ids.len() as isize;
        self.cursor = ((self.cursor as isize + delta).rem_euclid(n)) as usize;
        self.id_input = ids[self.cursor].clone();
        self.load_current();
    }

    fn load_current(&mut self) {
        let id = self.id_input.trim().to_string();
        debug!(listing_id = %id, "tui lookup");
        match lookup_view(&self.store, &id, &self.rules) {
            Ok(view) => {
                self.status = format!("Loaded listing {id}.");
                self.view = Some(view);
            }
            Err(err) => {
                self.status = err.to_string();
                self.view = None;
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(10),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_summary(frame, chunks[1]);
        self.draw_chart(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let input_style = if self.editing_id {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let line = Line::from(vec![
            Span::styled("gouge", Style::default().fg(Color::Cyan)),
            Span::raw(" | Listing ID: "),
            Span::styled(&self.id_input, input_style),
            Span::styled(if self.editing_id { "_" } else { "" }, input_style),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_summary(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let body = match &self.view {
            Some(view) => crate::report::format_listing_summary(view, &self.rules),
            None => "No listing loaded.".to_string(),
        };
        let p = Paragraph::new(Text::from(body))
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Listing").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Price History").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(view) = &self.view else {
            let msg = Paragraph::new("Waiting for a listing...").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let Some(chart) = &view.chart else {
            let msg = Paragraph::new(UNKNOWN_RULE_MESSAGE).style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        frame.render_widget(GougePlottersChart { spec: chart }, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Enter edit id  Tab/n next  p prev  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

//! Application state management for the kwdash dashboard
//!
//! This module contains the dashboard state, handling keyboard input,
//! results arriving from the background loader, and the export action.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent};

use crate::data::Query;
use crate::export;
use crate::pipeline::{LoadMessage, PipelineError, QueryReport};

/// Upper bound for table scrolling; the renderer clamps to the real row count
const MAX_SCROLL: u16 = 500;

/// Application state enum representing the current screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Waiting for the first query to finish
    Loading,
    /// Tabs with one query each
    Dashboard,
}

/// Dashboard view shown for the selected query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Overview table, monthly trend and regional interest
    Overview,
    /// Full keyword idea table
    Ideas,
    /// Histogram, competition share, bid scatter and index summary
    Charts,
    /// Derived keyword views
    Insights,
}

impl View {
    pub const ALL: [View; 4] = [View::Overview, View::Ideas, View::Charts, View::Insights];

    pub fn title(&self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Ideas => "Ideas",
            View::Charts => "Charts",
            View::Insights => "Insights",
        }
    }

    fn index(&self) -> usize {
        View::ALL.iter().position(|v| v == self).unwrap_or(0)
    }

    fn next(&self) -> View {
        View::ALL[(self.index() + 1) % View::ALL.len()]
    }

    fn previous(&self) -> View {
        View::ALL[(self.index() + View::ALL.len() - 1) % View::ALL.len()]
    }
}

/// Progress of one query tab
#[derive(Debug, Clone)]
pub enum QuerySlot {
    /// Not started yet
    Pending(Query),
    /// Being fetched or read from cache
    Running(Query),
    Ready(Box<QueryReport>),
    /// Finished without data
    Failed { query: Query, reason: String },
}

impl QuerySlot {
    pub fn query(&self) -> &Query {
        match self {
            QuerySlot::Pending(query) | QuerySlot::Running(query) => query,
            QuerySlot::Ready(report) => &report.query,
            QuerySlot::Failed { query, .. } => query,
        }
    }

    pub fn report(&self) -> Option<&QueryReport> {
        match self {
            QuerySlot::Ready(report) => Some(&**report),
            _ => None,
        }
    }
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/screen
    pub state: AppState,
    /// One slot per query, in input order
    pub slots: Vec<QuerySlot>,
    /// Index of the selected query tab
    pub selected_tab: usize,
    pub view: View,
    /// Scroll offset for table views
    pub scroll_offset: u16,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// One-line message shown in the footer
    pub status: Option<String>,
    /// Whether the loader has processed every query
    pub loading_done: bool,
    /// Target directory for the `e` export action
    export_dir: PathBuf,
}

impl App {
    /// Creates an App with one pending tab per query
    pub fn new(queries: Vec<Query>, export_dir: PathBuf) -> Self {
        Self {
            state: AppState::Loading,
            slots: queries.into_iter().map(QuerySlot::Pending).collect(),
            selected_tab: 0,
            view: View::Overview,
            scroll_offset: 0,
            should_quit: false,
            show_help: false,
            status: None,
            loading_done: false,
            export_dir,
        }
    }

    pub fn selected_slot(&self) -> Option<&QuerySlot> {
        self.slots.get(self.selected_tab)
    }

    pub fn selected_report(&self) -> Option<&QueryReport> {
        self.selected_slot().and_then(QuerySlot::report)
    }

    /// Number of queries that finished, with or without data
    pub fn finished_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, QuerySlot::Ready(_) | QuerySlot::Failed { .. }))
            .count()
    }

    /// Applies a message from the background loader
    pub fn apply(&mut self, message: LoadMessage) {
        match message {
            LoadMessage::Started { index, query } => {
                if let Some(slot) = self.slots.get_mut(index) {
                    *slot = QuerySlot::Running(query);
                }
            }
            LoadMessage::Finished { index, outcome } => {
                let slot = match outcome {
                    Ok(report) => QuerySlot::Ready(Box::new(report)),
                    Err(PipelineError::NoData(query)) => QuerySlot::Failed {
                        reason: format!("No data for {}", query),
                        query,
                    },
                };
                if let Some(existing) = self.slots.get_mut(index) {
                    *existing = slot;
                }
                self.state = AppState::Dashboard;
            }
            LoadMessage::Done => {
                self.loading_done = true;
                self.state = AppState::Dashboard;
                let ready = self.slots.iter().filter(|s| s.report().is_some()).count();
                self.status = Some(format!(
                    "Loaded {} of {} queries",
                    ready,
                    self.slots.len()
                ));
            }
        }
    }

    /// Handles keyboard input and updates application state
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        match self.state {
            AppState::Loading => match key_event.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
            AppState::Dashboard => match key_event.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Tab => {
                    self.next_tab();
                }
                KeyCode::BackTab => {
                    self.previous_tab();
                }
                KeyCode::Right | KeyCode::Char('l') => {
                    self.view = self.view.next();
                    self.scroll_offset = 0;
                }
                KeyCode::Left | KeyCode::Char('h') => {
                    self.view = self.view.previous();
                    self.scroll_offset = 0;
                }
                KeyCode::Char(c @ '1'..='4') => {
                    let index = c as usize - '1' as usize;
                    self.view = View::ALL[index];
                    self.scroll_offset = 0;
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.scroll_down();
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.scroll_up();
                }
                KeyCode::Char('g') => {
                    self.scroll_offset = 0;
                }
                KeyCode::Char('e') => {
                    self.export_selected();
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
        }
    }

    fn next_tab(&mut self) {
        if self.slots.is_empty() {
            return;
        }
        self.selected_tab = (self.selected_tab + 1) % self.slots.len();
        self.scroll_offset = 0;
    }

    fn previous_tab(&mut self) {
        if self.slots.is_empty() {
            return;
        }
        self.selected_tab = if self.selected_tab == 0 {
            self.slots.len() - 1
        } else {
            self.selected_tab - 1
        };
        self.scroll_offset = 0;
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        if self.scroll_offset < MAX_SCROLL {
            self.scroll_offset += 1;
        }
    }

    /// Writes the selected query's raw JSON and table CSVs to the export directory
    pub fn export_selected(&mut self) {
        let Some(report) = self.selected_report() else {
            self.status = Some("Nothing to export for this tab".to_string());
            return;
        };
        let message = match export::export_report(
            &self.export_dir,
            &report.query,
            &report.payload,
            &report.tables,
        ) {
            Ok(files) => format!(
                "Exported {} file(s) to {}",
                files.count(),
                self.export_dir.display()
            ),
            Err(e) => format!("Export failed: {}", e),
        };
        self.status = Some(message);
    }
}

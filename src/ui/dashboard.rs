//! Dashboard screen rendering
//!
//! Renders one tab per query with the selected view: overview, keyword
//! ideas, charts, or the derived keyword views.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs, Wrap},
    Frame,
};

use super::charts::{self, colors, pane};
use super::widgets::TrendSparkline;
use crate::app::{App, QuerySlot, View};
use crate::data::analysis::{self, DerivedView};
use crate::data::{KeywordIdeaRow, KeywordTables};
use crate::pipeline::{PayloadOrigin, QueryReport};
use crate::report::format_number;

/// Renders the dashboard
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Query tabs
            Constraint::Length(1), // View tabs
            Constraint::Min(0),    // Body
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    render_query_tabs(frame, chunks[0], app);
    render_view_tabs(frame, chunks[1], app);

    match app.selected_slot() {
        Some(QuerySlot::Ready(report)) => render_report(frame, chunks[2], app, report),
        Some(QuerySlot::Failed { reason, .. }) => {
            let message = Paragraph::new(reason.as_str())
                .style(Style::default().fg(Color::Red))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(pane("No data"));
            frame.render_widget(message, chunks[2]);
        }
        Some(slot) => {
            let message = Paragraph::new(format!("Loading {}...", slot.query()))
                .style(Style::default().fg(Color::Cyan))
                .alignment(Alignment::Center)
                .block(pane("Loading"));
            frame.render_widget(message, chunks[2]);
        }
        None => {}
    }

    render_footer(frame, chunks[3], app);
}

fn tab_marker(slot: &QuerySlot) -> &'static str {
    match slot {
        QuerySlot::Pending(_) => "·",
        QuerySlot::Running(_) => "…",
        QuerySlot::Ready(_) => "✓",
        QuerySlot::Failed { .. } => "✗",
    }
}

fn render_query_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = app
        .slots
        .iter()
        .map(|slot| Line::from(format!("{} {}", tab_marker(slot), slot.query().label())))
        .collect();

    let source = app
        .selected_slot()
        .map(|slot| slot.query().source.name())
        .unwrap_or_default();

    let tabs = Tabs::new(titles)
        .select(app.selected_tab)
        .block(
            Block::default()
                .title(format!(" kwdash · {} ", source))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors::BORDER)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn render_view_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!("{} {}", i + 1, view.title())))
        .collect();
    let selected = View::ALL.iter().position(|v| *v == app.view).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(colors::MUTED))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, area);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        "Tab query · ←/→ view · ↑/↓ scroll · e export · ? help · q quit",
        Style::default().fg(colors::MUTED),
    )];

    if !app.loading_done {
        spans.push(Span::styled(
            format!("  loading {}/{}", app.finished_count(), app.slots.len()),
            Style::default().fg(Color::Cyan),
        ));
    }
    if let Some(status) = &app.status {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(status.clone(), Style::default().fg(Color::Yellow)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_report(frame: &mut Frame, area: Rect, app: &App, report: &QueryReport) {
    let tables = &report.tables;
    match app.view {
        View::Overview => render_overview(frame, area, report),
        View::Ideas => {
            render_ideas_table(frame, area, "Keyword Ideas", &tables.ideas, app.scroll_offset)
        }
        View::Charts => render_charts(frame, area, tables),
        View::Insights => render_insights(frame, area, &tables.ideas, app.scroll_offset),
    }
}

fn origin_line(report: &QueryReport) -> Line<'static> {
    let origin = match report.origin {
        PayloadOrigin::Cache { cached_at } => {
            format!("cached {}", cached_at.format("%Y-%m-%d %H:%M UTC"))
        }
        PayloadOrigin::Network => "fetched just now".to_string(),
    };
    Line::from(Span::styled(
        format!("{} · {}/{}", origin, report.query.location, report.query.language),
        Style::default().fg(colors::MUTED),
    ))
}

/// Headline numbers: the overview row, or a summary of the ideas
fn headline_lines(tables: &KeywordTables) -> Vec<Line<'static>> {
    let label = |name: &str| Span::styled(format!("{:<20}", name), Style::default().fg(Color::Gray));
    let value = |text: String| Span::styled(text, Style::default().add_modifier(Modifier::BOLD));

    if let Some(row) = tables.overview.first() {
        return vec![
            Line::from(vec![label("Search Volume"), value(format_number(row.search_volume))]),
            Line::from(vec![
                label("Keyword Difficulty"),
                value(format_number(row.keyword_difficulty)),
            ]),
            Line::from(vec![label("High CPC"), value(row.high_cpc.clone())]),
            Line::from(vec![label("Low CPC"), value(row.low_cpc.clone())]),
        ];
    }

    if !tables.ideas.is_empty() {
        let volumes: Vec<f64> = tables.ideas.iter().map(|r| r.volume).collect();
        let total: f64 = volumes.iter().sum();
        let median = analysis::median(&volumes).unwrap_or(0.0);
        let low = analysis::high_volume_low_competition(&tables.ideas).len();
        return vec![
            Line::from(vec![label("Keyword Ideas"), value(tables.ideas.len().to_string())]),
            Line::from(vec![label("Total Volume"), value(format_number(total))]),
            Line::from(vec![label("Median Volume"), value(format_number(median))]),
            Line::from(vec![label("Easy Wins"), value(low.to_string())]),
        ];
    }

    vec![Line::from(Span::styled(
        "No tables could be built from this response",
        Style::default().fg(Color::Red),
    ))]
}

fn render_overview(frame: &mut Frame, area: Rect, report: &QueryReport) {
    let tables = &report.tables;
    let diagnostics = tables.diagnostics.len().min(4) as u16;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),                      // Headline
            Constraint::Min(8),                         // Charts
            Constraint::Length(diagnostics.max(1) + 2), // Notes
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    let mut lines = vec![origin_line(report), Line::from("")];
    lines.extend(headline_lines(tables));
    frame.render_widget(
        Paragraph::new(lines).block(pane(report.query.label())),
        top[0],
    );
    render_trend_sparkline(frame, top[1], tables);

    let charts_row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);
    charts::render_trend_line(frame, charts_row[0], &tables.trend);
    charts::render_regions(frame, charts_row[1], &tables.regional_interest);

    let notes: Vec<Line> = if tables.diagnostics.is_empty() {
        vec![Line::from(Span::styled("No issues", Style::default().fg(colors::MUTED)))]
    } else {
        tables
            .diagnostics
            .iter()
            .map(|d| Line::from(Span::styled(d.clone(), Style::default().fg(Color::Yellow))))
            .collect()
    };
    frame.render_widget(
        Paragraph::new(notes).wrap(Wrap { trim: true }).block(pane("Notes")),
        rows[2],
    );
}

fn render_trend_sparkline(frame: &mut Frame, area: Rect, tables: &KeywordTables) {
    let block = pane("Trend");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (values, caption): (Vec<f64>, String) = if !tables.trend.is_empty() {
        let values = tables.trend.iter().map(|r| r.value).collect();
        let first = tables.trend.first().map(|r| r.label.as_str()).unwrap_or_default();
        let last = tables.trend.last().map(|r| r.label.as_str()).unwrap_or_default();
        (values, format!("monthly searches, {} to {}", first, last))
    } else if !tables.ideas.is_empty() {
        let values = tables.ideas.iter().map(|r| r.trend).collect();
        (values, "trend change per keyword idea".to_string())
    } else {
        (Vec::new(), "no trend data".to_string())
    };

    if inner.height == 0 {
        return;
    }
    let line = Rect { height: 1, ..inner };
    frame.render_widget(TrendSparkline::new(&values), line);

    if inner.height > 2 {
        let caption_area = Rect {
            y: inner.y + 2,
            height: 1,
            ..inner
        };
        frame.render_widget(
            Paragraph::new(Span::styled(caption, Style::default().fg(colors::MUTED))),
            caption_area,
        );
    }
}

fn idea_row(row: &KeywordIdeaRow) -> Row<'static> {
    Row::new(vec![
        Cell::from(row.text.clone()),
        Cell::from(format_number(row.volume)),
        Cell::from(Span::styled(
            row.competition_level.clone(),
            Style::default().fg(charts::level_color(&row.competition_level)),
        )),
        Cell::from(format_number(row.competition_index)),
        Cell::from(format!("{:.2}", row.low_bid)),
        Cell::from(format!("{:.2}", row.high_bid)),
        Cell::from(format!("{:+.2}", row.trend)),
    ])
}

fn render_ideas_table(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    ideas: &[KeywordIdeaRow],
    scroll: u16,
) {
    if ideas.is_empty() {
        let message = Paragraph::new(Span::styled(
            "No keyword ideas",
            Style::default().fg(colors::MUTED),
        ))
        .alignment(Alignment::Center)
        .block(pane(title));
        frame.render_widget(message, area);
        return;
    }

    let start = (scroll as usize).min(ideas.len().saturating_sub(1));
    let header = Row::new(vec![
        "Keyword",
        "Volume",
        "Competition",
        "Index",
        "Low Bid",
        "High Bid",
        "Trend",
    ])
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    let widths = [
        Constraint::Min(20),
        Constraint::Length(9),
        Constraint::Length(11),
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(8),
    ];

    let table = Table::new(ideas[start..].iter().map(idea_row), widths)
        .header(header)
        .block(pane(&format!("{} ({})", title, ideas.len())));
    frame.render_widget(table, area);
}

fn render_charts(frame: &mut Frame, area: Rect, tables: &KeywordTables) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    let volumes: Vec<f64> = tables.ideas.iter().map(|r| r.volume).collect();
    let index: Vec<f64> = tables.ideas.iter().map(|r| r.competition_index).collect();

    let bins = analysis::histogram(&volumes, charts::VOLUME_BINS);
    let shares = analysis::competition_breakdown(&tables.ideas);
    let summary = analysis::box_summary(&index);

    charts::render_histogram(frame, top[0], &bins);
    charts::render_competition_share(frame, top[1], &shares);
    charts::render_bid_scatter(frame, bottom[0], &tables.ideas);
    charts::render_box_summary(frame, bottom[1], summary.as_ref());
}

fn render_insights(frame: &mut Frame, area: Rect, ideas: &[KeywordIdeaRow], scroll: u16) {
    let areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for (view, area) in DerivedView::ALL.iter().zip(areas.iter()) {
        render_ideas_table(frame, *area, view.title(), &view.apply(ideas), scroll);
    }
}

//! Chart panes for the dashboard
//!
//! Each function draws one chart into the given area, or a short placeholder
//! when there is nothing to plot.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, BarChart, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::data::analysis::{BoxSummary, Bin, CompetitionShare};
use crate::data::{KeywordIdeaRow, TrendRow};
use crate::report::format_number;

/// Number of histogram buckets for search volume
pub const VOLUME_BINS: usize = 20;

/// Width of the share bars, in cells
const SHARE_BAR_WIDTH: usize = 24;

pub(crate) mod colors {
    use ratatui::style::Color;

    pub const BORDER: Color = Color::Cyan;
    pub const LINE: Color = Color::Yellow;
    pub const POINT: Color = Color::LightGreen;
    pub const BAR: Color = Color::Blue;
    pub const MUTED: Color = Color::DarkGray;
}

pub(crate) fn pane(title: &str) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::BORDER))
}

fn placeholder(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let paragraph = Paragraph::new(Span::styled(
        message.to_string(),
        Style::default().fg(colors::MUTED),
    ))
    .alignment(Alignment::Center)
    .block(pane(title));
    frame.render_widget(paragraph, area);
}

/// Axis bounds padded so points never sit on the border
fn bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() {
        return [0.0, 1.0];
    }
    if min == max {
        return [min - 1.0, max + 1.0];
    }
    let pad = (max - min) * 0.05;
    [min - pad, max + pad]
}

fn axis_labels(bounds: [f64; 2]) -> Vec<Span<'static>> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    [bounds[0], mid, bounds[1]]
        .iter()
        .map(|v| {
            Span::styled(
                format_number((v * 100.0).round() / 100.0),
                Style::default().fg(colors::MUTED),
            )
        })
        .collect()
}

/// Monthly searches as a line chart
pub fn render_trend_line(frame: &mut Frame, area: Rect, rows: &[TrendRow]) {
    let title = "Monthly Searches";
    if rows.is_empty() {
        placeholder(frame, area, title, "No monthly data");
        return;
    }

    let points: Vec<(f64, f64)> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| (i as f64, row.value))
        .collect();
    let y_bounds = bounds(rows.iter().map(|r| r.value));
    let x_max = (rows.len().saturating_sub(1)).max(1) as f64;

    let first = rows.first().map(|r| r.label.clone()).unwrap_or_default();
    let last = rows.last().map(|r| r.label.clone()).unwrap_or_default();

    let dataset = Dataset::default()
        .name("searches")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(colors::LINE))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(pane(title))
        .x_axis(
            Axis::default()
                .bounds([0.0, x_max])
                .labels(vec![Span::raw(first), Span::raw(last)]),
        )
        .y_axis(Axis::default().bounds(y_bounds).labels(axis_labels(y_bounds)));

    frame.render_widget(chart, area);
}

/// Labelled bar chart; values are rounded to whole numbers
pub fn render_bars(frame: &mut Frame, area: Rect, title: &str, bars: &[(String, f64)]) {
    if bars.is_empty() {
        placeholder(frame, area, title, "No data");
        return;
    }

    let data: Vec<(&str, u64)> = bars
        .iter()
        .map(|(label, value)| (label.as_str(), value.max(0.0).round() as u64))
        .collect();

    // Fit every bar in the inner width when possible
    let inner = area.width.saturating_sub(2) as usize;
    let bar_width = (inner / bars.len().max(1)).saturating_sub(1).clamp(1, 9) as u16;

    let chart = BarChart::default()
        .block(pane(title))
        .data(data.as_slice())
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(colors::BAR))
        .value_style(Style::default().fg(Color::White).bg(colors::BAR));

    frame.render_widget(chart, area);
}

/// Regional interest as bars
pub fn render_regions(frame: &mut Frame, area: Rect, rows: &[TrendRow]) {
    let bars: Vec<(String, f64)> = rows.iter().map(|r| (r.label.clone(), r.value)).collect();
    render_bars(frame, area, "Interest by Region", &bars);
}

/// Search volume distribution
pub fn render_histogram(frame: &mut Frame, area: Rect, bins: &[Bin]) {
    let bars: Vec<(String, f64)> = bins
        .iter()
        .map(|bin| (format_number(bin.start.round()), bin.count as f64))
        .collect();
    render_bars(frame, area, "Search Volume Distribution", &bars);
}

/// Volume-weighted share of each competition level
pub fn render_competition_share(frame: &mut Frame, area: Rect, shares: &[CompetitionShare]) {
    let title = "Competition Level Share";
    if shares.is_empty() {
        placeholder(frame, area, title, "No keyword ideas");
        return;
    }

    let lines: Vec<Line> = shares
        .iter()
        .map(|share| {
            let filled = ((share.share * SHARE_BAR_WIDTH as f64).round() as usize).min(SHARE_BAR_WIDTH);
            Line::from(vec![
                Span::styled(
                    format!("{:<8}", share.level),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    "█".repeat(filled),
                    Style::default().fg(level_color(&share.level)),
                ),
                Span::styled(
                    "░".repeat(SHARE_BAR_WIDTH - filled),
                    Style::default().fg(colors::MUTED),
                ),
                Span::raw(format!(" {:>5.1}%", share.share * 100.0)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(pane(title)), area);
}

/// Color for a competition bucket
pub fn level_color(level: &str) -> Color {
    match level.to_ascii_uppercase().as_str() {
        "LOW" => Color::Green,
        "MEDIUM" => Color::Yellow,
        "HIGH" => Color::Red,
        _ => Color::Gray,
    }
}

/// Low bid against high bid for every idea
pub fn render_bid_scatter(frame: &mut Frame, area: Rect, ideas: &[KeywordIdeaRow]) {
    let title = "Low vs High Bid";
    if ideas.is_empty() {
        placeholder(frame, area, title, "No keyword ideas");
        return;
    }

    let points: Vec<(f64, f64)> = ideas.iter().map(|r| (r.low_bid, r.high_bid)).collect();
    let x_bounds = bounds(ideas.iter().map(|r| r.low_bid));
    let y_bounds = bounds(ideas.iter().map(|r| r.high_bid));

    let dataset = Dataset::default()
        .marker(symbols::Marker::Dot)
        .graph_type(GraphType::Scatter)
        .style(Style::default().fg(colors::POINT))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(pane(title))
        .x_axis(
            Axis::default()
                .title("low bid")
                .bounds(x_bounds)
                .labels(axis_labels(x_bounds)),
        )
        .y_axis(
            Axis::default()
                .title("high bid")
                .bounds(y_bounds)
                .labels(axis_labels(y_bounds)),
        );

    frame.render_widget(chart, area);
}

/// Draws a one-line box plot of `summary` scaled to `width` cells
pub fn box_plot_line(summary: &BoxSummary, width: usize) -> String {
    if width < 5 {
        return String::new();
    }
    let span = summary.max - summary.min;
    let position = |v: f64| -> usize {
        if span <= 0.0 {
            width / 2
        } else {
            (((v - summary.min) / span) * (width - 1) as f64).round() as usize
        }
    };

    let (q1, median, q3) = (position(summary.q1), position(summary.median), position(summary.q3));
    (0..width)
        .map(|i| {
            if i == median {
                '┃'
            } else if i == 0 {
                '├'
            } else if i == width - 1 {
                '┤'
            } else if i == q1 {
                '['
            } else if i == q3 {
                ']'
            } else if i > q1 && i < q3 {
                '═'
            } else {
                '─'
            }
        })
        .collect()
}

/// Five-number summary of the competition index
pub fn render_box_summary(frame: &mut Frame, area: Rect, summary: Option<&BoxSummary>) {
    let title = "Competition Index";
    let Some(summary) = summary else {
        placeholder(frame, area, title, "No keyword ideas");
        return;
    };

    let plot_width = area.width.saturating_sub(4) as usize;
    let lines = vec![
        Line::from(Span::styled(
            box_plot_line(summary, plot_width),
            Style::default().fg(colors::LINE),
        )),
        Line::from(""),
        Line::from(format!(
            "min {}  q1 {}  median {}  q3 {}  max {}",
            format_number(summary.min),
            format_number(summary.q1),
            format_number(summary.median),
            format_number(summary.q3),
            format_number(summary.max)
        )),
        Line::from(Span::styled(
            format!("{} outlier(s)", summary.outliers),
            Style::default().fg(colors::MUTED),
        )),
    ];

    frame.render_widget(Paragraph::new(lines).block(pane(title)), area);
}

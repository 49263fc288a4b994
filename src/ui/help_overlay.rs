//! Help overlay listing the dashboard key bindings

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const OVERLAY_WIDTH: u16 = 56;

/// Key bindings grouped by section, in display order
const BINDINGS: &[(&str, &[(&str, &str)])] = &[
    (
        "Queries",
        &[("Tab", "Next query tab"), ("Shift+Tab", "Previous query tab")],
    ),
    (
        "Views",
        &[
            ("←/h, →/l", "Previous/next view"),
            ("1-4", "Overview, Ideas, Charts, Insights"),
            ("↑/k, ↓/j", "Scroll tables"),
            ("g", "Back to top"),
        ],
    ),
    (
        "Other",
        &[
            ("e", "Export JSON and CSV tables"),
            ("?", "Toggle this help"),
            ("q, Esc", "Quit"),
        ],
    ),
];

fn help_lines() -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (section, keys) in BINDINGS {
        lines.push(Line::from(Span::styled(
            *section,
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for (key, action) in keys.iter() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<12}", key), Style::default().fg(Color::Yellow)),
                Span::raw(*action),
            ]));
        }
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "Press Esc or ? to close",
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

/// Renders the help overlay on top of the current view
pub fn render(frame: &mut Frame) {
    let lines = help_lines();
    // Content plus borders
    let height = lines.len() as u16 + 2;
    let area = centered_rect(OVERLAY_WIDTH, height, frame.area());

    frame.render_widget(Clear, area);

    let paragraph = Paragraph::new(lines).alignment(Alignment::Left).block(
        Block::default()
            .title(" Keys ")
            .title_style(Style::default().add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(paragraph, area);
}

/// A `width` x `height` rect centred in `area`, clamped to fit
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

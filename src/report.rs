//! Plain-text report for `--plain` mode
//!
//! Renders the same tables and derived views as the dashboard, as aligned
//! text suitable for piping or logging.

use std::fmt::Write as _;

use crate::data::analysis::{self, DerivedView};
use crate::data::{KeywordIdeaRow, KeywordOverviewRow, KeywordTables, TrendRow};
use crate::pipeline::{PayloadOrigin, QueryOutcome, QueryReport};

/// Most rows printed for a derived view
const VIEW_ROW_LIMIT: usize = 10;

/// A column-aligned text table
struct TextTable {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    fn new(headers: Vec<&'static str>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn render(&self, out: &mut String) {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        write_line(out, &self.headers, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_line(out, &rule, &widths);
        for row in &self.rows {
            write_line(out, row, &widths);
        }
    }
}

fn write_line<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize]) {
    let mut text = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            text.push_str("  ");
        }
        let _ = write!(text, "{:<width$}", cell.as_ref(), width = width);
    }
    out.push_str(text.trim_end());
    out.push('\n');
}

/// Formats a metric without a trailing `.0` for whole numbers
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", title);
    let _ = writeln!(out, "{}", "~".repeat(title.chars().count()));
}

fn overview_table(out: &mut String, rows: &[KeywordOverviewRow]) {
    let mut table = TextTable::new(vec!["Search Volume", "Keyword Difficulty", "High CPC", "Low CPC"]);
    for row in rows {
        table.push(vec![
            format_number(row.search_volume),
            format_number(row.keyword_difficulty),
            row.high_cpc.clone(),
            row.low_cpc.clone(),
        ]);
    }
    table.render(out);
}

fn labelled_table(out: &mut String, headers: Vec<&'static str>, rows: &[TrendRow]) {
    let mut table = TextTable::new(headers);
    for row in rows {
        table.push(vec![row.label.clone(), format_number(row.value)]);
    }
    table.render(out);
}

fn ideas_table(out: &mut String, rows: &[KeywordIdeaRow]) {
    let mut table = TextTable::new(vec![
        "Keyword",
        "Volume",
        "Competition",
        "Index",
        "Low Bid",
        "High Bid",
        "Trend",
    ]);
    for row in rows {
        table.push(vec![
            row.text.clone(),
            format_number(row.volume),
            row.competition_level.clone(),
            format_number(row.competition_index),
            format!("{:.2}", row.low_bid),
            format!("{:.2}", row.high_bid),
            format!("{:+.2}", row.trend),
        ]);
    }
    table.render(out);
}

fn ideas_summary(out: &mut String, rows: &[KeywordIdeaRow]) {
    let shares = analysis::competition_breakdown(rows);
    if !shares.is_empty() {
        section(out, "Competition Level Share (by volume)");
        for share in shares {
            let _ = writeln!(
                out,
                "{:<8} {:>6.1}%  ({})",
                share.level,
                share.share * 100.0,
                format_number(share.volume)
            );
        }
    }

    let index: Vec<f64> = rows.iter().map(|r| r.competition_index).collect();
    if let Some(summary) = analysis::box_summary(&index) {
        section(out, "Competition Index");
        let _ = writeln!(
            out,
            "min {}  q1 {}  median {}  q3 {}  max {}  outliers {}",
            format_number(summary.min),
            format_number(summary.q1),
            format_number(summary.median),
            format_number(summary.q3),
            format_number(summary.max),
            summary.outliers
        );
    }

    for view in DerivedView::ALL {
        let matches = view.apply(rows);
        section(out, view.title());
        if matches.is_empty() {
            out.push_str("(none)\n");
            continue;
        }
        let shown = matches.len().min(VIEW_ROW_LIMIT);
        ideas_table(out, &matches[..shown]);
        if matches.len() > shown {
            let _ = writeln!(out, "... and {} more", matches.len() - shown);
        }
    }
}

/// Renders the tables of one query
pub fn render_tables(out: &mut String, tables: &KeywordTables) {
    if !tables.overview.is_empty() {
        section(out, "Keyword Overview");
        overview_table(out, &tables.overview);
    }
    if !tables.trend.is_empty() {
        section(out, "Monthly Search Trend");
        labelled_table(out, vec!["Month", "Searches"], &tables.trend);
    }
    if !tables.regional_interest.is_empty() {
        section(out, "Interest by Region");
        labelled_table(out, vec!["Region", "Interest"], &tables.regional_interest);
    }
    if !tables.ideas.is_empty() {
        section(out, "Keyword Ideas");
        ideas_table(out, &tables.ideas);
        ideas_summary(out, &tables.ideas);
    }
    if tables.is_empty() {
        out.push_str("\nNo tables could be built from this response.\n");
    }
    if !tables.diagnostics.is_empty() {
        section(out, "Notes");
        for diagnostic in &tables.diagnostics {
            let _ = writeln!(out, "- {}", diagnostic);
        }
    }
}

fn render_query(out: &mut String, report: &QueryReport) {
    let heading = format!("== {} ==", report.query);
    let _ = writeln!(out, "{}", heading);
    match report.origin {
        PayloadOrigin::Cache { cached_at } => {
            let _ = writeln!(out, "(cached {})", cached_at.format("%Y-%m-%d %H:%M UTC"));
        }
        PayloadOrigin::Network => out.push_str("(fetched)\n"),
    }
    if let Some(files) = &report.exported {
        let _ = writeln!(out, "JSON exported to {}", files.json.display());
        for path in &files.tables {
            let _ = writeln!(out, "CSV exported to {}", path.display());
        }
    }
    render_tables(out, &report.tables);
}

/// Renders a full report for every outcome, in order
pub fn render(outcomes: &[QueryOutcome]) -> String {
    let mut out = String::new();
    for (i, outcome) in outcomes.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        match outcome {
            Ok(report) => render_query(&mut out, report),
            Err(e) => {
                let _ = writeln!(out, "{}", e);
            }
        }
    }
    out
}

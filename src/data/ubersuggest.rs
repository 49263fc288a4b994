//! Normalizer for Ubersuggest keyword overview payloads
//!
//! The service answers with a list whose first element carries a
//! `"Keyword Overview"` list. Regional interest, when the service includes it,
//! sits under `"Google Trends Data"."Interest Google Trends Data"` in one of
//! the list elements.

use serde_json::{Map, Value};

use super::field::{self, type_name, Field};
use super::{KeywordOverviewRow, KeywordTables, RawPayload, TrendRow};

const OVERVIEW_KEY: &str = "Keyword Overview";
const GOOGLE_TRENDS_KEY: &str = "Google Trends Data";
const INTEREST_KEY: &str = "Interest Google Trends Data";

/// Placeholder for CPC values the service did not report
pub const NOT_AVAILABLE: &str = "N/A";

/// Converts an Ubersuggest payload into overview, trend and regional tables
///
/// Never fails: unexpected shapes produce empty tables and a diagnostic, and
/// missing fields fall back to 0 / "N/A" with a diagnostic naming the field.
pub fn normalize(payload: &RawPayload, label: &str) -> KeywordTables {
    let items = match payload.value() {
        Value::Array(items) if !items.is_empty() => items,
        Value::Array(_) => {
            return KeywordTables::with_diagnostic(format!(
                "No data returned for '{}': the payload is an empty list",
                label
            ))
        }
        other => {
            return KeywordTables::with_diagnostic(format!(
                "Unexpected payload for '{}': expected a list, found {}",
                label,
                type_name(other)
            ))
        }
    };

    let mut tables = KeywordTables::default();

    match items[0].as_object() {
        Some(first) => normalize_overview(first, label, &mut tables),
        None => tables.diagnostics.push(format!(
            "Unexpected payload for '{}': first list element is {}, not an object",
            label,
            type_name(&items[0])
        )),
    }

    normalize_regional_interest(items, label, &mut tables);

    tables
}

fn normalize_overview(first: &Map<String, Value>, label: &str, tables: &mut KeywordTables) {
    let rows = match field::array(first, OVERVIEW_KEY) {
        Field::Present(rows) if !rows.is_empty() => rows,
        Field::Present(_) => {
            tables.diagnostics.push(format!(
                "No keyword overview data available for '{}'",
                label
            ));
            return;
        }
        other => {
            tables.diagnostics.push(format!(
                "No keyword overview data available for '{}' ({} is {})",
                label,
                OVERVIEW_KEY,
                other.problem().unwrap_or_default()
            ));
            return;
        }
    };

    // Only the first overview entry describes the requested keyword
    let Some(overview) = rows[0].as_object() else {
        tables.diagnostics.push(format!(
            "Keyword overview for '{}' is {}, not an object",
            label,
            type_name(&rows[0])
        ));
        return;
    };

    let mut note = |key: &str, problem: Option<String>, default: &str| {
        if let Some(problem) = problem {
            tables.diagnostics.push(format!(
                "'{}' for '{}' is {}; using {}",
                key, label, problem, default
            ));
        }
    };

    let search_volume = field::number(overview, "Search Volume");
    note("Search Volume", search_volume.problem(), "0");
    let keyword_difficulty = field::number(overview, "Keyword Difficulty");
    note("Keyword Difficulty", keyword_difficulty.problem(), "0");
    let high_cpc = field::text(overview, "High CPC");
    note("High CPC", high_cpc.problem(), NOT_AVAILABLE);
    let low_cpc = field::text(overview, "Low CPC");
    note("Low CPC", low_cpc.problem(), NOT_AVAILABLE);

    tables.overview.push(KeywordOverviewRow {
        search_volume: search_volume.or(0.0),
        keyword_difficulty: keyword_difficulty.or(0.0),
        high_cpc: high_cpc.or(NOT_AVAILABLE.to_string()),
        low_cpc: low_cpc.or(NOT_AVAILABLE.to_string()),
    });

    match field::array(overview, "Trend") {
        Field::Present(points) => {
            let (rows, skipped) = labelled_rows(points, "month", "searches");
            tables.trend = rows;
            if skipped > 0 {
                tables.diagnostics.push(format!(
                    "Skipped {} trend point(s) for '{}' without month/searches",
                    skipped, label
                ));
            }
        }
        other => tables.diagnostics.push(format!(
            "Trend for '{}' is {}; no monthly data",
            label,
            other.problem().unwrap_or_default()
        )),
    }
}

fn normalize_regional_interest(items: &[Value], label: &str, tables: &mut KeywordTables) {
    // Older responses put the trends block in the second element, so search them all
    let Some(trends) = items
        .iter()
        .filter_map(Value::as_object)
        .find_map(|item| field::object(item, GOOGLE_TRENDS_KEY).into_option())
    else {
        return;
    };

    match field::array(trends, INTEREST_KEY) {
        Field::Present(points) => {
            let (rows, skipped) = labelled_rows(points, "region", "interest");
            tables.regional_interest = rows;
            if skipped > 0 {
                tables.diagnostics.push(format!(
                    "Skipped {} regional interest row(s) for '{}' without region/interest",
                    skipped, label
                ));
            }
        }
        other => tables.diagnostics.push(format!(
            "Regional interest for '{}' is {}",
            label,
            other.problem().unwrap_or_default()
        )),
    }
}

/// Builds label/value rows, returning them with the number of unusable entries
fn labelled_rows(points: &[Value], label_key: &str, value_key: &str) -> (Vec<TrendRow>, usize) {
    let mut rows = Vec::with_capacity(points.len());
    let mut skipped = 0;

    for point in points {
        let row = point.as_object().and_then(|p| {
            let label = field::text(p, label_key).into_option()?;
            let value = field::number(p, value_key).into_option()?;
            Some(TrendRow { label, value })
        });
        match row {
            Some(row) => rows.push(row),
            None => skipped += 1,
        }
    }

    (rows, skipped)
}

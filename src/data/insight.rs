//! Normalizer for Google Keyword Insight suggestion payloads
//!
//! Both the keyword and the URL endpoints answer with a flat list of keyword
//! ideas. Errors come back as a JSON object, usually with a `message` field.

use serde_json::{Map, Value};

use super::field::{self, type_name, Field};
use super::{KeywordIdeaRow, KeywordTables, RawPayload};

/// Converts an Insight payload into the keyword idea table
pub fn normalize(payload: &RawPayload, label: &str) -> KeywordTables {
    let items = match payload.value() {
        Value::Array(items) => items,
        Value::Object(envelope) => {
            let reason = field::text(envelope, "message")
                .into_option()
                .or_else(|| field::text(envelope, "error").into_option());
            let message = match reason {
                Some(reason) => format!("Service returned no keyword ideas for '{}': {}", label, reason),
                None => format!(
                    "Unexpected payload for '{}': expected a list, found object",
                    label
                ),
            };
            return KeywordTables::with_diagnostic(message);
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
    if items.is_empty() {
        tables
            .diagnostics
            .push(format!("No keyword ideas returned for '{}'", label));
        return tables;
    }

    let mut not_objects = 0;
    // (field, count) of defaulted fields, in first-seen order
    let mut defaulted: Vec<(&'static str, usize)> = Vec::new();

    for item in items {
        let Some(object) = item.as_object() else {
            not_objects += 1;
            continue;
        };
        let (row, missing) = idea_row(object);
        for key in missing {
            match defaulted.iter_mut().find(|(k, _)| *k == key) {
                Some((_, count)) => *count += 1,
                None => defaulted.push((key, 1)),
            }
        }
        tables.ideas.push(row);
    }

    if not_objects > 0 {
        tables.diagnostics.push(format!(
            "Skipped {} keyword idea(s) for '{}' that were not objects",
            not_objects, label
        ));
    }
    for (key, count) in defaulted {
        tables.diagnostics.push(format!(
            "'{}' missing or unusable in {} of {} keyword idea(s) for '{}'; using default",
            key,
            count,
            items.len(),
            label
        ));
    }

    tables
}

/// Extracts one idea row, returning it with the names of defaulted fields
fn idea_row(object: &Map<String, Value>) -> (KeywordIdeaRow, Vec<&'static str>) {
    let mut missing = Vec::new();

    let mut number = |key: &'static str| match field::number(object, key) {
        Field::Present(value) => value,
        _ => {
            missing.push(key);
            0.0
        }
    };
    let volume = number("volume");
    let competition_index = number("competition_index");
    let low_bid = number("low_bid");
    let high_bid = number("high_bid");
    let trend = number("trend");

    let mut text = |key: &'static str, default: &str| match field::text(object, key) {
        Field::Present(value) => value,
        _ => {
            missing.push(key);
            default.to_string()
        }
    };
    let keyword = text("text", "");
    let competition_level = text("competition_level", "N/A");

    (
        KeywordIdeaRow {
            text: keyword,
            volume,
            competition_level,
            competition_index,
            low_bid,
            high_bid,
            trend,
        },
        missing,
    )
}

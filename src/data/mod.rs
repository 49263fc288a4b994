//! Core data models for kwdash
//!
//! This module contains the query and table types shared by the fetcher,
//! the cache, the normalizers and the presenters.

pub mod analysis;
pub mod client;
pub mod field;
pub mod insight;
pub mod ubersuggest;

pub use client::{FetchError, KeywordClient};
pub use field::Field;

use std::fmt;

use serde::{Deserialize, Serialize};

/// The remote keyword service a query is sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Ubersuggest keyword overview (single keyword, trend and regional interest)
    Ubersuggest,
    /// Google Keyword Insight suggestions (keyword ideas by keyword or by URL)
    Insight,
}

impl Source {
    /// Parses a source name as given on the command line
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ubersuggest" | "uber" => Some(Source::Ubersuggest),
            "insight" | "google" | "google-keyword-insight" => Some(Source::Insight),
            _ => None,
        }
    }

    /// Stable short name, used in cache keys and file names
    pub fn name(&self) -> &'static str {
        match self {
            Source::Ubersuggest => "ubersuggest",
            Source::Insight => "insight",
        }
    }

    /// RapidAPI host of the service
    pub fn host(&self) -> &'static str {
        match self {
            Source::Ubersuggest => "ubersuggest-keyword-ideas.p.rapidapi.com",
            Source::Insight => "google-keyword-insight1.p.rapidapi.com",
        }
    }

    /// Whether the source can look up keywords for a URL
    pub fn supports_url(&self) -> bool {
        matches!(self, Source::Insight)
    }

    /// Path and query parameters for a lookup of `query` against this source
    ///
    /// Returns `None` when the source does not support the query's subject kind.
    pub fn request(&self, query: &Query) -> Option<(&'static str, Vec<(&'static str, String)>)> {
        match (self, &query.subject) {
            (Source::Ubersuggest, Subject::Keyword(keyword)) => Some((
                "/keyword-Overview-Data",
                vec![
                    ("keyword", keyword.clone()),
                    ("country", query.location.clone()),
                ],
            )),
            (Source::Ubersuggest, Subject::Url(_)) => None,
            (Source::Insight, Subject::Keyword(keyword)) => Some((
                "/keysuggest/",
                vec![
                    ("keyword", keyword.clone()),
                    ("location", query.location.clone()),
                    ("lang", query.language.clone()),
                ],
            )),
            (Source::Insight, Subject::Url(url)) => Some((
                "/urlkeysuggest/",
                vec![
                    ("url", url.clone()),
                    ("location", query.location.clone()),
                    ("lang", query.language.clone()),
                ],
            )),
        }
    }

    /// Converts a payload from this source into tables
    pub fn normalize(&self, payload: &RawPayload, label: &str) -> KeywordTables {
        match self {
            Source::Ubersuggest => ubersuggest::normalize(payload, label),
            Source::Insight => insight::normalize(payload, label),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a query looks up: a keyword or a page URL
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Subject {
    Keyword(String),
    Url(String),
}

impl Subject {
    /// The raw subject text
    pub fn text(&self) -> &str {
        match self {
            Subject::Keyword(s) | Subject::Url(s) => s,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Subject::Keyword(_) => "keyword",
            Subject::Url(_) => "url",
        }
    }
}

/// One lookup against a keyword service
///
/// The full tuple is the query's identity and the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    /// Service the query is sent to
    pub source: Source,
    /// Keyword or URL being researched
    pub subject: Subject,
    /// Country/location code (e.g. "in", "us")
    pub location: String,
    /// Language code (e.g. "en")
    pub language: String,
}

impl Query {
    pub fn keyword(
        source: Source,
        keyword: impl Into<String>,
        location: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            source,
            subject: Subject::Keyword(keyword.into()),
            location: location.into(),
            language: language.into(),
        }
    }

    pub fn url(
        source: Source,
        url: impl Into<String>,
        location: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            source,
            subject: Subject::Url(url.into()),
            location: location.into(),
            language: language.into(),
        }
    }

    /// Human-readable label used for headings and diagnostics
    pub fn label(&self) -> &str {
        self.subject.text()
    }

    /// Returns the name of the first empty field, if any
    pub fn first_empty_field(&self) -> Option<&'static str> {
        if self.subject.text().trim().is_empty() {
            Some(self.subject.kind())
        } else if self.location.trim().is_empty() {
            Some("location")
        } else if self.language.trim().is_empty() {
            Some("language")
        } else {
            None
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} '{}' ({}/{})",
            self.source,
            self.subject.kind(),
            self.subject.text(),
            self.location,
            self.language
        )
    }
}

/// Unvalidated JSON returned by a keyword service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPayload(pub serde_json::Value);

impl RawPayload {
    pub fn value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Pretty-printed JSON, as offered for download
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }
}

impl From<serde_json::Value> for RawPayload {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Headline metrics for a single keyword
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordOverviewRow {
    pub search_volume: f64,
    pub keyword_difficulty: f64,
    pub high_cpc: String,
    pub low_cpc: String,
}

/// A labelled metric value: monthly searches or regional interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRow {
    /// Month or region name
    pub label: String,
    pub value: f64,
}

/// A suggested keyword with bid and competition metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordIdeaRow {
    pub text: String,
    pub volume: f64,
    /// Competition bucket reported by the service ("LOW", "MEDIUM", "HIGH")
    pub competition_level: String,
    pub competition_index: f64,
    pub low_bid: f64,
    pub high_bid: f64,
    pub trend: f64,
}

/// Normalized tables for one query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordTables {
    pub overview: Vec<KeywordOverviewRow>,
    /// Monthly search counts
    pub trend: Vec<TrendRow>,
    /// Interest by region
    pub regional_interest: Vec<TrendRow>,
    pub ideas: Vec<KeywordIdeaRow>,
    /// Messages about missing fields or unexpected payload shapes
    pub diagnostics: Vec<String>,
}

impl KeywordTables {
    /// Empty tables carrying a single diagnostic
    pub fn with_diagnostic(message: impl Into<String>) -> Self {
        Self {
            diagnostics: vec![message.into()],
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.overview.is_empty()
            && self.trend.is_empty()
            && self.regional_interest.is_empty()
            && self.ideas.is_empty()
    }
}

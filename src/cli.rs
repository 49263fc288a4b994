//! Command-line interface parsing for kwdash
//!
//! This module parses CLI arguments using clap and validates them into the
//! `StartupConfig` that the rest of the application is built from.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use secrecy::SecretString;
use thiserror::Error;

use crate::cache::{CacheManager, CachePolicy};
use crate::data::{Query, Source};

/// Cache directory used when no XDG cache directory can be determined
const FALLBACK_CACHE_DIR: &str = "data";

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified source name is not recognized
    #[error("Invalid source: '{0}'. Valid sources: insight, ubersuggest")]
    InvalidSource(String),

    /// The keyword list contained nothing but separators and whitespace
    #[error("No keywords given. Pass a comma-separated list, e.g. \"python, seo\"")]
    NoKeywords,

    /// URL mode was requested for a source that cannot do it
    #[error("Source '{0}' does not support --url lookups; use --source insight")]
    UrlNotSupported(Source),

    /// A required text argument was blank
    #[error("--{0} must not be empty")]
    EmptyArgument(&'static str),

    /// A zero timeout would fail every request
    #[error("--timeout-secs must be greater than zero")]
    ZeroTimeout,

    /// A zero max age would expire every entry as soon as it is written
    #[error("--max-age-hours must be greater than zero; use --refresh to skip the cache")]
    ZeroMaxAge,
}

/// kwdash - Keyword research dashboard for RapidAPI keyword services
#[derive(Parser, Debug)]
#[command(name = "kwdash")]
#[command(about = "Keyword research dashboard with an on-disk response cache")]
#[command(version)]
pub struct Cli {
    /// Comma-separated keywords to research
    ///
    /// Examples:
    ///   kwdash "python, seo, data science"
    ///   kwdash --source ubersuggest rust
    #[arg(value_name = "KEYWORDS", default_value = "Python, SEO, Data Science")]
    pub keywords: String,

    /// Research keyword ideas for a page URL instead of keywords (insight only)
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Keyword service to query: insight or ubersuggest
    #[arg(long, default_value = "insight")]
    pub source: String,

    /// Country/location code (e.g. 'in' for India, 'us' for USA)
    #[arg(long, short = 'l', default_value = "in")]
    pub location: String,

    /// Language code
    #[arg(long, default_value = "en")]
    pub lang: String,

    /// RapidAPI key
    #[arg(long, env = "RAPIDAPI_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Directory for cached responses [default: XDG cache dir]
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Ignore cached responses older than this many hours [default: never expire]
    #[arg(long, value_name = "HOURS")]
    pub max_age_hours: Option<u64>,

    /// Skip cache lookups and fetch fresh data (responses are still cached)
    #[arg(long)]
    pub refresh: bool,

    /// HTTP request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Write each raw JSON response and its tables as CSV to this directory
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Print a plain-text report instead of opening the dashboard
    #[arg(long)]
    pub plain: bool,
}

/// How results are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Interactive terminal dashboard
    #[default]
    Dashboard,
    /// Plain-text report on stdout
    Plain,
}

/// Validated configuration derived from CLI arguments for application startup
#[derive(Debug)]
pub struct StartupConfig {
    /// Service every query is sent to
    pub source: Source,
    /// Queries to run, in order
    pub queries: Vec<Query>,
    /// RapidAPI credential (may be absent when only cached data is wanted)
    pub api_key: Option<SecretString>,
    /// Root directory of the payload cache
    pub cache_dir: PathBuf,
    pub cache_policy: CachePolicy,
    /// Whether to bypass cache lookups
    pub refresh: bool,
    pub timeout: Duration,
    /// Where raw payloads and table CSVs are exported, if anywhere
    pub export_dir: Option<PathBuf>,
    pub output: OutputMode,
}

/// Parses a source string argument into a Source enum.
pub fn parse_source_arg(s: &str) -> Result<Source, CliError> {
    Source::from_str(s).ok_or_else(|| CliError::InvalidSource(s.to_string()))
}

/// Splits a comma-separated keyword list, trimming items and dropping blanks
pub fn parse_keywords(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(value: &str, name: &'static str) -> Result<String, CliError> {
    let value = value.trim();
    if value.is_empty() {
        Err(CliError::EmptyArgument(name))
    } else {
        Ok(value.to_string())
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with one query per keyword (or the single URL)
    /// * `Err(CliError)` if any argument is invalid
    pub fn from_cli(cli: Cli) -> Result<Self, CliError> {
        let source = parse_source_arg(&cli.source)?;
        let location = non_empty(&cli.location, "location")?;
        let language = non_empty(&cli.lang, "lang")?;

        let queries = match &cli.url {
            Some(url) => {
                if !source.supports_url() {
                    return Err(CliError::UrlNotSupported(source));
                }
                let url = non_empty(url, "url")?;
                vec![Query::url(source, url, location, language)]
            }
            None => {
                let keywords = parse_keywords(&cli.keywords);
                if keywords.is_empty() {
                    return Err(CliError::NoKeywords);
                }
                keywords
                    .into_iter()
                    .map(|k| Query::keyword(source, k, location.clone(), language.clone()))
                    .collect()
            }
        };

        if cli.timeout_secs == 0 {
            return Err(CliError::ZeroTimeout);
        }
        if cli.max_age_hours == Some(0) {
            return Err(CliError::ZeroMaxAge);
        }

        let api_key = cli
            .api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .map(SecretString::from);

        let cache_dir = cli.cache_dir.unwrap_or_else(|| {
            CacheManager::new()
                .map(|cache| cache.cache_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(FALLBACK_CACHE_DIR))
        });

        let cache_policy = cli
            .max_age_hours
            .map(CachePolicy::max_age_hours)
            .unwrap_or_default();

        Ok(StartupConfig {
            source,
            queries,
            api_key,
            cache_dir,
            cache_policy,
            refresh: cli.refresh,
            timeout: Duration::from_secs(cli.timeout_secs),
            export_dir: cli.export_dir,
            output: if cli.plain {
                OutputMode::Plain
            } else {
                OutputMode::Dashboard
            },
        })
    }

    /// Builds the cache manager for this configuration
    pub fn cache(&self) -> CacheManager {
        CacheManager::with_dir(self.cache_dir.clone()).with_policy(self.cache_policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Subject;
    use secrecy::ExposeSecret;

    fn config(args: &[&str]) -> Result<StartupConfig, CliError> {
        let mut argv = vec!["kwdash"];
        argv.extend_from_slice(args);
        StartupConfig::from_cli(Cli::parse_from(argv))
    }

    #[test]
    fn test_parse_source_arg() {
        assert_eq!(parse_source_arg("insight").unwrap(), Source::Insight);
        assert_eq!(parse_source_arg("ubersuggest").unwrap(), Source::Ubersuggest);
    }

    #[test]
    fn test_parse_source_arg_invalid() {
        let err = parse_source_arg("bing").unwrap_err();
        assert!(err.to_string().contains("Invalid source"));
        assert!(err.to_string().contains("bing"));
    }

    #[test]
    fn test_parse_keywords_trims_and_drops_blanks() {
        assert_eq!(
            parse_keywords(" Python, SEO ,, Data Science ,"),
            vec!["Python", "SEO", "Data Science"]
        );
        assert!(parse_keywords(" , ,").is_empty());
    }

    #[test]
    fn test_cli_parse_no_args_uses_defaults() {
        let cli = Cli::parse_from(["kwdash"]);
        assert_eq!(cli.keywords, "Python, SEO, Data Science");
        assert_eq!(cli.source, "insight");
        assert_eq!(cli.location, "in");
        assert_eq!(cli.lang, "en");
        assert_eq!(cli.timeout_secs, 30);
        assert!(!cli.plain);
        assert!(!cli.refresh);
    }

    #[test]
    fn test_startup_config_default_keywords() {
        let config = config(&[]).unwrap();
        let labels: Vec<&str> = config.queries.iter().map(|q| q.label()).collect();
        assert_eq!(labels, vec!["Python", "SEO", "Data Science"]);
        assert_eq!(config.source, Source::Insight);
        assert_eq!(config.output, OutputMode::Dashboard);
        assert_eq!(config.cache_policy, CachePolicy::Forever);
    }

    #[test]
    fn test_startup_config_keyword_queries_share_location_and_lang() {
        let config = config(&["rust, go", "-l", "us", "--lang", "fr"]).unwrap();
        assert_eq!(config.queries.len(), 2);
        for query in &config.queries {
            assert_eq!(query.location, "us");
            assert_eq!(query.language, "fr");
            assert!(matches!(query.subject, Subject::Keyword(_)));
        }
    }

    #[test]
    fn test_startup_config_url_mode() {
        let config = config(&["--url", "https://example.com"]).unwrap();
        assert_eq!(config.queries.len(), 1);
        assert_eq!(
            config.queries[0].subject,
            Subject::Url("https://example.com".to_string())
        );
    }

    #[test]
    fn test_startup_config_url_mode_rejected_for_ubersuggest() {
        let err = config(&["--source", "ubersuggest", "--url", "https://example.com"]).unwrap_err();
        assert!(matches!(err, CliError::UrlNotSupported(Source::Ubersuggest)));
    }

    #[test]
    fn test_startup_config_no_keywords() {
        assert!(matches!(config(&[" , "]).unwrap_err(), CliError::NoKeywords));
    }

    #[test]
    fn test_startup_config_empty_location() {
        assert!(matches!(
            config(&["-l", " "]).unwrap_err(),
            CliError::EmptyArgument("location")
        ));
    }

    #[test]
    fn test_startup_config_zero_timeout() {
        assert!(matches!(
            config(&["--timeout-secs", "0"]).unwrap_err(),
            CliError::ZeroTimeout
        ));
    }

    #[test]
    fn test_startup_config_zero_max_age() {
        assert!(matches!(
            config(&["--max-age-hours", "0"]).unwrap_err(),
            CliError::ZeroMaxAge
        ));
        assert!(config(&["--max-age-hours", "1"]).is_ok());
    }

    #[test]
    fn test_startup_config_flags() {
        let config = config(&[
            "seo",
            "--plain",
            "--refresh",
            "--max-age-hours",
            "12",
            "--cache-dir",
            "/tmp/kwdash-cache",
            "--export-dir",
            "out",
            "--api-key",
            " secret ",
        ])
        .unwrap();

        assert_eq!(config.output, OutputMode::Plain);
        assert!(config.refresh);
        assert_eq!(config.cache_policy, CachePolicy::max_age_hours(12));
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/kwdash-cache"));
        assert_eq!(config.export_dir, Some(PathBuf::from("out")));
        assert_eq!(config.api_key.as_ref().unwrap().expose_secret(), "secret");
        assert_eq!(config.cache().cache_dir(), PathBuf::from("/tmp/kwdash-cache"));
    }

    #[test]
    fn test_startup_config_blank_api_key_is_none() {
        let config = config(&["--api-key", "  "]).unwrap();
        assert!(config.api_key.is_none());
    }
}

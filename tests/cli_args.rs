//! Integration tests for CLI argument handling
//!
//! Runs the built binary for validation errors and plain-text mode.

use std::process::Command;

use tempfile::TempDir;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_kwdash"))
        .args(args)
        .env_remove("RAPIDAPI_KEY")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute kwdash")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("kwdash"), "Help should mention kwdash");
    assert!(stdout.contains("--source"), "Help should mention --source flag");
    assert!(stdout.contains("--plain"), "Help should mention --plain flag");
}

#[test]
fn test_invalid_source_prints_error_and_exits() {
    let output = run_cli(&["--source", "bing", "--plain"]);
    assert!(!output.status.success(), "Expected invalid source to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid source"),
        "Should print error message about invalid source: {}",
        stderr
    );
}

#[test]
fn test_url_with_ubersuggest_is_rejected() {
    let output = run_cli(&["--source", "ubersuggest", "--url", "https://example.com", "--plain"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not support --url"), "{}", stderr);
}

#[test]
fn test_empty_keyword_list_is_rejected() {
    let output = run_cli(&[" , ", "--plain"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No keywords"), "{}", stderr);
}

#[test]
fn test_plain_mode_without_key_reports_no_data() {
    let cache = TempDir::new().unwrap();
    let output = run_cli(&[
        "rust, seo",
        "--plain",
        "--cache-dir",
        cache.path().to_str().unwrap(),
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No data for insight keyword 'rust' (in/en)"), "{}", stdout);
    assert!(stdout.contains("No data for insight keyword 'seo' (in/en)"), "{}", stdout);
    // Nothing is cached for failed lookups
    assert_eq!(std::fs::read_dir(cache.path()).unwrap().count(), 0);
}

#[test]
fn test_plain_mode_reads_cached_payload() {
    use kwdash::cache::CacheManager;
    use kwdash::data::{Query, RawPayload, Source};
    use serde_json::json;

    let cache = TempDir::new().unwrap();
    let query = Query::keyword(Source::Ubersuggest, "seo", "in", "en");
    CacheManager::with_dir(cache.path().to_path_buf())
        .store(
            &query,
            &RawPayload(json!([{
                "Keyword Overview": [{
                    "Search Volume": 100,
                    "Keyword Difficulty": 40,
                    "High CPC": "2.50",
                    "Low CPC": "0.75",
                    "Trend": [{ "month": "Jan", "searches": 10 }]
                }]
            }])),
        )
        .unwrap();

    let output = run_cli(&[
        "seo",
        "--source",
        "ubersuggest",
        "--plain",
        "--cache-dir",
        cache.path().to_str().unwrap(),
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("(cached "), "{}", stdout);
    assert!(stdout.contains("Keyword Overview"), "{}", stdout);
    assert!(stdout.contains("Jan"), "{}", stdout);
}

#[test]
fn test_zero_max_age_is_rejected() {
    let output = run_cli(&["--max-age-hours", "0", "--plain"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--max-age-hours"), "{}", stderr);
}

#[test]
fn test_export_into_cache_dir_keeps_cache_usable() {
    use kwdash::cache::CacheManager;
    use kwdash::data::{Query, RawPayload, Source};
    use serde_json::json;

    let cache = TempDir::new().unwrap();
    let dir = cache.path().to_str().unwrap();
    let query = Query::keyword(Source::Ubersuggest, "seo", "in", "en");
    CacheManager::with_dir(cache.path().to_path_buf())
        .store(
            &query,
            &RawPayload(json!([{
                "Keyword Overview": [{
                    "Search Volume": 100,
                    "Keyword Difficulty": 40,
                    "High CPC": "2.50",
                    "Low CPC": "0.75",
                    "Trend": [{ "month": "Jan", "searches": 10 }]
                }]
            }])),
        )
        .unwrap();
    let args = [
        "seo",
        "--source",
        "ubersuggest",
        "--plain",
        "--cache-dir",
        dir,
        "--export-dir",
        dir,
    ];

    let first = run_cli(&args);
    let second = run_cli(&args);

    assert!(first.status.success());
    let stdout = String::from_utf8_lossy(&second.stdout);
    assert!(stdout.contains("(cached "), "{}", stdout);
    assert!(stdout.contains("CSV exported to"), "{}", stdout);

    let stem = CacheManager::file_stem(&query);
    for suffix in [".json", ".export.json", ".overview.csv", ".trend.csv"] {
        let path = cache.path().join(format!("{}{}", stem, suffix));
        assert!(path.exists(), "missing {}", path.display());
    }
    let trend = std::fs::read_to_string(cache.path().join(format!("{}.trend.csv", stem))).unwrap();
    assert_eq!(trend, "label,value\nJan,10.0\n");
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use kwdash::cli::{parse_keywords, parse_source_arg, Cli, CliError, StartupConfig};
    use kwdash::data::Source;

    #[test]
    fn test_cli_source_flag() {
        let cli = Cli::parse_from(["kwdash", "--source", "ubersuggest"]);
        assert_eq!(cli.source, "ubersuggest");
    }

    #[test]
    fn test_parse_source_arg_invalid_returns_error() {
        assert!(matches!(
            parse_source_arg("yahoo"),
            Err(CliError::InvalidSource(_))
        ));
        assert_eq!(parse_source_arg("google").unwrap(), Source::Insight);
    }

    #[test]
    fn test_parse_keywords_preserves_order() {
        assert_eq!(parse_keywords("b, a, c"), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_startup_config_from_cli_plain() {
        let cli = Cli::parse_from(["kwdash", "python", "--plain", "--max-age-hours", "6"]);
        let config = StartupConfig::from_cli(cli).unwrap();
        assert_eq!(config.queries.len(), 1);
        assert_eq!(config.output, kwdash::cli::OutputMode::Plain);
    }
}

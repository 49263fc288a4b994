//! Cache manager for persisting keyword payloads to disk
//!
//! Provides a `CacheManager` that stores one JSON file per query, named from
//! a readable slug plus a SHA-256 digest of the full query, and written
//! atomically through a temp file in the cache directory.

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::data::{Query, RawPayload};

/// Longest subject slug kept in a cache file name
const SLUG_MAX_LEN: usize = 40;

/// Upper bound for a configured max age (about a century)
const MAX_AGE_HOURS_LIMIT: u64 = 24 * 365 * 100;

/// Errors that can occur when storing a payload
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache directory could not be created
    #[error("Failed to create cache directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    /// The entry could not be serialized
    #[error("Failed to serialize cache entry: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Writing or renaming the entry file failed
    #[error("Failed to write cache entry {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// How long stored entries stay usable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Entries never expire
    #[default]
    Forever,
    /// Entries older than this are treated as misses
    MaxAge(Duration),
}

impl CachePolicy {
    pub fn max_age_hours(hours: u64) -> Self {
        CachePolicy::MaxAge(Duration::hours(hours.min(MAX_AGE_HOURS_LIMIT) as i64))
    }

    fn is_expired(&self, cached_at: DateTime<Utc>) -> bool {
        match self {
            CachePolicy::Forever => false,
            CachePolicy::MaxAge(max_age) => cached_at
                .checked_add_signed(*max_age)
                .map_or(false, |deadline| Utc::now() > deadline),
        }
    }
}

/// Wrapper struct for payloads stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<Q, P> {
    /// The query the payload answers
    query: Q,
    /// When the payload was cached
    cached_at: DateTime<Utc>,
    /// The payload exactly as the service returned it
    payload: P,
}

/// Result of a cache hit
#[derive(Debug, Clone)]
pub struct CachedPayload {
    pub payload: RawPayload,
    /// When the payload was originally cached
    pub cached_at: DateTime<Utc>,
    /// File the payload was read from
    pub path: PathBuf,
}

/// Manages reading and writing cached payloads
///
/// Stores entries as JSON files in an XDG-compliant cache directory
/// (`~/.cache/kwdash/` on Linux) or a directory given at startup.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
    policy: CachePolicy,
}

impl CacheManager {
    /// Creates a new CacheManager using the XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "kwdash")?;
        Some(Self::with_dir(project_dirs.cache_dir().to_path_buf()))
    }

    /// Creates a new CacheManager rooted at `cache_dir`
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            policy: CachePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Deterministic file stem for a query, shared by cache entries and exports
    ///
    /// The slug keeps names readable; the digest covers every query field, so
    /// queries whose slugs coincide still map to different files.
    pub fn file_stem(query: &Query) -> String {
        format!(
            "{}-{}-{}",
            query.source.name(),
            slug(query.subject.text()),
            query_digest(query)
        )
    }

    /// Cache entry file name for a query
    pub fn file_name(query: &Query) -> String {
        format!("{}.json", Self::file_stem(query))
    }

    /// Returns the path of the cache file for the given query
    pub fn entry_path(&self, query: &Query) -> PathBuf {
        self.cache_dir.join(Self::file_name(query))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> Result<(), CacheError> {
        fs::create_dir_all(&self.cache_dir).map_err(|source| CacheError::CreateDir {
            path: self.cache_dir.clone(),
            source,
        })
    }

    /// Reads the payload stored for `query`
    ///
    /// Missing, unreadable, corrupt, mismatched and expired entries are all
    /// misses; all but the first are logged.
    pub fn lookup(&self, query: &Query) -> Option<CachedPayload> {
        let path = self.entry_path(query);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "cache miss");
                return None;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable cache entry");
                return None;
            }
        };

        let entry: CacheEntry<Query, RawPayload> = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt cache entry ignored");
                return None;
            }
        };

        if entry.query != *query {
            warn!(path = %path.display(), "cache entry belongs to a different query");
            return None;
        }

        if self.policy.is_expired(entry.cached_at) {
            debug!(path = %path.display(), cached_at = %entry.cached_at, "cache entry expired");
            return None;
        }

        info!(query = %query, cached_at = %entry.cached_at, "loaded payload from cache");
        Some(CachedPayload {
            payload: entry.payload,
            cached_at: entry.cached_at,
            path,
        })
    }

    /// Stores `payload` for `query`, replacing any previous entry
    ///
    /// The entry is written to a temp file next to the final path and then
    /// renamed over it, so readers never observe a partial file.
    pub fn store(&self, query: &Query, payload: &RawPayload) -> Result<PathBuf, CacheError> {
        self.ensure_dir()?;

        let entry = CacheEntry {
            query,
            cached_at: Utc::now(),
            payload,
        };
        let json = serde_json::to_string_pretty(&entry)?;

        let path = self.entry_path(query);
        let write_error = |source: io::Error| CacheError::Write {
            path: path.clone(),
            source,
        };

        let mut tmpfile = NamedTempFile::new_in(&self.cache_dir).map_err(write_error)?;
        tmpfile.write_all(json.as_bytes()).map_err(write_error)?;
        tmpfile.write_all(b"\n").map_err(write_error)?;
        tmpfile.persist(&path).map_err(|e| write_error(e.error))?;

        info!(query = %query, path = %path.display(), "wrote payload to cache");
        Ok(path)
    }
}

/// Lowercase ASCII slug of the subject, safe as a single path segment
fn slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len().min(SLUG_MAX_LEN));
    for c in text.chars() {
        if slug.len() >= SLUG_MAX_LEN {
            break;
        }
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "query".to_string()
    } else {
        slug.to_string()
    }
}

/// Hex SHA-256 over every query field, each length-prefixed
fn query_digest(query: &Query) -> String {
    let mut hasher = Sha256::new();
    for part in [
        query.source.name(),
        query.subject.kind(),
        query.subject.text(),
        query.location.as_str(),
        query.language.as_str(),
    ] {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Source;
    use serde_json::json;
    use std::thread;
    use std::time::Duration as StdDuration;
    use tempfile::TempDir;

    fn create_test_cache() -> (CacheManager, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = CacheManager::with_dir(temp_dir.path().to_path_buf());
        (cache, temp_dir)
    }

    fn query(keyword: &str) -> Query {
        Query::keyword(Source::Insight, keyword, "in", "en")
    }

    fn payload() -> RawPayload {
        RawPayload(json!([{ "text": "python", "volume": 1000, "nested": { "a": [1, 2.5, null] } }]))
    }

    #[test]
    fn test_store_creates_file_in_cache_directory() {
        let (cache, temp_dir) = create_test_cache();

        let path = cache.store(&query("python"), &payload()).expect("Store should succeed");

        assert!(path.exists(), "Cache file should exist");
        assert_eq!(path.parent(), Some(temp_dir.path()));

        // Pretty-printed JSON with the payload inside
        let content = fs::read_to_string(&path).expect("Should read file");
        assert!(content.contains("\n  \"payload\""));
        assert!(content.contains("\"python\""));
    }

    #[test]
    fn test_lookup_returns_none_for_missing_query() {
        let (cache, _temp_dir) = create_test_cache();
        assert!(cache.lookup(&query("nonexistent")).is_none());
    }

    #[test]
    fn test_store_then_lookup_roundtrip() {
        let (cache, _temp_dir) = create_test_cache();
        let original = payload();

        cache.store(&query("python"), &original).expect("Store should succeed");
        let cached = cache.lookup(&query("python")).expect("Should hit cache");

        assert_eq!(cached.payload, original, "Payload should survive roundtrip");
    }

    #[test]
    fn test_lookup_is_keyed_by_every_field() {
        let (cache, _temp_dir) = create_test_cache();
        cache.store(&query("python"), &payload()).unwrap();

        assert!(cache
            .lookup(&Query::keyword(Source::Insight, "python", "us", "en"))
            .is_none());
        assert!(cache
            .lookup(&Query::keyword(Source::Insight, "python", "in", "fr"))
            .is_none());
        assert!(cache
            .lookup(&Query::keyword(Source::Ubersuggest, "python", "in", "en"))
            .is_none());
        assert!(cache
            .lookup(&Query::url(Source::Insight, "python", "in", "en"))
            .is_none());
    }

    #[test]
    fn test_subjects_with_identical_slugs_do_not_collide() {
        let (cache, _temp_dir) = create_test_cache();
        let a = query("data/science");
        let b = query("data science");
        let c = query("Data?Science");
        assert_eq!(slug(a.subject.text()), slug(b.subject.text()));

        let first = RawPayload(json!(["a"]));
        let second = RawPayload(json!(["b"]));
        let third = RawPayload(json!(["c"]));
        let path_a = cache.store(&a, &first).unwrap();
        let path_b = cache.store(&b, &second).unwrap();
        let path_c = cache.store(&c, &third).unwrap();

        assert_ne!(path_a, path_b);
        assert_ne!(path_b, path_c);
        assert_eq!(cache.lookup(&a).unwrap().payload, first);
        assert_eq!(cache.lookup(&b).unwrap().payload, second);
        assert_eq!(cache.lookup(&c).unwrap().payload, third);
    }

    #[test]
    fn test_path_separators_stay_inside_cache_dir() {
        let (cache, temp_dir) = create_test_cache();

        for subject in ["../../etc/passwd", "/absolute/path", "a\\b", "https://example.com/x?y=1"] {
            let path = cache.store(&query(subject), &payload()).unwrap();
            assert_eq!(path.parent(), Some(temp_dir.path()), "{}", subject);
        }
    }

    #[test]
    fn test_file_name_is_deterministic() {
        let name = CacheManager::file_name(&query("Python Tips"));
        assert_eq!(name, CacheManager::file_name(&query("Python Tips")));
        assert!(name.starts_with("insight-python-tips-"));
        assert!(name.ends_with(".json"));
        // source + slug + 64 hex digits + extension
        assert_eq!(name.len(), "insight-python-tips-".len() + 64 + ".json".len());
    }

    #[test]
    fn test_slug_handles_unicode_and_long_text() {
        assert_eq!(slug("Café Crème"), "caf-cr-me");
        assert_eq!(slug("!!!"), "query");
        assert!(slug(&"x".repeat(500)).len() <= SLUG_MAX_LEN);
    }

    #[test]
    fn test_corrupt_entry_is_a_miss_and_is_replaced() {
        let (cache, _temp_dir) = create_test_cache();
        let q = query("python");
        cache.store(&q, &payload()).unwrap();

        // Simulate a truncated write from an older version
        fs::write(cache.entry_path(&q), "{ \"query\": ").unwrap();
        assert!(cache.lookup(&q).is_none());

        cache.store(&q, &payload()).unwrap();
        assert_eq!(cache.lookup(&q).unwrap().payload, payload());
    }

    #[test]
    fn test_entry_for_other_query_is_a_miss() {
        let (cache, _temp_dir) = create_test_cache();
        let a = query("python");
        let b = query("rust");
        cache.store(&a, &payload()).unwrap();

        fs::copy(cache.entry_path(&a), cache.entry_path(&b)).unwrap();

        assert!(cache.lookup(&b).is_none());
    }

    #[test]
    fn test_store_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("cache").join("dir");
        let cache = CacheManager::with_dir(nested_path.clone());

        let path = cache.store(&query("nested"), &payload()).expect("Store should succeed");

        assert!(nested_path.exists(), "Nested directory should be created");
        assert!(path.exists(), "Cache file should exist");
    }

    #[test]
    fn test_store_leaves_no_temp_files() {
        let (cache, temp_dir) = create_test_cache();
        cache.store(&query("one"), &payload()).unwrap();
        cache.store(&query("one"), &payload()).unwrap();
        cache.store(&query("two"), &payload()).unwrap();

        let files: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_cached_at_timestamp_is_recorded() {
        let (cache, _temp_dir) = create_test_cache();

        let before = Utc::now();
        cache.store(&query("timestamp"), &payload()).unwrap();
        let after = Utc::now();

        let cached = cache.lookup(&query("timestamp")).expect("Should read cache");

        assert!(cached.cached_at >= before, "cached_at should be after write started");
        assert!(cached.cached_at <= after, "cached_at should be before write finished");
    }

    #[test]
    fn test_forever_policy_never_expires() {
        assert!(!CachePolicy::Forever.is_expired(Utc::now() - Duration::days(3650)));
    }

    #[test]
    fn test_max_age_policy_expires_entries() {
        let (cache, _temp_dir) = create_test_cache();
        let cache = cache.with_policy(CachePolicy::MaxAge(Duration::zero()));

        cache.store(&query("expired"), &payload()).unwrap();
        thread::sleep(StdDuration::from_millis(10));

        assert!(cache.lookup(&query("expired")).is_none());
    }

    #[test]
    fn test_max_age_hours() {
        assert_eq!(
            CachePolicy::max_age_hours(24),
            CachePolicy::MaxAge(Duration::hours(24))
        );
        let (cache, _temp_dir) = create_test_cache();
        let cache = cache.with_policy(CachePolicy::max_age_hours(24));
        cache.store(&query("fresh"), &payload()).unwrap();
        assert!(cache.lookup(&query("fresh")).is_some());
    }

    #[test]
    fn test_new_creates_xdg_compliant_path() {
        if let Some(cache) = CacheManager::new() {
            let path_str = cache.cache_dir.to_string_lossy();
            assert!(path_str.contains("kwdash"), "Cache path should contain project name");
        }
        // Test passes if new() returns None (e.g., no home directory in CI)
    }

    #[test]
    fn test_overwrite_existing_entry() {
        let (cache, _temp_dir) = create_test_cache();
        let first = RawPayload(json!({ "v": 1 }));
        let second = RawPayload(json!({ "v": 2 }));

        cache.store(&query("overwrite"), &first).unwrap();
        cache.store(&query("overwrite"), &second).unwrap();

        let cached = cache.lookup(&query("overwrite")).expect("Should read cache");
        assert_eq!(cached.payload, second, "Cache should contain latest payload");
    }
}

//! RapidAPI keyword service client
//!
//! Issues a single GET per query against the endpoint chosen by the query's
//! source. Callers get the parsed payload or nothing: every failure cause is
//! logged and then collapsed into "no data".

use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{Query, RawPayload, Source};

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur when fetching a keyword payload
#[derive(Debug, Error)]
pub enum FetchError {
    /// No API key was configured
    #[error("No API key configured")]
    MissingApiKey,

    /// A query field was empty
    #[error("Query field '{0}' is empty")]
    EmptyField(&'static str),

    /// The source has no endpoint for this kind of subject
    #[error("Source '{service}' does not support {kind} lookups")]
    Unsupported { service: Source, kind: &'static str },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("Service responded with HTTP {0}")]
    Status(u16),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Client for the keyword services
#[derive(Debug)]
pub struct KeywordClient {
    http_client: Client,
    api_key: Option<SecretString>,
    /// Overrides `https://<source host>` (allows override for testing)
    base_url: Option<String>,
}

impl KeywordClient {
    /// Creates a client with the given credential and request timeout
    pub fn new(api_key: Option<SecretString>, timeout: Duration) -> Result<Self, FetchError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            api_key,
            base_url: None,
        })
    }

    /// Sends every source's requests to `base_url` instead of its RapidAPI host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    fn endpoint(&self, source: Source, path: &str) -> String {
        match &self.base_url {
            Some(base) => format!("{}{}", base, path),
            None => format!("https://{}{}", source.host(), path),
        }
    }

    /// Fetches the payload for `query`, or `None` if anything went wrong
    ///
    /// Missing credentials, transport errors, non-2xx statuses and unparseable
    /// bodies all yield `None`. The cause is logged at warn level.
    pub async fn fetch(&self, query: &Query) -> Option<RawPayload> {
        match self.try_fetch(query).await {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!(query = %query, error = %e, "keyword lookup returned no data");
                None
            }
        }
    }

    /// Fetches the payload for `query`, keeping the failure cause
    pub async fn try_fetch(&self, query: &Query) -> Result<RawPayload, FetchError> {
        let api_key = self
            .api_key
            .as_ref()
            .filter(|key| !key.expose_secret().trim().is_empty())
            .ok_or(FetchError::MissingApiKey)?;

        if let Some(field) = query.first_empty_field() {
            return Err(FetchError::EmptyField(field));
        }

        let (path, params) = query
            .source
            .request(query)
            .ok_or(FetchError::Unsupported {
                service: query.source,
                kind: query.subject.kind(),
            })?;

        let url = self.endpoint(query.source, path);
        debug!(url = %url, ?params, "sending keyword lookup");

        let response = self
            .http_client
            .get(&url)
            .header("x-rapidapi-key", api_key.expose_secret())
            .header("x-rapidapi-host", query.source.host())
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        let value: serde_json::Value = serde_json::from_str(&text)?;

        info!(query = %query, bytes = text.len(), "fetched keyword payload");
        Ok(RawPayload(value))
    }
}

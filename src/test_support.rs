//! Local stand-in for the RapidAPI keyword services, used by unit tests

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

/// A mock keyword API bound to an ephemeral localhost port
pub struct MockKeywordApi {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl MockKeywordApi {
    /// The only API key the mock accepts
    pub const API_KEY: &'static str = "test-key";
    /// Keyword that makes the mock answer HTTP 500
    pub const FAILING_KEYWORD: &'static str = "server-error";
    /// Keyword that makes the mock answer a non-JSON body
    pub const GARBLED_KEYWORD: &'static str = "garbled";

    pub async fn start() -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/keysuggest/", get(keyword_ideas))
            .route("/urlkeysuggest/", get(url_ideas))
            .route("/keyword-Overview-Data", get(keyword_overview))
            .with_state(hits.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock API");
        let addr = listener.local_addr().expect("Mock API has no address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, hits }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of requests received so far
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Counts the request and checks credentials and failure triggers
fn preflight(hits: &AtomicUsize, headers: &HeaderMap, subject: Option<&String>) -> Option<Response> {
    hits.fetch_add(1, Ordering::SeqCst);

    let key = headers.get("x-rapidapi-key").and_then(|v| v.to_str().ok());
    if key != Some(MockKeywordApi::API_KEY) {
        return Some(
            (
                StatusCode::FORBIDDEN,
                Json(json!({ "message": "You are not subscribed to this API." })),
            )
                .into_response(),
        );
    }
    if headers.get("x-rapidapi-host").is_none() {
        return Some(StatusCode::BAD_REQUEST.into_response());
    }

    match subject.map(String::as_str) {
        Some(MockKeywordApi::FAILING_KEYWORD) => Some(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "upstream failure" })),
            )
                .into_response(),
        ),
        Some(MockKeywordApi::GARBLED_KEYWORD) => {
            Some((StatusCode::OK, "<html>not json</html>").into_response())
        }
        _ => None,
    }
}

fn ideas(subject: &str, params: &HashMap<String, String>) -> Value {
    json!([
        {
            "text": subject,
            "volume": 1000,
            "competition_level": "LOW",
            "competition_index": 12,
            "low_bid": 0.5,
            "high_bid": 2.5,
            "trend": 12.5,
            "location": params.get("location"),
            "lang": params.get("lang")
        },
        {
            "text": format!("{} tutorial", subject),
            "volume": 200,
            "competition_level": "HIGH",
            "competition_index": 80,
            "low_bid": 1.0,
            "high_bid": 4.0,
            "trend": -3.0
        }
    ])
}

async fn keyword_ideas(
    State(hits): State<Arc<AtomicUsize>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let keyword = params.get("keyword");
    if let Some(response) = preflight(&hits, &headers, keyword) {
        return response;
    }
    match keyword {
        Some(keyword) => Json(ideas(keyword, &params)).into_response(),
        None => StatusCode::BAD_REQUEST.into_response(),
    }
}

async fn url_ideas(
    State(hits): State<Arc<AtomicUsize>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let url = params.get("url");
    if let Some(response) = preflight(&hits, &headers, url) {
        return response;
    }
    match url {
        Some(url) => Json(ideas(url, &params)).into_response(),
        None => StatusCode::BAD_REQUEST.into_response(),
    }
}

async fn keyword_overview(
    State(hits): State<Arc<AtomicUsize>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let keyword = params.get("keyword");
    if let Some(response) = preflight(&hits, &headers, keyword) {
        return response;
    }
    if params.get("country").is_none() {
        return StatusCode::BAD_REQUEST.into_response();
    }
    Json(json!([{
        "Keyword Overview": [{
            "Search Volume": 100,
            "Keyword Difficulty": 40,
            "High CPC": "2.50",
            "Low CPC": "0.75",
            "Trend": [
                { "month": "Jan", "searches": 10 },
                { "month": "Feb", "searches": 25 }
            ]
        }],
        "Google Trends Data": {
            "Interest Google Trends Data": [
                { "region": "Karnataka", "interest": 100 },
                { "region": "Delhi", "interest": 64 }
            ]
        }
    }]))
    .into_response()
}

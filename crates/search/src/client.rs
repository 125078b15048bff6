//! Tavily search client.
//!
//! Tavily API: https://docs.tavily.com/docs/rest-api/api-reference

use mathtutor_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Domains the web-search fallback is allowed to draw from.
///
/// Math-education and reference sites only; general web results are not
/// trustworthy enough to feed into a tutoring prompt.
pub const ALLOWED_DOMAINS: &[&str] = &[
    "khanacademy.org",
    "brilliant.org",
    "mathigon.org",
    "coursera.org",
    "edx.org",
    "udemy.com",
    "wolframalpha.com",
    "mathworld.wolfram.com",
    "wolfram.com",
    "symbolab.com",
    "mathway.com",
    "cymath.com",
    "wikipedia.org",
    "britannica.com",
    "mathinsight.org",
    "cut-the-knot.org",
];

const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";

/// A single result returned by the search provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub content: String,

    /// Provider relevance score in [0, 1]
    #[serde(default)]
    pub score: f32,
}

/// Trait for web search providers.
///
/// The agent graph depends on this seam; tests use scripted clients.
#[async_trait::async_trait]
pub trait SearchClient: Send + Sync {
    /// Run a search and return raw hits.
    async fn search(&self, query: &str) -> AppResult<Vec<SearchHit>>;
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    include_domains: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// Tavily web-search client restricted to the domain allow-list.
pub struct TavilyClient {
    api_key: String,
    max_results: usize,
    client: reqwest::Client,
}

impl TavilyClient {
    /// Create a new Tavily client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            max_results: 5,
            client: reqwest::Client::new(),
        }
    }

    /// Set the maximum number of results per query.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

#[async_trait::async_trait]
impl SearchClient for TavilyClient {
    async fn search(&self, query: &str) -> AppResult<Vec<SearchHit>> {
        tracing::info!("Searching the web for: {}", query);

        let request = TavilyRequest {
            api_key: &self.api_key,
            query,
            max_results: self.max_results,
            include_domains: ALLOWED_DOMAINS,
        };

        let response = self
            .client
            .post(TAVILY_ENDPOINT)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Search request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Search(format!(
                "Tavily API error ({}): {}",
                status, error_text
            )));
        }

        let parsed: TavilyResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Failed to parse search response: {}", e)))?;

        tracing::debug!("Search returned {} hits", parsed.results.len());

        Ok(parsed.results)
    }
}

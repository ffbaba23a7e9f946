//! Tavily news search client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use cadence_core::error::NewsError;
use cadence_core::traits::NewsSource;
use cadence_core::types::NewsItem;

const SEARCH_URL: &str = "https://api.tavily.com/search";
const MAX_RESULTS: usize = 5;

/// Tavily-backed news collaborator.
pub struct TavilyNews {
    client: Client,
    api_key: String,
}

impl TavilyNews {
    /// Create a client with an explicit API key.
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }

    /// Create from the `TAVILY_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, NewsError> {
        let api_key = std::env::var("TAVILY_API_KEY")
            .map_err(|_| NewsError::Configuration("TAVILY_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    async fn search(&self, query: &str) -> Result<Vec<NewsItem>, NewsError> {
        let body = SearchRequest {
            query,
            topic: "news",
            search_depth: "basic",
            max_results: MAX_RESULTS,
            include_answer: false,
            time_range: "week",
        };

        let resp = self
            .client
            .post(SEARCH_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| NewsError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(NewsError::Api(format!("{status}: {text}")));
        }

        let data: SearchResponse = resp
            .json()
            .await
            .map_err(|e| NewsError::Api(e.to_string()))?;

        debug!(query, results = data.results.len(), "news search done");

        Ok(data
            .results
            .into_iter()
            .map(|r| NewsItem {
                title: r.title,
                url: r.url,
                snippet: r.content,
            })
            .collect())
    }
}

#[async_trait]
impl NewsSource for TavilyNews {
    async fn symbol_news(&self, symbol: &str) -> Result<Vec<NewsItem>, NewsError> {
        self.search(&format!("{symbol} stock news market")).await
    }

    async fn market_news(&self) -> Result<Vec<NewsItem>, NewsError> {
        self.search("stock market today major index news").await
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    topic: &'a str,
    search_depth: &'a str,
    max_results: usize,
    include_answer: bool,
    time_range: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    /// Tavily calls the snippet field "content"
    #[serde(default, alias = "snippet")]
    content: String,
}

//! Internet search through the Serper Google Search API

use crate::error::WebToolError;
use crate::Tool;
use async_trait::async_trait;
use crew_core::Result as CoreResult;
use crew_llm::tools::schema;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, instrument};

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Serper search endpoint
pub const SERPER_ENDPOINT: &str = "https://google.serper.dev/search";
/// Environment variable holding the Serper API key
pub const SERPER_API_KEY_ENV: &str = "SERPER_API_KEY";

const DEFAULT_RESULTS: usize = 10;
const DEFAULT_REQUESTS_PER_MINUTE: u32 = 60;

#[derive(Debug, Deserialize)]
struct SearchParams {
    search_query: String,
}

#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: usize,
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

/// One organic search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganicResult {
    /// Page title
    pub title: String,
    /// Page URL
    pub link: String,
    /// Result snippet
    #[serde(default)]
    pub snippet: String,
}

/// Search tool agents use to look things up on the web
///
/// The API key is read when the tool is built but only checked when the tool
/// runs, so a missing key shows up as a failed tool call inside the crew.
pub struct SerperSearchTool {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    n_results: usize,
    rate_limiter: SharedRateLimiter,
}

impl SerperSearchTool {
    /// Create a search tool with an explicit API key
    pub fn new(api_key: Option<String>) -> Self {
        let rate = NonZeroU32::new(DEFAULT_REQUESTS_PER_MINUTE).unwrap_or(NonZeroU32::MIN);
        Self {
            client: Client::new(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            endpoint: SERPER_ENDPOINT.to_string(),
            n_results: DEFAULT_RESULTS,
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_minute(rate))),
        }
    }

    /// Create a search tool reading `SERPER_API_KEY`
    pub fn from_env() -> Self {
        Self::new(std::env::var(SERPER_API_KEY_ENV).ok())
    }

    /// Override the HTTP client (shared timeouts, proxies)
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn search(&self, query: &str) -> Result<Vec<OrganicResult>, WebToolError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(WebToolError::MissingApiKey(SERPER_API_KEY_ENV))?;

        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", api_key)
            .json(&SerperRequest {
                q: query,
                num: self.n_results,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WebToolError::HttpStatus {
                url: self.endpoint.clone(),
                status: response.status().as_u16(),
            });
        }

        let body: SerperResponse = response
            .json()
            .await
            .map_err(|e| WebToolError::UnexpectedResponse(format!("Serper response: {e}")))?;

        debug!(hits = body.organic.len(), "Search completed");
        Ok(body.organic.into_iter().take(self.n_results).collect())
    }
}

#[async_trait]
impl Tool for SerperSearchTool {
    async fn execute(&self, params: Value) -> CoreResult<Value> {
        let params: SearchParams = serde_json::from_value(params)
            .map_err(|e| WebToolError::InvalidParameters(e.to_string()))?;

        let results = self.search(&params.search_query).await?;

        Ok(json!({
            "query": params.search_query,
            "results": results,
        }))
    }

    fn name(&self) -> &str {
        "search_the_internet"
    }

    fn description(&self) -> &str {
        "Search the internet with a query. Returns titles, links and snippets of \
         the top results. Use it for recent news, prices and market commentary."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "search_query": schema::string("Mandatory search query you want to use to search the internet"),
            }),
            &["search_query"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_fails_at_call_time() {
        let tool = SerperSearchTool::new(None);
        let err = tool
            .execute(json!({"search_query": "AAPL news"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("SERPER_API_KEY is not set"));
    }

    #[tokio::test]
    async fn test_blank_key_treated_as_missing() {
        let tool = SerperSearchTool::new(Some("   ".to_string()));
        assert!(tool.execute(json!({"search_query": "x"})).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_parameters() {
        let tool = SerperSearchTool::new(Some("key".to_string()));
        let err = tool.execute(json!({"query": "wrong field"})).await.unwrap_err();
        assert!(err.to_string().contains("Invalid parameters"));
    }

    #[test]
    fn test_schema_and_name() {
        let tool = SerperSearchTool::new(None);
        assert_eq!(tool.n_results, DEFAULT_RESULTS);
        assert_eq!(tool.name(), "search_the_internet");
        assert_eq!(tool.input_schema()["required"][0], "search_query");
    }

    #[test]
    fn test_response_parsing() {
        let body: SerperResponse = serde_json::from_value(json!({
            "searchParameters": {"q": "AAPL"},
            "organic": [
                {"title": "Apple Inc. (AAPL)", "link": "https://finance.example.com/aapl", "snippet": "Apple shares rose", "position": 1},
                {"title": "No snippet", "link": "https://example.com"}
            ]
        }))
        .unwrap();

        assert_eq!(body.organic.len(), 2);
        assert_eq!(body.organic[0].snippet, "Apple shares rose");
        assert_eq!(body.organic[1].snippet, "");
    }
}

//! Website reading tool: fetches a page and reduces it to plain text

use crate::error::WebToolError;
use crate::Tool;
use async_trait::async_trait;
use crew_core::Result as CoreResult;
use crew_llm::tools::schema;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::LazyLock;
use tracing::{debug, instrument};
use url::Url;

const DEFAULT_MAX_CHARS: usize = 12_000;
const USER_AGENT: &str = "Mozilla/5.0 (compatible; financial-crew/0.1)";

static HIDDEN_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<noscript\b.*?</noscript\s*>|<!--.*?-->")
        .expect("valid hidden block pattern")
});
static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|div|li|tr|h[1-6]|section|article|header|footer)\s*>")
        .expect("valid line break pattern")
});
static TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));
static SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\x0C\r]+").expect("valid space pattern"));

#[derive(Debug, Deserialize)]
struct ScrapeParams {
    website_url: String,
}

/// Tool that reads the text content of a web page
pub struct ScrapeWebsiteTool {
    client: Client,
    max_chars: usize,
}

impl Default for ScrapeWebsiteTool {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrapeWebsiteTool {
    /// Create a scrape tool with the default character budget
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            max_chars: DEFAULT_MAX_CHARS,
        }
    }

    /// Override the HTTP client (shared timeouts, proxies)
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Maximum number of characters returned to the model
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    #[instrument(skip(self))]
    async fn scrape(&self, website_url: &str) -> Result<String, WebToolError> {
        let url = parse_http_url(website_url)?;

        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WebToolError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let html = response.text().await?;
        let text = html_to_text(&html, self.max_chars);
        debug!(html_len = html.len(), text_len = text.len(), "Page scraped");
        Ok(text)
    }
}

fn parse_http_url(raw: &str) -> Result<Url, WebToolError> {
    let url = Url::parse(raw.trim()).map_err(|e| WebToolError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(WebToolError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme {other:?}"),
        }),
    }
}

/// Reduce an HTML document to readable text, at most `max_chars` characters
pub fn html_to_text(html: &str, max_chars: usize) -> String {
    let without_hidden = HIDDEN_BLOCKS.replace_all(html, " ");
    let with_breaks = LINE_BREAKS.replace_all(&without_hidden, "\n");
    let without_tags = TAGS.replace_all(&with_breaks, " ");
    let decoded = decode_entities(&without_tags);

    let text = decoded
        .lines()
        .map(|line| SPACES.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text,
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[async_trait]
impl Tool for ScrapeWebsiteTool {
    async fn execute(&self, params: Value) -> CoreResult<Value> {
        let params: ScrapeParams = serde_json::from_value(params)
            .map_err(|e| WebToolError::InvalidParameters(e.to_string()))?;

        let content = self.scrape(&params.website_url).await?;

        Ok(json!({
            "website_url": params.website_url,
            "content": content,
        }))
    }

    fn name(&self) -> &str {
        "read_website_content"
    }

    fn description(&self) -> &str {
        "Read a website's text content. Give it the full URL of the page; \
         scripts, styles and markup are removed."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "website_url": schema::string("Mandatory website url to read the file"),
            }),
            &["website_url"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text_strips_markup() {
        let html = r#"<html><head><title>AAPL</title><style>p { color: red; }</style>
            <script type="text/javascript">var x = "<p>hidden</p>";</script></head>
            <body><h1>Apple   Inc.</h1><!-- comment --><p>Shares rose &amp; fell.</p>
            <p>P/E &lt; 30<br/>Next line</p></body></html>"#;

        let text = html_to_text(html, 1_000);
        assert_eq!(text, "AAPL\nApple Inc.\nShares rose & fell.\nP/E < 30\nNext line");
        assert!(!text.contains("hidden"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn test_html_to_text_truncates_on_char_boundary() {
        let text = html_to_text("<p>ééééé</p>", 3);
        assert_eq!(text, "ééé");
    }

    #[test]
    fn test_parse_http_url() {
        assert!(parse_http_url("https://finance.example.com/quote/AAPL").is_ok());
        assert!(matches!(
            parse_http_url("ftp://example.com"),
            Err(WebToolError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_http_url("not a url"),
            Err(WebToolError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_execute_rejects_bad_url_without_network() {
        let tool = ScrapeWebsiteTool::new();
        let err = tool
            .execute(json!({"website_url": "file:///etc/passwd"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_schema() {
        let tool = ScrapeWebsiteTool::new().with_max_chars(10);
        assert_eq!(tool.max_chars, 10);
        assert_eq!(tool.input_schema()["required"][0], "website_url");
    }
}

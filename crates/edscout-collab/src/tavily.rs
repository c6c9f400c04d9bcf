//! Tavily search client
//!
//! Provides the [`ContextProvider`] backend: one advanced-depth search per
//! candidate/category pair, flattened into a plain-text context block.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use edscout_core::{CollabError, ContextProvider};

/// Context handed to the scorer is capped at this many characters so a
/// single oversized page cannot blow the prompt budget.
pub const MAX_CONTEXT_CHARS: usize = 15_000;

/// Result snippets shorter than this carry no signal and are dropped.
const MIN_SNIPPET_CHARS: usize = 50;

/// Tavily configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TavilyConfig {
    /// Search endpoint URL
    pub api_url: String,
    /// API key (bearer token)
    pub api_key: String,
    /// Maximum results per search
    pub max_results: usize,
}

impl TavilyConfig {
    /// Create a config from the `TAVILY_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, CollabError> {
        let api_key = std::env::var("TAVILY_API_KEY")
            .map_err(|_| CollabError::Unavailable("TAVILY_API_KEY is not set".to_string()))?;
        Ok(Self::new(api_key))
    }

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: "https://api.tavily.com/search".to_string(),
            api_key: api_key.into(),
            max_results: 7,
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: usize,
    include_answer: bool,
    search_depth: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
}

/// Tavily-backed context provider.
pub struct TavilyClient {
    config: TavilyConfig,
    http_client: reqwest::Client,
}

impl TavilyClient {
    pub fn new(config: TavilyConfig) -> Self {
        let http_client = reqwest::Client::new();
        TavilyClient {
            config,
            http_client,
        }
    }

    /// Create a client from environment variables.
    pub fn from_env() -> Result<Self, CollabError> {
        Ok(Self::new(TavilyConfig::from_env()?))
    }

    async fn search(&self, query: &str) -> Result<SearchResponse, CollabError> {
        let request = SearchRequest {
            query,
            max_results: self.config.max_results,
            include_answer: true,
            search_depth: "advanced",
        };

        let response = self
            .http_client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CollabError::Unavailable(format!("tavily request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(CollabError::Unavailable(format!(
                "tavily returned {}",
                response.status()
            )));
        }

        response
            .json::<SearchResponse>()
            .await
            .map_err(|e| CollabError::Malformed(format!("tavily response: {e}")))
    }
}

/// Flatten a search response into the context block handed to scorers.
///
/// The answer summary comes first, then each substantive result snippet with
/// its title. The whole block is truncated to [`MAX_CONTEXT_CHARS`].
fn flatten_context(response: &SearchResponse) -> String {
    let mut parts = Vec::new();

    if let Some(answer) = &response.answer {
        if !answer.trim().is_empty() {
            parts.push(format!("Summary:\n{answer}"));
        }
    }

    for (i, result) in response.results.iter().enumerate() {
        if result.content.len() >= MIN_SNIPPET_CHARS {
            parts.push(format!(
                "Source {} ({}):\n{}",
                i + 1,
                result.title,
                result.content
            ));
        }
    }

    let mut context = parts.join("\n\n");
    if context.len() > MAX_CONTEXT_CHARS {
        // Truncate on a char boundary at or below the cap.
        let mut cut = MAX_CONTEXT_CHARS;
        while !context.is_char_boundary(cut) {
            cut -= 1;
        }
        context.truncate(cut);
    }
    context
}

#[async_trait]
impl ContextProvider for TavilyClient {
    async fn get_context(&self, candidate_id: &str, query: &str) -> Result<String, CollabError> {
        let full_query = format!("{candidate_id} {query}");
        let response = self.search(&full_query).await?;
        let context = flatten_context(&response);
        debug!(
            candidate = %candidate_id,
            sources = response.results.len(),
            chars = context.len(),
            "context gathered"
        );
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(answer: Option<&str>, snippets: &[(&str, &str)]) -> SearchResponse {
        SearchResponse {
            answer: answer.map(String::from),
            results: snippets
                .iter()
                .map(|(title, content)| SearchResult {
                    title: title.to_string(),
                    content: content.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = TavilyConfig::new("key");
        assert_eq!(config.api_url, "https://api.tavily.com/search");
        assert_eq!(config.max_results, 7);
    }

    #[test]
    fn test_flatten_orders_answer_before_sources() {
        let long = "x".repeat(60);
        let ctx = flatten_context(&response(Some("the summary"), &[("A story", &long)]));
        assert!(ctx.starts_with("Summary:\nthe summary"));
        assert!(ctx.contains("Source 1 (A story):"));
    }

    #[test]
    fn test_flatten_drops_short_snippets() {
        let ctx = flatten_context(&response(None, &[("thin", "too short")]));
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_flatten_truncates_at_cap() {
        let huge = "y".repeat(MAX_CONTEXT_CHARS * 2);
        let ctx = flatten_context(&response(None, &[("big", &huge)]));
        assert!(ctx.len() <= MAX_CONTEXT_CHARS);
    }

    #[test]
    fn test_flatten_truncates_on_char_boundary() {
        // Multi-byte characters straddling the cap must not split.
        let huge = "학".repeat(MAX_CONTEXT_CHARS);
        let ctx = flatten_context(&response(None, &[("kr", &huge)]));
        assert!(ctx.len() <= MAX_CONTEXT_CHARS);
        assert!(ctx.is_char_boundary(ctx.len()));
    }

    #[test]
    fn test_response_parses_with_missing_fields() {
        let parsed: SearchResponse = serde_json::from_str(r#"{"results": [{"title": "t"}]}"#)
            .expect("partial payload parses");
        assert!(parsed.answer.is_none());
        assert_eq!(parsed.results.len(), 1);
        assert!(parsed.results[0].content.is_empty());
    }
}

//! # Bundled article-search capability
//!
//! The `search_news` tool that ships with the SDK: a keyword search against
//! a NewsAPI-style backend, exposed to the model through the registry and
//! rendered as plain text for tool messages.
//!
//! The HTTP backing lives behind the [`ArticleSource`] trait so tests (and
//! callers with their own index) can substitute a fake without touching the
//! tool schema or the rendering contract. The rendering contract is fixed:
//! a numbered list capped at [`MAX_ARTICLES`] entries, each carrying title,
//! source attribution, a normalized publication date, a description or an
//! explicit placeholder, and the article URL.

use crate::tools::{ParameterType, RegisteredTool, tool};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;
use tracing::debug;

/// Environment variable holding the search backend's API key
pub const NEWS_API_KEY_ENV: &str = "NEWSAPI_KEY";

/// Environment variable overriding the search backend endpoint
pub const NEWS_API_ENDPOINT_ENV: &str = "NEWSAPI_ENDPOINT";

/// Default search backend endpoint
pub const DEFAULT_NEWS_ENDPOINT: &str = "https://newsapi.org/v2/everything";

/// Most articles a search ever yields, regardless of what the backend returns
pub const MAX_ARTICLES: usize = 5;

/// Search parameters, deserialized from a tool call's arguments
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

/// Attribution for one article
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsSource {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// One article as returned by the search backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub source: NewsSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_to_image: Option<String>,
    pub published_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Response envelope of the search backend
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    pub status: String,
    #[serde(default)]
    pub total_results: Option<u32>,
    #[serde(default)]
    pub articles: Option<Vec<NewsArticle>>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Anything that can answer an article search.
///
/// Implemented by [`NewsClient`] for the real backend; tests substitute
/// in-memory fakes.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn search(&self, params: &SearchParams) -> Result<Vec<NewsArticle>>;
}

/// HTTP-backed article source
pub struct NewsClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

// Never print the key.
impl std::fmt::Debug for NewsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl NewsClient {
    /// Create a client for the given endpoint.
    ///
    /// A missing key is not an error here: key presence is checked per
    /// search, so the failure surfaces as a tool-execution failure the
    /// conversation can absorb rather than a construction-time panic.
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }

    /// Create a client from `NEWSAPI_ENDPOINT` / `NEWSAPI_KEY`
    pub fn from_env() -> Self {
        Self::new(
            env::var(NEWS_API_ENDPOINT_ENV).unwrap_or_else(|_| DEFAULT_NEWS_ENDPOINT.to_string()),
            env::var(NEWS_API_KEY_ENV).ok(),
        )
    }
}

#[async_trait]
impl ArticleSource for NewsClient {
    async fn search(&self, params: &SearchParams) -> Result<Vec<NewsArticle>> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                Error::tool(format!("news API key is not configured ({NEWS_API_KEY_ENV})"))
            })?;

        let mut query: Vec<(&str, String)> = vec![
            ("q", params.query.clone()),
            (
                "language",
                params.language.clone().unwrap_or_else(|| "en".to_string()),
            ),
            (
                "sortBy",
                params
                    .sort_by
                    .clone()
                    .unwrap_or_else(|| "publishedAt".to_string()),
            ),
            ("pageSize", MAX_ARTICLES.to_string()),
        ];
        if let Some(from) = &params.from_date {
            query.push(("from", from.clone()));
        }
        if let Some(to) = &params.to_date {
            query.push(("to", to.clone()));
        }

        debug!(query = %params.query, "searching news");

        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&query)
            .header("X-Api-Key", api_key)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error (failed to read response body)".to_string());
            return Err(Error::upstream_http(status.as_u16(), body));
        }

        let body = response.text().await.map_err(Error::Transport)?;
        let payload: NewsResponse = serde_json::from_str(&body)?;

        if payload.status == "ok" {
            if let Some(articles) = payload.articles {
                return Ok(articles);
            }
        }
        Err(Error::upstream_api(
            payload.code.unwrap_or_else(|| "error".to_string()),
            payload
                .message
                .unwrap_or_else(|| "Failed to fetch news articles".to_string()),
        ))
    }
}

/// Render search results as the model consumes them.
///
/// Results beyond [`MAX_ARTICLES`] are dropped to bound prompt size.
pub fn format_articles(articles: &[NewsArticle]) -> String {
    let shown = &articles[..articles.len().min(MAX_ARTICLES)];
    let formatted: Vec<String> = shown
        .iter()
        .enumerate()
        .map(|(index, article)| {
            format!(
                "{}. **{}**\n   Source: {}\n   Published: {}\n   Description: {}\n   URL: {}\n",
                index + 1,
                article.title,
                article.source.name,
                format_publication_date(&article.published_at),
                article
                    .description
                    .as_deref()
                    .unwrap_or("No description available"),
                article.url,
            )
        })
        .collect();
    format!(
        "Found {} news articles:\n\n{}",
        shown.len(),
        formatted.join("\n")
    )
}

// Backends report RFC 3339 timestamps; anything else passes through raw.
fn format_publication_date(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(timestamp) => timestamp.format("%Y-%m-%d").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Build the `search_news` registry entry backed by the given source
pub fn news_tool(source: Arc<dyn ArticleSource>) -> RegisteredTool {
    tool(
        "search_news",
        "Search for news articles from various sources. Use this when the user asks about \
         recent news, current events, or specific topics in the news. Returns relevant news \
         articles with titles, descriptions, and sources.",
    )
    .required_param(
        "query",
        ParameterType::String,
        "The search query or keywords to find relevant news articles. For example: \
         'artificial intelligence', 'climate change', 'sports news'",
    )
    .param(
        "fromDate",
        ParameterType::String,
        "Optional: The start date for articles in ISO 8601 format (YYYY-MM-DD). Only \
         articles published after this date will be returned.",
    )
    .param(
        "toDate",
        ParameterType::String,
        "Optional: The end date for articles in ISO 8601 format (YYYY-MM-DD). Only \
         articles published before this date will be returned.",
    )
    .enum_param(
        "language",
        "Optional: The language code for articles (e.g., 'en' for English, 'ko' for \
         Korean). Defaults to 'en'.",
        ["ar", "de", "en", "es", "fr", "he", "it", "nl", "no", "pt", "ru", "sv", "zh"],
    )
    .enum_param(
        "sortBy",
        "Optional: How to sort the articles. 'relevancy' = most relevant first, \
         'popularity' = most popular first, 'publishedAt' = newest first. Defaults to \
         'publishedAt'.",
        ["relevancy", "popularity", "publishedAt"],
    )
    .build(move |args| {
        let source = source.clone();
        async move {
            let params: SearchParams = serde_json::from_value(args)?;
            let articles = source.search(&params).await?;
            Ok(format_articles(&articles))
        }
    })
}

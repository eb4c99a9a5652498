use async_trait::async_trait;
use pulse_core::{NewsArticle, NewsProvider, ProviderKind, PulseError};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://newsapi.org";
const LANGUAGE: &str = "en";

#[derive(Clone)]
pub struct NewsApiClient {
    api_key: String,
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl NewsApiClient {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self {
            api_key,
            client: crate::http_client(timeout),
            base_url: BASE_URL.to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Search everything for `query`, newest first
    pub async fn search(&self, query: &str, page_size: usize) -> Result<Vec<NewsArticle>, PulseError> {
        let url = format!("{}/v2/everything", self.base_url);
        let page_size_param = page_size.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("language", LANGUAGE),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size_param.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| crate::transport_error(ProviderKind::News, self.timeout, e))?;

        let body = crate::read_body(ProviderKind::News, self.timeout, response).await?;
        let mut articles = parse_articles(&body)?;
        articles.truncate(page_size);
        Ok(articles)
    }
}

#[async_trait]
impl NewsProvider for NewsApiClient {
    async fn latest_news(&self, query: &str, limit: usize) -> Result<Vec<NewsArticle>, PulseError> {
        self.search(query, limit).await
    }

    fn name(&self) -> &'static str {
        "newsapi"
    }
}

/// Decode an `/v2/everything` payload.
pub fn parse_articles(body: &str) -> Result<Vec<NewsArticle>, PulseError> {
    let parsed: EverythingResponse = serde_json::from_str(body)
        .map_err(|e| PulseError::NewsProvider(format!("unreadable response: {}", e)))?;

    if parsed.status != "ok" {
        return Err(PulseError::NewsProvider(format!(
            "{}: {}",
            parsed.code.unwrap_or_else(|| parsed.status.clone()),
            parsed.message.unwrap_or_default()
        )));
    }

    Ok(parsed
        .articles
        .into_iter()
        .map(|a| NewsArticle {
            title: a.title.unwrap_or_default(),
            description: a.description,
            url: a.url.unwrap_or_default(),
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<ArticleResult>,
}

#[derive(Debug, Deserialize)]
struct ArticleResult {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
}

use async_trait::async_trait;
use crate::{LlmRequest, NewsArticle, PricePoint, PulseError};

/// Source of daily closing prices
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Daily closes for `symbol` in whatever order the provider returns them.
    ///
    /// An empty or missing series is reported as `PulseError::PriceUnavailable`.
    async fn daily_closes(&self, symbol: &str) -> Result<Vec<PricePoint>, PulseError>;

    fn name(&self) -> &'static str;
}

/// Source of recent news articles
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Up to `limit` articles matching `query`, newest first.
    async fn latest_news(&self, query: &str, limit: usize) -> Result<Vec<NewsArticle>, PulseError>;

    fn name(&self) -> &'static str;
}

/// Text-generation backend
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generated text of the first candidate; empty when the model produced none.
    async fn generate(&self, request: &LlmRequest) -> Result<String, PulseError>;

    fn name(&self) -> &'static str;
}

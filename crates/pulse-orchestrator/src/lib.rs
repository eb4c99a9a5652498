use pulse_core::{
    momentum_from_points, recent_window, LlmProvider, LlmRequest, NewsArticle, NewsProvider,
    PriceProvider, PricePoint, ProviderKind, PulseError, PulseResponse, StockHistory,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub mod prompt;
pub mod verdict;

pub use verdict::LlmVerdict;

const MAX_TICKER_LEN: usize = 12;

/// Tunables for the pulse pipeline
#[derive(Debug, Clone)]
pub struct PulseSettings {
    /// Trading days fed into the momentum calculation
    pub lookback_days: usize,
    /// Trading days returned by `stock_history`
    pub history_days: usize,
    pub news_limit: usize,
    /// Upper bound on each outbound provider call
    pub provider_timeout: Duration,
    /// Scan prose for a pulse word when the model ignores the JSON format
    pub keyword_fallback: bool,
}

impl Default for PulseSettings {
    fn default() -> Self {
        Self {
            lookback_days: 6,
            history_days: 7,
            news_limit: 5,
            provider_timeout: Duration::from_secs(10),
            keyword_fallback: false,
        }
    }
}

/// Uppercase a ticker and reject anything that cannot be a listed symbol.
pub fn normalize_ticker(raw: &str) -> Result<String, PulseError> {
    let ticker = raw.trim().to_ascii_uppercase();

    if ticker.is_empty() {
        return Err(PulseError::InvalidInput("Ticker is required".to_string()));
    }
    if ticker.len() > MAX_TICKER_LEN
        || !ticker.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(PulseError::InvalidInput(format!("Invalid ticker symbol: {}", raw.trim())));
    }

    Ok(ticker)
}

/// Runs the price + news + LLM pipeline for one ticker per call.
pub struct PulseOrchestrator {
    price: Arc<dyn PriceProvider>,
    news: Arc<dyn NewsProvider>,
    llm: Arc<dyn LlmProvider>,
    settings: PulseSettings,
}

impl PulseOrchestrator {
    pub fn new(
        price: Arc<dyn PriceProvider>,
        news: Arc<dyn NewsProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            price,
            news,
            llm,
            settings: PulseSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: PulseSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Await `call`, giving up once the provider timeout elapses.
    async fn bounded<T, F>(&self, kind: ProviderKind, call: F) -> Result<T, PulseError>
    where
        F: Future<Output = Result<T, PulseError>>,
    {
        match tokio::time::timeout(self.settings.provider_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    "{} provider did not answer within {:?}",
                    kind,
                    self.settings.provider_timeout
                );
                Err(PulseError::ProviderTimeout {
                    provider: kind,
                    seconds: self.settings.provider_timeout.as_secs(),
                })
            }
        }
    }

    async fn fetch_prices(&self, ticker: &str) -> Result<Vec<PricePoint>, PulseError> {
        self.bounded(ProviderKind::Price, self.price.daily_closes(ticker))
            .await
            .inspect_err(|e| {
                tracing::error!("Price fetch for {} via {} failed: {}", ticker, self.price.name(), e)
            })
    }

    /// Latest headlines; any failure degrades to a single placeholder article.
    async fn fetch_news(&self, ticker: &str) -> Vec<NewsArticle> {
        match self
            .bounded(ProviderKind::News, self.news.latest_news(ticker, self.settings.news_limit))
            .await
        {
            Ok(mut articles) => {
                articles.truncate(self.settings.news_limit);
                articles
            }
            Err(e) => {
                tracing::warn!("News fetch for {} via {} failed: {}", ticker, self.news.name(), e);
                vec![NewsArticle::placeholder(ticker)]
            }
        }
    }

    async fn generate(&self, request: LlmRequest) -> Result<String, PulseError> {
        self.bounded(ProviderKind::Llm, self.llm.generate(&request))
            .await
            .inspect_err(|e| tracing::error!("LLM call via {} failed: {}", self.llm.name(), e))
    }

    /// Momentum, headlines and an LLM sentiment verdict for `ticker`.
    pub async fn market_pulse(&self, ticker: &str) -> Result<PulseResponse, PulseError> {
        let ticker = normalize_ticker(ticker)?;
        tracing::info!("Building market pulse for {}", ticker);

        let (prices, news) = tokio::join!(self.fetch_prices(&ticker), self.fetch_news(&ticker));
        let prices = prices?;

        let as_of = prices
            .iter()
            .map(|p| p.date)
            .max()
            .ok_or_else(|| PulseError::PriceUnavailable(format!("{}: empty price series", ticker)))?;
        let momentum = momentum_from_points(&prices, self.settings.lookback_days)?;

        tracing::debug!(
            "{} momentum over {} returns: score={}",
            ticker,
            momentum.returns.len(),
            momentum.score
        );

        let request = LlmRequest::json(prompt::pulse_prompt(&ticker, &momentum, &news))
            .with_system_instruction(prompt::ANALYST_INSTRUCTION);
        let text = self.generate(request).await?;
        let verdict = verdict::parse_verdict(&text, self.settings.keyword_fallback)
            .inspect_err(|e| tracing::error!("Could not parse pulse for {}: {}", ticker, e))?;

        tracing::info!("Market pulse for {}: {}", ticker, verdict.pulse);

        Ok(PulseResponse {
            ticker,
            as_of,
            momentum,
            news,
            pulse: verdict.pulse,
            llm_explanation: verdict.explanation,
        })
    }

    /// Free-text sentiment narrative for `ticker`, without price or news data.
    pub async fn explain(&self, ticker: &str) -> Result<String, PulseError> {
        let ticker = normalize_ticker(ticker)?;
        tracing::info!("Requesting narrative for {}", ticker);

        let text = self.generate(LlmRequest::text(prompt::explain_prompt(&ticker))).await?;
        Ok(non_empty_or(text, "No explanation returned."))
    }

    /// The most recent closes for `ticker`, oldest first.
    pub async fn stock_history(&self, ticker: &str) -> Result<StockHistory, PulseError> {
        let ticker = normalize_ticker(ticker)?;
        let prices = self.fetch_prices(&ticker).await?;

        let history = recent_window(&prices, self.settings.history_days);
        if history.is_empty() {
            return Err(PulseError::PriceUnavailable(format!("{}: empty price series", ticker)));
        }

        Ok(StockHistory { ticker, history })
    }

    /// Trend commentary on a caller-supplied price history.
    pub async fn history_insight(&self, history: &[PricePoint]) -> Result<String, PulseError> {
        if history.is_empty() {
            return Err(PulseError::InvalidInput("history must contain at least one price".to_string()));
        }

        let text = self.generate(LlmRequest::text(prompt::insight_prompt(history))).await?;
        Ok(non_empty_or(text, "No insights returned."))
    }
}

fn non_empty_or(text: String, fallback: &str) -> String {
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text
    }
}

//! Prompt text sent to the LLM provider.

use pulse_core::{MomentumResult, NewsArticle, PricePoint};

pub const ANALYST_INSTRUCTION: &str = "You are a stock sentiment analyst. \
Reply with a single JSON object and nothing else.";

/// Prompt asking for a pulse label plus rationale as JSON.
pub fn pulse_prompt(ticker: &str, momentum: &MomentumResult, news: &[NewsArticle]) -> String {
    let returns = momentum
        .returns
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let headlines = if news.is_empty() {
        "(no recent headlines)".to_string()
    } else {
        news.iter()
            .enumerate()
            .map(|(i, article)| format!("{}. {}", i + 1, article.headline()))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Based on the momentum score and recent headlines, decide if the stock pulse is bullish, neutral, or bearish.\n\
         \n\
         Ticker: {ticker}\n\
         {days}-day momentum returns: {returns}\n\
         Momentum score: {score}\n\
         \n\
         Latest headlines:\n\
         {headlines}\n\
         \n\
         Respond with JSON like:\n\
         {{\"pulse\": \"bullish\", \"llm_explanation\": \"...\"}}\n",
        ticker = ticker,
        days = momentum.returns.len(),
        returns = returns,
        score = momentum.score,
        headlines = headlines,
    )
}

/// Plain-language sentiment summary with no market data attached.
pub fn explain_prompt(ticker: &str) -> String {
    format!(
        "You are a stock market expert. Provide a short, insightful explanation of the current \
         market sentiment and key highlights for the stock symbol \"{}\". Be concise and explain \
         in simple terms.\n\nDo not include financial advice. Use plain English, no jargon.\n",
        ticker
    )
}

/// Trend commentary on a caller-supplied price history.
pub fn insight_prompt(history: &[PricePoint]) -> String {
    let series = serde_json::to_string(history).unwrap_or_else(|_| "[]".to_string());
    format!(
        "Analyze this stock price history:\n{}\n\nWhat trends do you observe? Any predictions or insights?\n",
        series
    )
}

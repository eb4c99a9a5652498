use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single daily close
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Day-over-day returns plus their mean
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentumResult {
    /// Fractional returns, oldest to newest (0.10 == 10%)
    pub returns: Vec<f64>,
    pub score: f64,
}

/// News article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub description: Option<String>,
    pub url: String,
}

impl NewsArticle {
    /// Stand-in article used when the news provider cannot be reached.
    pub fn placeholder(ticker: &str) -> Self {
        Self {
            title: format!("No live news available for {}", ticker),
            description: Some("Default fallback used due to news API error.".to_string()),
            url: String::new(),
        }
    }

    /// `title - description`, or just the title when there is no description
    pub fn headline(&self) -> String {
        match self.description.as_deref() {
            Some(desc) if !desc.trim().is_empty() => format!("{} - {}", self.title, desc),
            _ => self.title.clone(),
        }
    }
}

/// Sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pulse {
    Bullish,
    Neutral,
    Bearish,
}

impl Pulse {
    pub const ALL: [Pulse; 3] = [Pulse::Bullish, Pulse::Neutral, Pulse::Bearish];

    pub fn as_str(&self) -> &'static str {
        match self {
            Pulse::Bullish => "bullish",
            Pulse::Neutral => "neutral",
            Pulse::Bearish => "bearish",
        }
    }

    /// Map a free-form label onto the three known values. Anything
    /// unrecognized becomes `Neutral`.
    pub fn normalize(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "bullish" => Pulse::Bullish,
            "bearish" => Pulse::Bearish,
            _ => Pulse::Neutral,
        }
    }
}

impl std::fmt::Display for Pulse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregated market pulse for one ticker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulseResponse {
    pub ticker: String,
    pub as_of: NaiveDate,
    pub momentum: MomentumResult,
    pub news: Vec<NewsArticle>,
    pub pulse: Pulse,
    pub llm_explanation: String,
}

/// Recent closes for a ticker, oldest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockHistory {
    pub ticker: String,
    pub history: Vec<PricePoint>,
}

/// A single text-generation call
#[derive(Debug, Clone, Default)]
pub struct LlmRequest {
    pub prompt: String,
    pub system_instruction: Option<String>,
    /// Ask the model to emit a JSON document instead of prose
    pub json_output: bool,
}

impl LlmRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn json(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            json_output: true,
            ..Default::default()
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }
}

use thiserror::Error;

/// Which upstream service a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Price,
    News,
    Llm,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Price => write!(f, "price"),
            ProviderKind::News => write!(f, "news"),
            ProviderKind::Llm => write!(f, "llm"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The price provider answered but carried no time series
    /// (unknown symbol or exhausted quota).
    #[error("Invalid ticker or API limit reached: {0}")]
    PriceUnavailable(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Price provider error: {0}")]
    PriceProvider(String),

    #[error("News provider error: {0}")]
    NewsProvider(String),

    #[error("LLM provider error: {0}")]
    LlmProvider(String),

    #[error("{provider} provider timed out after {seconds}s")]
    ProviderTimeout { provider: ProviderKind, seconds: u64 },

    #[error("Malformed LLM response: {0}")]
    MalformedLlmResponse(String),
}

impl PulseError {
    /// Build the transport-level error variant for a provider.
    pub fn provider(kind: ProviderKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ProviderKind::Price => PulseError::PriceProvider(message),
            ProviderKind::News => PulseError::NewsProvider(message),
            ProviderKind::Llm => PulseError::LlmProvider(message),
        }
    }

    /// True when the failure was caused by what the caller sent rather than
    /// by this server or an upstream outage.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PulseError::InvalidInput(_)
                | PulseError::PriceUnavailable(_)
                | PulseError::InsufficientData(_)
        )
    }
}

pub type PulseResult<T> = Result<T, PulseError>;

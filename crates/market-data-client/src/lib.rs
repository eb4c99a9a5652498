//! HTTP clients for the daily price series (Alpha Vantage) and news search
//! (NewsAPI) providers.

pub mod alpha_vantage;
pub mod news_api;

pub use alpha_vantage::AlphaVantageClient;
pub use news_api::NewsApiClient;

#[cfg(test)]
mod http_tests;

use pulse_core::{ProviderKind, PulseError};
use reqwest::Client;
use std::time::Duration;

/// Sent on every request; NewsAPI rejects calls without a User-Agent.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub(crate) fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Turn a reqwest failure into the provider's error, keeping timeouts distinct.
pub(crate) fn transport_error(kind: ProviderKind, timeout: Duration, err: reqwest::Error) -> PulseError {
    if err.is_timeout() {
        PulseError::ProviderTimeout {
            provider: kind,
            seconds: timeout.as_secs(),
        }
    } else {
        PulseError::provider(kind, err.to_string())
    }
}

/// Read the body of a successful response, or describe the failed one.
pub(crate) async fn read_body(
    kind: ProviderKind,
    timeout: Duration,
    response: reqwest::Response,
) -> Result<String, PulseError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(kind, timeout, e))?;

    if !status.is_success() {
        return Err(PulseError::provider(kind, format!("HTTP {}: {}", status, body)));
    }

    Ok(body)
}

use async_trait::async_trait;
use chrono::NaiveDate;
use pulse_core::{PriceProvider, PricePoint, ProviderKind, PulseError};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const BASE_URL: &str = "https://www.alphavantage.co";
const DAILY_FUNCTION: &str = "TIME_SERIES_DAILY";

#[derive(Clone)]
pub struct AlphaVantageClient {
    api_key: String,
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl AlphaVantageClient {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self {
            api_key,
            client: crate::http_client(timeout),
            base_url: BASE_URL.to_string(),
            timeout,
        }
    }

    /// Point the client at another host (proxy or local stub).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the daily close series for a symbol, newest first
    pub async fn get_daily_series(&self, symbol: &str) -> Result<Vec<PricePoint>, PulseError> {
        let url = format!("{}/query", self.base_url);

        tracing::debug!("Fetching {} for {}", DAILY_FUNCTION, symbol);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("function", DAILY_FUNCTION),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| crate::transport_error(ProviderKind::Price, self.timeout, e))?;

        let body = crate::read_body(ProviderKind::Price, self.timeout, response).await?;
        parse_daily_series(symbol, &body)
    }
}

#[async_trait]
impl PriceProvider for AlphaVantageClient {
    async fn daily_closes(&self, symbol: &str) -> Result<Vec<PricePoint>, PulseError> {
        self.get_daily_series(symbol).await
    }

    fn name(&self) -> &'static str {
        "alpha_vantage"
    }
}

/// Decode a `TIME_SERIES_DAILY` payload into closes sorted newest first.
///
/// A payload without the series key means the symbol is unknown or the
/// quota is spent; the provider explains which in `Note`, `Information`
/// or `Error Message`.
pub fn parse_daily_series(symbol: &str, body: &str) -> Result<Vec<PricePoint>, PulseError> {
    let parsed: DailySeriesResponse = serde_json::from_str(body)
        .map_err(|e| PulseError::PriceProvider(format!("unreadable response: {}", e)))?;

    let series = match parsed.time_series {
        Some(series) if !series.is_empty() => series,
        _ => {
            let reason = parsed
                .error_message
                .or(parsed.note)
                .or(parsed.information)
                .unwrap_or_else(|| "no daily time series returned".to_string());
            tracing::warn!("Alpha Vantage returned no series for {}: {}", symbol, reason);
            return Err(PulseError::PriceUnavailable(format!("{}: {}", symbol, reason)));
        }
    };

    let mut points = series
        .into_iter()
        .map(|(date, bar)| {
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|e| PulseError::InvalidData(format!("bad date '{}': {}", date, e)))?;
            let close: f64 = bar
                .close
                .trim()
                .parse()
                .map_err(|_| PulseError::InvalidData(format!("bad close '{}' on {}", bar.close, date)))?;
            if !close.is_finite() || close <= 0.0 {
                return Err(PulseError::InvalidData(format!("non-positive close {} on {}", close, date)));
            }
            Ok(PricePoint { date, close })
        })
        .collect::<Result<Vec<_>, PulseError>>()?;

    points.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(points)
}

#[derive(Debug, Deserialize)]
struct DailySeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<HashMap<String, DailyBar>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyBar {
    #[serde(rename = "4. close")]
    close: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "Meta Data": {
            "1. Information": "Daily Prices (open, high, low, close) and Volumes",
            "2. Symbol": "IBM"
        },
        "Time Series (Daily)": {
            "2024-05-08": {"1. open": "168.0", "2. high": "170.1", "3. low": "167.5", "4. close": "169.9000", "5. volume": "1000"},
            "2024-05-10": {"1. open": "167.0", "2. high": "168.2", "3. low": "166.0", "4. close": "167.1500", "5. volume": "1200"},
            "2024-05-09": {"1. open": "169.0", "2. high": "169.5", "3. low": "166.9", "4. close": "167.0000", "5. volume": "900"}
        }
    }"#;

    #[test]
    fn test_parse_sorts_newest_first() {
        let points = parse_daily_series("IBM", SAMPLE).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());
        assert_eq!(points[0].close, 167.15);
        assert_eq!(points[2].date, NaiveDate::from_ymd_opt(2024, 5, 8).unwrap());
    }

    #[test]
    fn test_missing_series_is_price_unavailable() {
        let body = r#"{"Error Message": "Invalid API call. Please retry or visit the documentation."}"#;
        let err = parse_daily_series("NOPE", body).unwrap_err();
        match err {
            PulseError::PriceUnavailable(msg) => assert!(msg.contains("Invalid API call")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_quota_note_is_price_unavailable() {
        let body = r#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#;
        let err = parse_daily_series("IBM", body).unwrap_err();
        assert!(matches!(err, PulseError::PriceUnavailable(_)));
    }

    #[test]
    fn test_bad_close_is_invalid_data() {
        let body = r#"{"Time Series (Daily)": {"2024-05-10": {"4. close": "n/a"}}}"#;
        let err = parse_daily_series("IBM", body).unwrap_err();
        assert!(matches!(err, PulseError::InvalidData(_)));
    }

    #[test]
    fn test_non_json_body_is_provider_error() {
        let err = parse_daily_series("IBM", "<html>gateway</html>").unwrap_err();
        assert!(matches!(err, PulseError::PriceProvider(_)));
    }
}

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pulse_core::PulseError;
use serde::Serialize;

/// JSON body returned for every failed request
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Handler error carrying the HTTP status it maps to
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<String>,
}

impl AppError {
    pub fn bad_request(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: error.into(),
            details,
        }
    }
}

impl From<PulseError> for AppError {
    fn from(err: PulseError) -> Self {
        let details = Some(err.to_string());
        let (status, error) = match &err {
            PulseError::InvalidInput(msg) => {
                return Self::bad_request(msg.clone(), None);
            }
            PulseError::PriceUnavailable(_) => {
                (StatusCode::BAD_REQUEST, "Invalid ticker or API limit reached")
            }
            PulseError::InsufficientData(_) => {
                (StatusCode::BAD_REQUEST, "Not enough price history to compute momentum")
            }
            PulseError::InvalidData(_) => {
                (StatusCode::BAD_GATEWAY, "Price provider returned unusable data")
            }
            PulseError::PriceProvider(_) => (StatusCode::BAD_GATEWAY, "Failed to fetch stock data"),
            PulseError::NewsProvider(_) => (StatusCode::BAD_GATEWAY, "Failed to fetch news"),
            PulseError::LlmProvider(_) => (StatusCode::BAD_GATEWAY, "Failed to fetch LLM analysis"),
            PulseError::ProviderTimeout { .. } => {
                (StatusCode::GATEWAY_TIMEOUT, "Upstream provider timed out")
            }
            PulseError::MalformedLlmResponse(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to parse LLM response")
            }
        };

        Self {
            status,
            error: error.to_string(),
            details,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("Invalid request body", Some(rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request("Invalid query string", Some(rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let details = self.details.as_deref().unwrap_or("");
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "{} {}", self.error, details);
        } else {
            tracing::warn!(status = %self.status, "{} {}", self.error, details);
        }

        (
            self.status,
            Json(ErrorBody {
                error: self.error,
                details: self.details,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::ProviderKind;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (PulseError::InvalidInput("Ticker is required".into()), StatusCode::BAD_REQUEST),
            (PulseError::PriceUnavailable("X".into()), StatusCode::BAD_REQUEST),
            (PulseError::InsufficientData("1 price".into()), StatusCode::BAD_REQUEST),
            (PulseError::PriceProvider("503".into()), StatusCode::BAD_GATEWAY),
            (PulseError::LlmProvider("401".into()), StatusCode::BAD_GATEWAY),
            (
                PulseError::ProviderTimeout { provider: ProviderKind::Price, seconds: 10 },
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (PulseError::MalformedLlmResponse("eof".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status, expected);
        }
    }

    #[test]
    fn test_invalid_input_keeps_message() {
        let err = AppError::from(PulseError::InvalidInput("Ticker is required".into()));
        assert_eq!(err.error, "Ticker is required");
        assert!(err.details.is_none());
    }
}

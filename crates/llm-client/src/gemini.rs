use async_trait::async_trait;
use pulse_core::{LlmProvider, LlmRequest, ProviderKind, PulseError};
use serde::{Deserialize, Serialize};

use crate::LlmConfig;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_request(request: &'a LlmRequest) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part { text: &request.prompt }],
            }],
            system_instruction: request.system_instruction.as_deref().map(|text| Content {
                parts: vec![Part { text }],
            }),
            generation_config: request.json_output.then_some(GenerationConfig {
                response_mime_type: "application/json",
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Client for the Gemini `generateContent` endpoint
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl GeminiClient {
    pub fn new(config: LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(crate::USER_AGENT)
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn timeout_error(&self) -> PulseError {
        PulseError::ProviderTimeout {
            provider: ProviderKind::Llm,
            seconds: self.config.timeout.as_secs(),
        }
    }

    /// Generate content for a prompt
    pub async fn generate_content(&self, request: &LlmRequest) -> Result<String, PulseError> {
        let body = GenerateContentRequest::from_request(request);

        tracing::debug!(
            "Sending {} prompt chars to {} (json_output={})",
            request.prompt.len(),
            self.config.model,
            request.json_output
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.timeout_error()
                } else {
                    PulseError::LlmProvider(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                self.timeout_error()
            } else {
                PulseError::LlmProvider(e.to_string())
            }
        })?;

        if !status.is_success() {
            return Err(PulseError::LlmProvider(format!("HTTP {}: {}", status, text)));
        }

        extract_text(&text)
    }
}

#[async_trait]
impl LlmProvider for GeminiClient {
    async fn generate(&self, request: &LlmRequest) -> Result<String, PulseError> {
        self.generate_content(request).await
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// Text of the first candidate, with its parts joined.
///
/// Returns an empty string when no candidate carries text, and an error when
/// the prompt itself was blocked.
pub fn extract_text(body: &str) -> Result<String, PulseError> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| PulseError::LlmProvider(format!("unreadable response: {}", e)))?;

    if parsed.candidates.is_empty() {
        if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(PulseError::LlmProvider(format!("prompt blocked: {}", reason)));
        }
    }

    Ok(parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_first_candidate_text() {
        let body = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "{\"pulse\": "}, {"text": "\"bullish\"}"}]}, "finishReason": "STOP"},
                {"content": {"role": "model", "parts": [{"text": "ignored"}]}}
            ]
        }"#;
        assert_eq!(extract_text(body).unwrap(), "{\"pulse\": \"bullish\"}");
    }

    #[test]
    fn test_no_candidates_yields_empty_text() {
        assert_eq!(extract_text(r#"{"candidates": []}"#).unwrap(), "");
        assert_eq!(extract_text(r#"{}"#).unwrap(), "");
    }

    #[test]
    fn test_blocked_prompt_is_error() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let err = extract_text(body).unwrap_err();
        assert!(matches!(err, PulseError::LlmProvider(msg) if msg.contains("SAFETY")));
    }

    #[test]
    fn test_request_serialization() {
        let request = LlmRequest::json("hello").with_system_instruction("be terse");
        let body = GenerateContentRequest::from_request(&request);
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be terse");
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn test_endpoint_uses_model() {
        let client = GeminiClient::new(
            LlmConfig::new("key")
                .with_model("gemini-1.5-pro")
                .with_base_url("http://localhost:9000/"),
        );
        assert_eq!(
            client.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }
}

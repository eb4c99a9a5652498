//! Turning raw LLM output into a pulse label and explanation.

use pulse_core::{Pulse, PulseError};
use serde::Deserialize;

/// Pulse label plus the model's rationale
#[derive(Debug, Clone, PartialEq)]
pub struct LlmVerdict {
    pub pulse: Pulse,
    pub explanation: String,
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    pulse: Option<String>,
    llm_explanation: Option<String>,
    explanation: Option<String>,
}

/// The outermost `{ ... }` span, ignoring code fences or chatter around it.
fn json_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Decode `{"pulse": ..., "llm_explanation": ...}` from the model output.
///
/// Unknown pulse labels are normalized to neutral; a missing object or
/// missing field is a `MalformedLlmResponse`.
pub fn parse_structured(text: &str) -> Result<LlmVerdict, PulseError> {
    let span = json_object_span(text)
        .ok_or_else(|| PulseError::MalformedLlmResponse("no JSON object in model output".to_string()))?;

    let raw: RawVerdict = serde_json::from_str(span)
        .map_err(|e| PulseError::MalformedLlmResponse(e.to_string()))?;

    let label = raw
        .pulse
        .ok_or_else(|| PulseError::MalformedLlmResponse("missing field `pulse`".to_string()))?;
    let explanation = raw
        .llm_explanation
        .filter(|e| !e.trim().is_empty())
        .or(raw.explanation)
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| PulseError::MalformedLlmResponse("missing field `llm_explanation`".to_string()))?;

    let pulse = Pulse::normalize(&label);
    if !label.trim().eq_ignore_ascii_case(pulse.as_str()) {
        tracing::warn!("Model returned unknown pulse label '{}', using neutral", label);
    }

    Ok(LlmVerdict { pulse, explanation })
}

/// First sentiment word appearing in `text`, or neutral when none does.
pub fn scan_keywords(text: &str) -> Pulse {
    let lower = text.to_ascii_lowercase();
    Pulse::ALL
        .iter()
        .filter_map(|p| lower.find(p.as_str()).map(|idx| (idx, *p)))
        .min_by_key(|(idx, _)| *idx)
        .map(|(_, p)| p)
        .unwrap_or(Pulse::Neutral)
}

/// Structured parse, optionally falling back to a keyword scan of the prose.
pub fn parse_verdict(text: &str, keyword_fallback: bool) -> Result<LlmVerdict, PulseError> {
    match parse_structured(text) {
        Ok(verdict) => Ok(verdict),
        Err(err) if keyword_fallback => {
            tracing::warn!("Structured parse failed ({}), scanning text for a pulse label", err);
            let explanation = match text.trim() {
                "" => "No explanation returned.".to_string(),
                trimmed => trimmed.to_string(),
            };
            Ok(LlmVerdict {
                pulse: scan_keywords(text),
                explanation,
            })
        }
        Err(err) => Err(err),
    }
}

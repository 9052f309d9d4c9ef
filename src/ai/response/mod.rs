//! Result Parser
//!
//! Turns the raw model text into an [`AnalysisResult`].
//!
//! Explain and FindBugs responses pass through unchanged. Improve responses
//! are decoded as `{"improvedCode", "explanation"}`; when the model does not
//! honour the JSON shape the raw text is kept as markdown. That degradation is
//! logged, never returned as an error.

mod fences;

pub use fences::strip_code_fences;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::constants::messages::NO_EXPLANATION;
use crate::types::{AnalysisMode, AnalysisResult};

/// Outcome of decoding an Improve-mode response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuredOutcome {
    Parsed {
        improved_code: String,
        explanation: String,
    },
    /// The raw text, kept because it did not decode
    Unparsed(String),
}

#[derive(Debug, Deserialize)]
struct ImprovementPayload {
    #[serde(rename = "improvedCode", default)]
    improved_code: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
}

/// Decode an Improve-mode response without ever failing.
///
/// Missing or null fields decode as empty strings; anything that is not a
/// JSON object with string-valued fields is `Unparsed`.
pub fn decode_improvement(raw: &str) -> StructuredOutcome {
    let decoded = serde_json::from_str::<Value>(raw).and_then(|value| {
        if value.is_object() {
            serde_json::from_value::<ImprovementPayload>(value)
        } else {
            Err(serde::de::Error::custom("expected a JSON object"))
        }
    });

    match decoded {
        Ok(payload) => StructuredOutcome::Parsed {
            improved_code: payload.improved_code.unwrap_or_default(),
            explanation: payload.explanation.unwrap_or_default(),
        },
        Err(e) => {
            warn!("Failed to parse structured model response: {}", e);
            StructuredOutcome::Unparsed(raw.to_string())
        }
    }
}

/// Normalize a raw model response for `mode`
pub fn parse_response(mode: AnalysisMode, raw: &str) -> AnalysisResult {
    match mode {
        AnalysisMode::Explain | AnalysisMode::FindBugs => AnalysisResult::markdown_only(raw),
        AnalysisMode::Improve => match decode_improvement(raw) {
            StructuredOutcome::Parsed {
                improved_code,
                explanation,
            } => {
                let markdown = if explanation.is_empty() {
                    NO_EXPLANATION.to_string()
                } else {
                    explanation
                };
                let code = strip_code_fences(&improved_code);
                AnalysisResult {
                    markdown,
                    code: (!code.is_empty()).then_some(code),
                }
            }
            StructuredOutcome::Unparsed(text) => AnalysisResult::markdown_only(text),
        },
    }
}

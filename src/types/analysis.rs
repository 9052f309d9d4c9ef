//! Analysis request/response types shared by the pipeline, CLI and server.

use serde::{Deserialize, Serialize};

use super::error::{CodeLensError, Result};

/// Message shown when blank code is submitted
pub const EMPTY_INPUT_MESSAGE: &str = "Please enter some code to analyze.";

/// Analysis mode determining prompt shape and expected response structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AnalysisMode {
    /// Plain-language walkthrough of the snippet
    #[default]
    #[serde(rename = "Explain Code")]
    Explain,
    /// Refactor with structured `{improvedCode, explanation}` output
    #[serde(rename = "Improve Code")]
    Improve,
    /// Bugs, security issues and logic errors, plus corrected code
    #[serde(rename = "Find Bugs")]
    FindBugs,
}

impl AnalysisMode {
    pub const ALL: [AnalysisMode; 3] = [
        AnalysisMode::Explain,
        AnalysisMode::Improve,
        AnalysisMode::FindBugs,
    ];

    /// Wire label, also used as the stored history value
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisMode::Explain => "Explain Code",
            AnalysisMode::Improve => "Improve Code",
            AnalysisMode::FindBugs => "Find Bugs",
        }
    }

    /// Inverse of [`AnalysisMode::label`]; exact match only
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.label() == label)
    }
}

impl std::fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for AnalysisMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "explain" | "explain code" => Ok(AnalysisMode::Explain),
            "improve" | "improve code" => Ok(AnalysisMode::Improve),
            "bugs" | "find-bugs" | "find_bugs" | "find bugs" => Ok(AnalysisMode::FindBugs),
            _ => Err(format!(
                "Unknown analysis mode: {}. Valid values: explain, improve, bugs",
                s
            )),
        }
    }
}

/// A validated analysis submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    code: String,
    mode: AnalysisMode,
}

impl AnalysisRequest {
    /// Build a request, rejecting blank code.
    ///
    /// The code is kept verbatim; trimming is only used for the emptiness check.
    pub fn new(code: impl Into<String>, mode: AnalysisMode) -> Result<Self> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(CodeLensError::Validation(EMPTY_INPUT_MESSAGE.to_string()));
        }
        Ok(Self { code, mode })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }
}

/// Normalized analysis output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Explanatory markdown, always present
    pub markdown: String,
    /// Replacement code; only for Improve mode when structured parsing succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl AnalysisResult {
    pub fn markdown_only(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            code: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_wire_labels() {
        assert_eq!(
            serde_json::to_string(&AnalysisMode::FindBugs).unwrap(),
            "\"Find Bugs\""
        );
        let mode: AnalysisMode = serde_json::from_str("\"Improve Code\"").unwrap();
        assert_eq!(mode, AnalysisMode::Improve);
    }

    #[test]
    fn test_from_label_is_exact() {
        for mode in AnalysisMode::ALL {
            assert_eq!(AnalysisMode::from_label(mode.label()), Some(mode));
        }
        assert_eq!(AnalysisMode::from_label("find bugs"), None);
    }

    #[test]
    fn test_mode_from_str_aliases() {
        assert_eq!("explain".parse::<AnalysisMode>(), Ok(AnalysisMode::Explain));
        assert_eq!("Find Bugs".parse::<AnalysisMode>(), Ok(AnalysisMode::FindBugs));
        assert_eq!("find-bugs".parse::<AnalysisMode>(), Ok(AnalysisMode::FindBugs));
        assert_eq!("IMPROVE".parse::<AnalysisMode>(), Ok(AnalysisMode::Improve));
        assert!("lint".parse::<AnalysisMode>().is_err());
    }

    #[test]
    fn test_request_rejects_blank_code() {
        for blank in ["", "   ", "\n\t  \n"] {
            let err = AnalysisRequest::new(blank, AnalysisMode::Explain).unwrap_err();
            assert!(matches!(err, CodeLensError::Validation(_)));
            assert_eq!(err.to_string(), EMPTY_INPUT_MESSAGE);
        }
    }

    #[test]
    fn test_request_keeps_code_verbatim() {
        let request = AnalysisRequest::new("  x = 1\n", AnalysisMode::Improve).unwrap();
        assert_eq!(request.code(), "  x = 1\n");
        assert_eq!(request.mode(), AnalysisMode::Improve);
    }

    #[test]
    fn test_result_omits_absent_code() {
        let json = serde_json::to_value(AnalysisResult::markdown_only("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"markdown": "hi"}));
    }
}

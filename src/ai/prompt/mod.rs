//! Prompt Builder
//!
//! Pure construction of the model request for each [`AnalysisMode`]:
//! prompt text, system instruction and (for Improve only) the structured
//! output schema.
//!
//! Each mode maps to one row of [`MODE_PROMPTS`]; adding a mode means adding
//! a row, and the table test fails until the row is present in the right slot.

mod callable;

pub use callable::build_callable_prompt;

use serde_json::{Value, json};

use crate::ai::provider::GenerationRequest;
use crate::constants::llm::ANALYSIS_TEMPERATURE;
use crate::types::AnalysisMode;

/// Base system instruction shared by every mode
pub const BASE_SYSTEM_INSTRUCTION: &str = "You are a world-class senior software engineer and code mentor. Your goal is to provide helpful, concise, and accurate analysis of code snippets.";

/// Appended to the base instruction in FindBugs mode
pub const SAFETY_DIRECTIVE: &str = " Focus strictly on correctness and safety.";

/// Field names of the Improve-mode structured response
pub const IMPROVED_CODE_FIELD: &str = "improvedCode";
pub const EXPLANATION_FIELD: &str = "explanation";

/// Fully built prompt for one analysis
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPrompt {
    pub text: String,
    pub system_instruction: String,
    /// Structured output schema; `Some` only for Improve
    pub schema: Option<Value>,
}

impl AnalysisPrompt {
    /// Convert into a generation request at the fixed analysis temperature
    pub fn into_request(self) -> GenerationRequest {
        GenerationRequest::new(self.text, self.system_instruction)
            .with_temperature(ANALYSIS_TEMPERATURE)
            .with_schema(self.schema)
    }
}

/// One row of the mode table
pub struct ModePrompt {
    pub mode: AnalysisMode,
    template: fn(&str) -> String,
    system_suffix: Option<&'static str>,
    schema: Option<fn() -> Value>,
}

/// Indexed by `AnalysisMode as usize`
pub const MODE_PROMPTS: [ModePrompt; 3] = [
    ModePrompt {
        mode: AnalysisMode::Explain,
        template: explain_template,
        system_suffix: None,
        schema: None,
    },
    ModePrompt {
        mode: AnalysisMode::Improve,
        template: improve_template,
        system_suffix: None,
        schema: Some(improvement_schema),
    },
    ModePrompt {
        mode: AnalysisMode::FindBugs,
        template: find_bugs_template,
        system_suffix: Some(SAFETY_DIRECTIVE),
        schema: None,
    },
];

/// Build the prompt, system instruction and optional schema for `mode`
pub fn build_prompt(code: &str, mode: AnalysisMode) -> AnalysisPrompt {
    let row = &MODE_PROMPTS[mode as usize];

    let mut system_instruction = BASE_SYSTEM_INSTRUCTION.to_string();
    if let Some(suffix) = row.system_suffix {
        system_instruction.push_str(suffix);
    }

    AnalysisPrompt {
        text: (row.template)(code),
        system_instruction,
        schema: row.schema.map(|schema| schema()),
    }
}

/// Schema for `{"improvedCode": string, "explanation": string}`, both required
pub fn improvement_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            IMPROVED_CODE_FIELD: { "type": "STRING" },
            EXPLANATION_FIELD: { "type": "STRING" }
        },
        "required": [IMPROVED_CODE_FIELD, EXPLANATION_FIELD]
    })
}

fn explain_template(code: &str) -> String {
    format!(
        "Explain the following code snippet in simple, easy-to-understand terms. Break down complex parts. Code:\n\n{}",
        code
    )
}

fn find_bugs_template(code: &str) -> String {
    format!(
        "Analyze the following code for potential bugs, security vulnerabilities, and logical errors. If bugs are found, explain them and provide the corrected code. Code:\n\n{}",
        code
    )
}

fn improve_template(code: &str) -> String {
    format!(
        r#"Review the following code and suggest improvements for performance, readability, and best practices. Refactor the code.

IMPORTANT: Return the response in JSON format with two fields:
1. "{}": The complete refactored code. Do NOT wrap this in markdown code blocks. Just the raw code.
2. "{}": A concise markdown explanation of the changes and why they were made.

Code to improve:
{}"#,
        IMPROVED_CODE_FIELD, EXPLANATION_FIELD, code
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const CODE: &str = "function add(a,b){return a+b}";

    #[test]
    fn test_table_rows_match_mode_index() {
        for mode in AnalysisMode::ALL {
            assert_eq!(MODE_PROMPTS[mode as usize].mode, mode);
        }
    }

    #[test]
    fn test_explain_prompt() {
        let prompt = build_prompt(CODE, AnalysisMode::Explain);
        assert!(prompt.text.starts_with("Explain the following code snippet"));
        assert!(prompt.text.ends_with(CODE));
        assert_eq!(prompt.system_instruction, BASE_SYSTEM_INSTRUCTION);
        assert!(prompt.schema.is_none());
    }

    #[test]
    fn test_find_bugs_prompt_has_safety_directive() {
        let prompt = build_prompt(CODE, AnalysisMode::FindBugs);
        assert!(prompt.text.contains("bugs, security vulnerabilities, and logical errors"));
        assert!(prompt.text.contains("corrected code"));
        assert!(prompt.text.contains(CODE));
        assert_eq!(
            prompt.system_instruction,
            format!("{}{}", BASE_SYSTEM_INSTRUCTION, SAFETY_DIRECTIVE)
        );
        assert!(prompt.schema.is_none());
    }

    #[test]
    fn test_improve_prompt_requests_unfenced_json() {
        let prompt = build_prompt(CODE, AnalysisMode::Improve);
        assert!(prompt.text.contains("Do NOT wrap this in markdown code blocks"));
        assert!(prompt.text.contains("\"improvedCode\""));
        assert!(prompt.text.contains("\"explanation\""));
        assert!(prompt.text.ends_with(&format!("Code to improve:\n{}", CODE)));
        assert_eq!(prompt.system_instruction, BASE_SYSTEM_INSTRUCTION);

        let schema = prompt.schema.unwrap();
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["properties"]["improvedCode"]["type"], "STRING");
        assert_eq!(schema["properties"]["explanation"]["type"], "STRING");
        assert_eq!(schema["required"], json!(["improvedCode", "explanation"]));
        assert_eq!(schema["properties"].as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_prompt_is_deterministic_and_verbatim() {
        let code = "  let x = `a`;\n\n\t// trailing  ";
        for mode in AnalysisMode::ALL {
            let first = build_prompt(code, mode);
            assert_eq!(first, build_prompt(code, mode));
            assert!(first.text.contains(code));
        }
    }

    #[test]
    fn test_into_request_uses_fixed_temperature() {
        let request = build_prompt(CODE, AnalysisMode::Improve).into_request();
        assert_eq!(request.temperature, Some(ANALYSIS_TEMPERATURE));
        assert!(request.response_schema.is_some());

        let request = build_prompt(CODE, AnalysisMode::Explain).into_request();
        assert!(request.response_schema.is_none());
    }
}

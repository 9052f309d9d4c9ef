//! Prompts for the server-side callable.
//!
//! The callable keeps its own shorter prompt set: it accepts any mode string
//! (unknown ones get a generic prompt), sets no temperature and never asks
//! for structured output.

use crate::ai::provider::GenerationRequest;
use crate::types::AnalysisMode;

const CALLABLE_SYSTEM_INSTRUCTION: &str = "You are a world-class senior software engineer.";
const CALLABLE_SAFETY_DIRECTIVE: &str = " Focus on security and correctness.";

/// Build the callable's generation request from a raw mode label
pub fn build_callable_prompt(code: &str, mode: &str) -> GenerationRequest {
    let mut system_instruction = CALLABLE_SYSTEM_INSTRUCTION.to_string();

    let prompt = match AnalysisMode::from_label(mode) {
        Some(AnalysisMode::Explain) => format!("Explain this code:\n\n{}", code),
        Some(AnalysisMode::FindBugs) => {
            system_instruction.push_str(CALLABLE_SAFETY_DIRECTIVE);
            format!("Find bugs in this code:\n\n{}", code)
        }
        Some(AnalysisMode::Improve) => format!("Improve this code:\n\n{}", code),
        None => format!("Analyze this code:\n\n{}", code),
    };

    GenerationRequest::new(prompt, system_instruction)
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::analysis::AnalysisMode;

/// One persisted analysis, owned by the history store.
///
/// Serialized with the document field names used by the store
/// (`userId`, `codeSnippet`) and the timestamp as epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    /// Store-assigned identifier
    pub id: String,
    pub user_id: String,
    /// The code exactly as submitted, never a model replacement
    pub code_snippet: String,
    pub mode: AnalysisMode,
    /// Markdown shown to the user
    pub response: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl HistoryItem {
    /// First non-blank line of the snippet, for list views
    pub fn preview(&self, max_chars: usize) -> String {
        let line = self
            .code_snippet
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("");
        if line.chars().count() > max_chars {
            let truncated: String = line.chars().take(max_chars).collect();
            format!("{}…", truncated)
        } else {
            line.to_string()
        }
    }
}

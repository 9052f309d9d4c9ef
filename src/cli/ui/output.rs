use console::style;

use crate::types::{AnalysisResult, HistoryItem};

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// Markdown is printed as-is; terminals render it well enough raw.
    pub fn analysis(&self, result: &AnalysisResult) {
        self.section("Analysis");
        println!("{}", result.markdown.trim_end());
        if let Some(code) = &result.code {
            self.section("Improved Code");
            println!("{}", code.trim_end());
        }
    }

    pub fn history_entry(&self, item: &HistoryItem, preview_chars: usize, full: bool) {
        let when = item
            .timestamp
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M");
        println!(
            "{}  {}  {}",
            style(when).dim(),
            style(item.mode.label()).cyan(),
            item.preview(preview_chars)
        );
        if full {
            self.section("Code");
            println!("{}", item.code_snippet.trim_end());
            self.section("Response");
            println!("{}\n", item.response.trim_end());
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

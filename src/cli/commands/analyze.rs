//! Analyze Command
//!
//! Usage:
//!   codelens analyze [FILE] [--mode explain|improve|bugs] [--write PATH] [-f json]
//!
//! Reads code from FILE, or stdin when omitted.

use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::cli::{CommandContext, Output};
use crate::types::{AnalysisMode, Result};

/// What happened to a `--write` target
#[derive(Debug, PartialEq, Eq)]
enum WriteOutcome<'a> {
    NotRequested,
    Written(&'a Path),
    /// The analysis produced no improved code; the target was left untouched
    NothingToWrite(&'a Path),
}

pub async fn run(
    ctx: &CommandContext,
    file: Option<&Path>,
    mode: AnalysisMode,
    write: Option<PathBuf>,
    format: &str,
) -> Result<()> {
    let code = read_input(file)?;
    let session = ctx.session.start();

    let workflow = ctx.workflow()?;
    let submission = workflow.submit(&code, mode, &session).await?;
    let result = &submission.result;

    let written = write_improved(result.code.as_deref(), write.as_deref())?;

    if format == "json" {
        if let WriteOutcome::NothingToWrite(path) = written {
            warn!("No improved code returned; {} was not written", path.display());
        }
        let json = serde_json::json!({
            "mode": mode,
            "markdown": result.markdown,
            "code": result.code,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        let output = Output::new();
        output.header(&format!("{} ({})", mode, source_label(file)));
        match written {
            WriteOutcome::Written(path) => {
                output.section("Analysis");
                println!("{}\n", result.markdown.trim_end());
                output.success(&format!("Improved code written to {}", path.display()));
            }
            WriteOutcome::NothingToWrite(path) => {
                output.analysis(result);
                output.warning(&format!(
                    "No improved code returned; {} was not written",
                    path.display()
                ));
            }
            WriteOutcome::NotRequested => output.analysis(result),
        }
    }

    // The process exits right after this command, so the write is awaited.
    if let Some(pending) = submission.history {
        pending.wait().await;
    }

    Ok(())
}

fn write_improved<'a>(code: Option<&str>, path: Option<&'a Path>) -> Result<WriteOutcome<'a>> {
    match (code, path) {
        (_, None) => Ok(WriteOutcome::NotRequested),
        (Some(code), Some(path)) => {
            std::fs::write(path, code)?;
            Ok(WriteOutcome::Written(path))
        }
        (None, Some(path)) => Ok(WriteOutcome::NothingToWrite(path)),
    }
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut code = String::new();
            std::io::stdin().read_to_string(&mut code)?;
            Ok(code)
        }
    }
}

fn source_label(file: Option<&Path>) -> String {
    file.map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdin".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_improved_writes_code() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.js");

        let outcome = write_improved(Some("const x = 1;"), Some(path.as_path())).unwrap();
        assert_eq!(outcome, WriteOutcome::Written(path.as_path()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "const x = 1;");
    }

    #[test]
    fn test_write_without_code_leaves_target_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.js");

        let outcome = write_improved(None, Some(path.as_path())).unwrap();
        assert_eq!(outcome, WriteOutcome::NothingToWrite(path.as_path()));
        assert!(!path.exists());
    }

    #[test]
    fn test_no_write_target() {
        assert_eq!(
            write_improved(Some("x"), None).unwrap(),
            WriteOutcome::NotRequested
        );
    }
}

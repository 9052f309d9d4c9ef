//! History Command
//!
//! Lists the signed-in user's past analyses, newest first.

use crate::cli::{CommandContext, Output};
use crate::constants::{history::PREVIEW_CHARS, messages::SIGN_IN_REQUIRED};
use crate::types::Result;

pub fn run(ctx: &CommandContext, format: &str, full: bool, limit: Option<usize>) -> Result<()> {
    let output = Output::new();
    let session = ctx.session.start();

    let Some(user) = session.user() else {
        output.info(SIGN_IN_REQUIRED);
        return Ok(());
    };

    let mut items = ctx.history.list(&user.uid);
    if let Some(limit) = limit {
        items.truncate(limit);
    }

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    output.header(&format!("History for {}", user.label()));
    if items.is_empty() {
        println!("No history yet");
        return Ok(());
    }

    for item in &items {
        output.history_entry(item, PREVIEW_CHARS, full);
    }
    Ok(())
}

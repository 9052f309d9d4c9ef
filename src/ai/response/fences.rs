//! Markdown code-fence stripping for model-produced code.

/// Strip a wrapping markdown code fence from `code`.
///
/// Only applies when the text starts with ```` ``` ````: the opening marker,
/// an optional ASCII-letter language tag and one newline are removed, then a
/// closing marker (with one preceding newline) at the very end. Text that does
/// not start with a fence is returned unchanged, so stripping is idempotent
/// on clean code.
pub fn strip_code_fences(code: &str) -> String {
    let Some(rest) = code.strip_prefix("```") else {
        return code.to_string();
    };

    let tag_len = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    let body = &rest[tag_len..];
    let body = body.strip_prefix('\n').unwrap_or(body);

    let body = match body.strip_suffix("```") {
        Some(inner) => inner.strip_suffix('\n').unwrap_or(inner),
        None => body,
    };

    body.to_string()
}

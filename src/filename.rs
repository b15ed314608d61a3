//! Filename sanitizer for `Content-Disposition` names.

/// Fallback used when nothing printable survives sanitizing.
pub const DEFAULT_FILENAME: &str = "document.pdf";

/// Sanitize `name`, falling back to [`DEFAULT_FILENAME`].
pub fn sanitize(name: &str) -> String {
    sanitize_or(name, DEFAULT_FILENAME)
}

/// Reduce `name` to a safe basename.
///
/// 1. keep only the final path component (`/` and `\` both separate),
/// 2. drop everything except ASCII word characters, `-`, `.` and space,
/// 3. substitute `default` when the result is empty, `.` or `..`.
pub fn sanitize_or(name: &str, default: &str) -> String {
    let trimmed = name.trim_end_matches(['/', '\\']);
    let base = trimmed.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base.chars().filter(|&c| is_allowed(c)).collect();

    match cleaned.as_str() {
        "" | "." | ".." => default.to_string(),
        _ => cleaned,
    }
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ' ')
}

//! Output path sanitization.

use regex::Regex;

/// Make a value safe to use as a single path segment.
///
/// Filesystem-illegal characters (`<>:"/\|?*` and control characters) become
/// `_`, runs of whitespace collapse to one space, and the result is trimmed.
/// Empty input falls back to `"unknown"`.
pub fn sanitize_path_segment(value: &str) -> String {
    let illegal = Regex::new(r#"[<>:"/\\|?*\x00-\x1F]"#).unwrap();
    let whitespace = Regex::new(r"\s+").unwrap();

    let source = if value.is_empty() { "unknown" } else { value };
    let replaced = illegal.replace_all(source, "_");
    whitespace.replace_all(&replaced, " ").trim().to_string()
}

/// Reduce a value to a conservative file-name token.
///
/// Runs of characters outside `[A-Za-z0-9_.-]` become a single `_`; empty
/// input falls back to `fallback`.
pub fn sanitize_file_token(value: &str, fallback: &str) -> String {
    let source = if value.trim().is_empty() {
        fallback
    } else {
        value
    };
    Regex::new(r"[^\w.-]+")
        .unwrap()
        .replace_all(source, "_")
        .to_string()
}

/// Strip a plugin file extension (`.esp` / `.esm` / `.esl`), if present.
pub fn plugin_stem(plugin: &str) -> &str {
    for ext in [".esp", ".esm", ".esl"] {
        if plugin.len() > ext.len() && plugin.to_lowercase().ends_with(ext) {
            return &plugin[..plugin.len() - ext.len()];
        }
    }
    plugin
}

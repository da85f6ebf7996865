//! Leveled-list entry references and identifier normalization.

use serde::{Deserialize, Serialize};

/// Normalize a form id: trimmed, uppercased, leading zeros stripped.
///
/// Leading zeros are insignificant in the patch directive format, so
/// `"0012ab"` and `"12AB"` refer to the same form.
pub fn normalize_form_id(form_id: &str) -> String {
    form_id.trim().to_uppercase().trim_start_matches('0').to_string()
}

/// Canonical 8-hex-digit key for a raw attribute code.
///
/// Non-hex characters are dropped, the low 6 hex digits are kept (discarding
/// any load-order prefix) and the result is left-padded to 8 digits, so the
/// same base form resolves to one key regardless of prefix. Returns an empty
/// string for codes with no hex content.
pub fn to_type_code_key(code: &str) -> String {
    let hex: String = code
        .trim()
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_hexdigit())
        .collect();
    if hex.is_empty() {
        return String::new();
    }
    let low = if hex.len() > 6 {
        &hex[hex.len() - 6..]
    } else {
        hex.as_str()
    };
    format!("{:0>8}", low)
}

/// A reference to a leveled list that a record can be distributed into.
///
/// At least one of `form_id` / `editor_id` is non-empty; entries violating
/// that are rejected during configuration normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    pub editor_id: String,
    pub form_id: String,
    pub master: String,
}

impl ListEntry {
    pub fn new(
        editor_id: impl Into<String>,
        form_id: impl Into<String>,
        master: impl Into<String>,
    ) -> Self {
        Self {
            editor_id: editor_id.into(),
            form_id: form_id.into(),
            master: master.into(),
        }
    }

    /// Entry carrying only an editor id (legacy string configs and literal
    /// pass-through tokens).
    pub fn from_editor_id(editor_id: impl Into<String>) -> Self {
        Self {
            editor_id: editor_id.into(),
            form_id: String::new(),
            master: String::new(),
        }
    }

    /// Case-insensitive identity key used for global deduplication.
    pub fn identity_key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.master.to_lowercase(),
            self.form_id,
            self.editor_id.to_lowercase()
        )
    }
}
